use axum::Router;

use crate::state::SharedState;

/// Club activity routes.
pub mod activities;
/// Operator routes.
pub mod admin;
/// Caller identity extraction.
pub mod caller;
/// OpenAPI and Swagger UI routes.
pub mod docs;
/// JSON and path extractors.
pub mod extract;
/// Health check route.
pub mod health;
/// Match routes.
pub mod matches;
/// Outcome stream route.
pub mod sse;
/// Team and player routes.
pub mod teams;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(sse::router())
        .merge(teams::router())
        .merge(matches::router())
        .merge(activities::router())
        .merge(admin::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}
