use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};

use crate::{
    dto::season::{SeasonResetRequest, SeasonResetResponse},
    error::AppError,
    routes::extract::ValidJson,
    services::season_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Operator endpoints guarded by the configured admin token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/season/reset", post(reset_season))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Decay every rating for a new season. Re-running a label is a no-op.
#[utoipa::path(
    post,
    path = "/admin/season/reset",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Token from the service configuration")),
    request_body = SeasonResetRequest,
    responses(
        (status = 200, description = "Season reset applied", body = SeasonResetResponse),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn reset_season(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<SeasonResetRequest>,
) -> Result<Json<SeasonResetResponse>, AppError> {
    Ok(Json(season_service::reset_season(&state, payload).await?))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    match state.config().admin_token.as_deref() {
        Some(token) if token == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized(
            "admin endpoints are disabled: no admin token configured".into(),
        )),
    }
}
