use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::activities::{ActivityView, CreateActivityRequest},
    error::AppError,
    routes::{
        caller::CallerId,
        extract::{AppPath, ValidJson},
    },
    services::activity_service,
    state::SharedState,
};

/// Club activities: open, join, complete and settle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/activities", post(create_activity))
        .route("/activities/{id}", get(get_activity))
        .route("/activities/{id}/join", post(join))
        .route("/activities/{id}/complete", post(complete))
        .route("/activities/{id}/settle", post(settle))
}

/// Open an activity for a club. The creator joins automatically.
#[utoipa::path(
    post,
    path = "/activities",
    tag = "activities",
    params(("X-User-Id" = String, Header, description = "Caller identity")),
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity opened", body = ActivityView),
        (status = 404, description = "Unknown club")
    )
)]
pub async fn create_activity(
    State(state): State<SharedState>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityView>), AppError> {
    let view = activity_service::create_activity(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Activity with its participants.
#[utoipa::path(
    get,
    path = "/activities/{id}",
    tag = "activities",
    params(("id" = Uuid, Path, description = "Activity identifier")),
    responses(
        (status = 200, description = "Activity", body = ActivityView),
        (status = 404, description = "Unknown activity")
    )
)]
pub async fn get_activity(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(activity_service::get_activity(&state, id).await?))
}

/// Join an open activity. The caller must be on the club roster.
#[utoipa::path(
    post,
    path = "/activities/{id}/join",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Caller joined", body = ActivityView),
        (status = 409, description = "Already joined or activity completed")
    )
)]
pub async fn join(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(activity_service::join(&state, id, &caller).await?))
}

/// Complete an activity and credit its participants. Creator only.
#[utoipa::path(
    post,
    path = "/activities/{id}/complete",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Activity completed", body = ActivityView),
        (status = 403, description = "Caller did not create the activity"),
        (status = 409, description = "Activity already completed")
    )
)]
pub async fn complete(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(activity_service::complete(&state, id, &caller).await?))
}

/// Replay the credits of a completed activity. Creator only.
#[utoipa::path(
    post,
    path = "/activities/{id}/settle",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Credits replayed", body = ActivityView),
        (status = 409, description = "Activity still open")
    )
)]
pub async fn settle(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(
        activity_service::settle_activity(&state, id, &caller).await?,
    ))
}
