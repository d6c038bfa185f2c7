use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::matches::{
        MatchView, ProposeMatchRequest, RecordGoalsRequest, SubmitScoreRequest, TeamActionRequest,
    },
    error::AppError,
    routes::{
        caller::CallerId,
        extract::{AppPath, ValidJson},
    },
    services::match_service,
    state::SharedState,
};

/// Match lifecycle: proposal, response, score reconciliation and goals.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches", post(propose))
        .route("/matches/{id}", get(get_match))
        .route("/matches/{id}/accept", post(accept))
        .route("/matches/{id}/decline", post(decline))
        .route("/matches/{id}/scores", post(submit_score))
        .route("/matches/{id}/settle", post(settle))
        .route("/matches/{id}/goals", post(record_goals))
}

/// Propose a match against another team. The caller must captain the home team.
#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    params(("X-User-Id" = String, Header, description = "Caller identity")),
    request_body = ProposeMatchRequest,
    responses(
        (status = 201, description = "Match proposed", body = MatchView),
        (status = 403, description = "Caller does not captain the home team"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn propose(
    State(state): State<SharedState>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<ProposeMatchRequest>,
) -> Result<(StatusCode, Json<MatchView>), AppError> {
    let view = match_service::propose(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Match with both score reports.
#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match", body = MatchView),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(match_service::get_match(&state, id).await?))
}

/// Accept a proposal. The caller must captain the away team.
#[utoipa::path(
    post,
    path = "/matches/{id}/accept",
    tag = "matches",
    params(
        ("id" = Uuid, Path, description = "Match identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Match accepted", body = MatchView),
        (status = 409, description = "Match is no longer proposed")
    )
)]
pub async fn accept(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(match_service::accept(&state, id, &caller).await?))
}

/// Decline a proposal. The caller must captain the away team.
#[utoipa::path(
    post,
    path = "/matches/{id}/decline",
    tag = "matches",
    params(
        ("id" = Uuid, Path, description = "Match identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Match declined", body = MatchView),
        (status = 409, description = "Match is no longer proposed")
    )
)]
pub async fn decline(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(match_service::decline(&state, id, &caller).await?))
}

/// Submit one side's view of the final score.
#[utoipa::path(
    post,
    path = "/matches/{id}/scores",
    tag = "matches",
    params(
        ("id" = Uuid, Path, description = "Match identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    request_body = SubmitScoreRequest,
    responses(
        (status = 200, description = "Score recorded; status shows whether it was confirmed or disputed", body = MatchView),
        (status = 400, description = "Missing or negative score"),
        (status = 403, description = "Caller does not captain the submitting team"),
        (status = 409, description = "Match does not accept scores in its current state")
    )
)]
pub async fn submit_score(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<SubmitScoreRequest>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(
        match_service::submit_score(&state, id, &caller, payload).await?,
    ))
}

/// Finish a confirmation left half-done, or replay the credits of a confirmed match.
#[utoipa::path(
    post,
    path = "/matches/{id}/settle",
    tag = "matches",
    params(
        ("id" = Uuid, Path, description = "Match identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    request_body = TeamActionRequest,
    responses(
        (status = 200, description = "Match settled", body = MatchView),
        (status = 409, description = "Match has no agreed result yet")
    )
)]
pub async fn settle(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<TeamActionRequest>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(
        match_service::settle_match(&state, id, &caller, payload).await?,
    ))
}

/// Record goal scorers for one side of a confirmed match.
#[utoipa::path(
    post,
    path = "/matches/{id}/goals",
    tag = "matches",
    params(
        ("id" = Uuid, Path, description = "Match identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    request_body = RecordGoalsRequest,
    responses(
        (status = 200, description = "Goals recorded", body = MatchView),
        (status = 400, description = "Scorer not on the roster or too many goals"),
        (status = 409, description = "Match is not confirmed")
    )
)]
pub async fn record_goals(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<RecordGoalsRequest>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(
        match_service::record_goals(&state, id, &caller, payload).await?,
    ))
}
