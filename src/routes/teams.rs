use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        activities::ActivityView,
        matches::MatchView,
        teams::{AddMemberRequest, PlayerView, RegisterTeamRequest, TeamView},
    },
    error::AppError,
    routes::{
        caller::CallerId,
        extract::{AppPath, ValidJson},
    },
    services::{activity_service, match_service, team_service},
    state::SharedState,
};

/// Team registry, per-team listings and player rating views.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", post(register_team))
        .route("/teams/{id}", get(get_team))
        .route("/teams/{id}/members", post(add_member))
        .route("/teams/{id}/matches", get(list_matches))
        .route("/teams/{id}/activities", get(list_activities))
        .route("/players/{id}", get(get_player))
}

/// Register a team; the caller becomes its captain and first member.
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    params(("X-User-Id" = String, Header, description = "Caller identity")),
    request_body = RegisterTeamRequest,
    responses(
        (status = 201, description = "Team registered", body = TeamView),
        (status = 400, description = "Invalid name or sport"),
        (status = 401, description = "Missing caller identity")
    )
)]
pub async fn register_team(
    State(state): State<SharedState>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<RegisterTeamRequest>,
) -> Result<(StatusCode, Json<TeamView>), AppError> {
    let team = team_service::register_team(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Team with its roster and current rating.
#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team", body = TeamView),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn get_team(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TeamView>, AppError> {
    Ok(Json(team_service::get_team(&state, id).await?))
}

/// Add an identity to the roster. Captain only.
#[utoipa::path(
    post,
    path = "/teams/{id}/members",
    tag = "teams",
    params(
        ("id" = Uuid, Path, description = "Team identifier"),
        ("X-User-Id" = String, Header, description = "Caller identity")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = TeamView),
        (status = 403, description = "Caller is not the captain"),
        (status = 409, description = "Identity already on the roster")
    )
)]
pub async fn add_member(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    CallerId(caller): CallerId,
    ValidJson(payload): ValidJson<AddMemberRequest>,
) -> Result<Json<TeamView>, AppError> {
    Ok(Json(
        team_service::add_member(&state, id, &caller, payload).await?,
    ))
}

/// Matches the team plays in.
#[utoipa::path(
    get,
    path = "/teams/{id}/matches",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses((status = 200, description = "Matches involving the team, newest first", body = [MatchView]))
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    Ok(Json(match_service::list_matches_for_team(&state, id).await?))
}

/// Activities hosted by a club.
#[utoipa::path(
    get,
    path = "/teams/{id}/activities",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Club identifier")),
    responses((status = 200, description = "Activities of the club, newest first", body = [ActivityView]))
)]
pub async fn list_activities(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    Ok(Json(
        activity_service::list_activities_for_club(&state, id).await?,
    ))
}

/// Per-sport ratings of a player, with derived tiers.
#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Player identity")),
    responses(
        (status = 200, description = "Player ratings", body = PlayerView),
        (status = 404, description = "Player has never been credited")
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<PlayerView>, AppError> {
    Ok(Json(team_service::get_player(&state, &id).await?))
}
