use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the matchday backend.
#[openapi(
    info(
        title = "matchday-back",
        description = "Match score reconciliation, activity credits and rating tiers"
    ),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::outcome_stream,
        crate::routes::teams::register_team,
        crate::routes::teams::get_team,
        crate::routes::teams::add_member,
        crate::routes::teams::list_matches,
        crate::routes::teams::list_activities,
        crate::routes::teams::get_player,
        crate::routes::matches::propose,
        crate::routes::matches::get_match,
        crate::routes::matches::accept,
        crate::routes::matches::decline,
        crate::routes::matches::submit_score,
        crate::routes::matches::settle,
        crate::routes::matches::record_goals,
        crate::routes::activities::create_activity,
        crate::routes::activities::get_activity,
        crate::routes::activities::join,
        crate::routes::activities::complete,
        crate::routes::activities::settle,
        crate::routes::admin::reset_season,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::teams::RegisterTeamRequest,
            crate::dto::teams::AddMemberRequest,
            crate::dto::teams::TeamView,
            crate::dto::teams::TeamRatingView,
            crate::dto::teams::PlayerView,
            crate::dto::teams::PlayerRatingView,
            crate::dto::matches::ProposeMatchRequest,
            crate::dto::matches::SubmitScoreRequest,
            crate::dto::matches::TeamActionRequest,
            crate::dto::matches::RecordGoalsRequest,
            crate::dto::matches::GoalInput,
            crate::dto::matches::GoalView,
            crate::dto::matches::MatchView,
            crate::dto::activities::CreateActivityRequest,
            crate::dto::activities::ActivityView,
            crate::dto::season::SeasonResetRequest,
            crate::dto::season::SeasonResetResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::MatchConfirmedEvent,
            crate::dto::sse::MatchDisputedEvent,
            crate::dto::sse::ActivityCompletedEvent,
            crate::dto::sse::SeasonResetEvent,
            crate::state::match_lifecycle::MatchStatus,
            crate::state::activity_lifecycle::ActivityStatus,
            crate::rating::MatchResult,
            crate::rating::PlayerTier,
            crate::rating::TeamTier,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "teams", description = "Team registry and per-team listings"),
        (name = "players", description = "Player rating views"),
        (name = "matches", description = "Match lifecycle and score reconciliation"),
        (name = "activities", description = "Club activities"),
        (name = "admin", description = "Operator endpoints guarded by the admin token"),
    )
)]
pub struct ApiDoc;
