use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dao::models::{ActivityEntity, MatchEntity},
    dto::sse::{
        ActivityCompletedEvent, MatchConfirmedEvent, MatchDisputedEvent, SeasonResetEvent,
        ServerEvent, SystemStatus,
    },
    services::reconciliation,
    state::SharedState,
};

const EVENT_MATCH_CONFIRMED: &str = "match.confirmed";
const EVENT_MATCH_DISPUTED: &str = "match.disputed";
const EVENT_ACTIVITY_COMPLETED: &str = "activity.completed";
const EVENT_SEASON_RESET: &str = "season.reset";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Announce a confirmed match with its per-side results.
pub fn broadcast_match_confirmed(state: &SharedState, entity: &MatchEntity) {
    let (Some(home_score), Some(away_score), Some((home_result, away_result))) = (
        entity.home_score(),
        entity.away_score(),
        reconciliation::results(entity),
    ) else {
        warn!(match_id = %entity.id, "confirmed match without both scores; not announced");
        return;
    };

    let payload = MatchConfirmedEvent {
        match_id: entity.id,
        sport: entity.sport.clone(),
        home_team_id: entity.home_team_id,
        away_team_id: entity.away_team_id,
        home_score,
        away_score,
        home_result,
        away_result,
    };
    send_outcome_event(state, EVENT_MATCH_CONFIRMED, &payload);
}

/// Announce that the two captains disagree.
pub fn broadcast_match_disputed(state: &SharedState, entity: &MatchEntity) {
    let (Some(home), Some(away)) = (&entity.home_claim, &entity.away_claim) else {
        return;
    };
    let payload = MatchDisputedEvent {
        match_id: entity.id,
        home_claim: (home.home, home.away),
        away_claim: (away.home, away.away),
    };
    send_outcome_event(state, EVENT_MATCH_DISPUTED, &payload);
}

/// Announce a completed activity on the outcome stream.
pub fn broadcast_activity_completed(state: &SharedState, entity: &ActivityEntity) {
    let payload = ActivityCompletedEvent {
        activity_id: entity.id,
        club_id: entity.club_id,
        sport: entity.sport.clone(),
        participants: entity.participants.clone(),
    };
    send_outcome_event(state, EVENT_ACTIVITY_COMPLETED, &payload);
}

/// Announce a season rollover on the outcome stream.
pub fn broadcast_season_reset(state: &SharedState, label: &str, players: usize, teams: usize) {
    let payload = SeasonResetEvent {
        label: label.to_owned(),
        players_reset: players,
        teams_reset: teams,
    };
    send_outcome_event(state, EVENT_SEASON_RESET, &payload);
}

/// Tell subscribers whether the backend is running without storage.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_outcome_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_outcome_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(message) => {
            let receivers = state.outcomes().broadcast(message);
            debug!(event, receivers, "outcome event sent");
        }
        Err(err) => warn!(event, error = %err, "failed to serialize outcome SSE payload"),
    }
}
