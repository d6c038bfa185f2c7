use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::rating::MatchResult;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name; `None` sends an unnamed message.
    pub event: Option<String>,
    /// Serialized payload.
    pub data: String,
}

impl ServerEvent {
    /// Event with pre-serialized data.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Name of the stream the client subscribed to.
    pub stream: String,
    /// Greeting text.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// Whether the record store is unreachable.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// A match result became final.
pub struct MatchConfirmedEvent {
    /// Confirmed match.
    pub match_id: Uuid,
    /// Sport label.
    pub sport: String,
    /// Home team.
    pub home_team_id: Uuid,
    /// Away team.
    pub away_team_id: Uuid,
    /// Home goals.
    pub home_score: u32,
    /// Away goals.
    pub away_score: u32,
    /// Result from the home side.
    pub home_result: MatchResult,
    /// Result from the away side.
    pub away_result: MatchResult,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// The two captains reported different scores.
pub struct MatchDisputedEvent {
    /// Disputed match.
    pub match_id: Uuid,
    /// `(home, away)` as reported by the home captain.
    #[schema(value_type = Vec<u32>)]
    pub home_claim: (u32, u32),
    /// `(home, away)` as reported by the away captain.
    #[schema(value_type = Vec<u32>)]
    pub away_claim: (u32, u32),
}

/// A club activity was completed and its participants credited.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCompletedEvent {
    /// Completed activity.
    pub activity_id: Uuid,
    /// Hosting club.
    pub club_id: Uuid,
    /// Sport label.
    pub sport: String,
    /// Credited identities.
    pub participants: Vec<String>,
}

/// A season rollover decayed ratings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResetEvent {
    /// Season label.
    pub label: String,
    /// Player profiles decayed.
    pub players_reset: usize,
    /// Teams decayed.
    pub teams_reset: usize,
}
