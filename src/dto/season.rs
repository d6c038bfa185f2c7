use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Season rollover request. The label makes the reset idempotent.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResetRequest {
    /// Season label, e.g. `2026-spring`.
    #[validate(length(min = 1, max = 40))]
    pub label: String,
}

/// Outcome of a season rollover.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResetResponse {
    /// Label the reset ran under.
    pub label: String,
    /// Player profiles decayed by this call.
    pub players_reset: usize,
    /// Teams decayed by this call.
    pub teams_reset: usize,
}
