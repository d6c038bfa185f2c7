use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GoalEntity, MatchEntity},
    dto::{
        format_system_time,
        validation::{validate_identity, validate_sport},
    },
    state::match_lifecycle::MatchStatus,
};

/// Payload used by a home captain to propose a fixture.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProposeMatchRequest {
    /// Team of the proposing captain.
    pub home_team_id: Option<Uuid>,
    /// Invited opponent.
    pub away_team_id: Option<Uuid>,
    /// Sport label; must match both teams.
    #[validate(custom(function = "validate_sport"))]
    pub sport: Option<String>,
    /// RFC 3339 kick-off time.
    #[serde(default)]
    pub scheduled_at: Option<String>,
    /// Free-form venue name.
    #[serde(default)]
    #[validate(length(max = 120))]
    pub venue: Option<String>,
}

/// A captain's self-referential report of a final score.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    /// Team the caller reports for.
    pub team_id: Option<Uuid>,
    /// Goals scored by the caller's team.
    pub our_score: Option<i64>,
    /// Goals scored by the opponent.
    pub their_score: Option<i64>,
}

/// Identifies which team a captain is acting for.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeamActionRequest {
    /// Team the caller captains.
    pub team_id: Option<Uuid>,
}

/// One scorer line supplied after confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    /// Identity of the scorer; must be on the roster.
    #[validate(custom(function = "validate_identity"))]
    pub scorer: String,
    /// Goals scored.
    #[validate(range(min = 1, max = 50))]
    pub count: u32,
    /// Identity credited with the assist.
    #[serde(default)]
    #[validate(custom(function = "validate_identity"))]
    pub assist: Option<String>,
}

/// Scorers recorded by one team's captain.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordGoalsRequest {
    /// Team the scorers belong to.
    pub team_id: Option<Uuid>,
    /// Scorer lines.
    #[validate(length(min = 1, max = 50), nested)]
    pub goals: Vec<GoalInput>,
}

/// Recorded scorer line.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    /// Identity of the scorer.
    pub scorer: String,
    /// Team the goals count for.
    pub team_id: Uuid,
    /// Goals scored.
    pub count: u32,
    /// Identity credited with the assist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist: Option<String>,
}

impl From<&GoalEntity> for GoalView {
    fn from(goal: &GoalEntity) -> Self {
        Self {
            scorer: goal.scorer.clone(),
            team_id: goal.team,
            count: goal.count,
            assist: goal.assist.clone(),
        }
    }
}

/// Public representation of a fixture.
///
/// `homeScore` comes from the home captain's report and `awayScore` from the
/// away captain's report, so each is `null` until that side has submitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    /// Match id.
    pub id: Uuid,
    /// Home team.
    pub home_team_id: Uuid,
    /// Away team.
    pub away_team_id: Uuid,
    /// Sport label.
    pub sport: String,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// RFC 3339 kick-off time.
    pub scheduled_at: Option<String>,
    /// Venue name.
    pub venue: Option<String>,
    /// Identity of the proposing captain.
    pub proposed_by: String,
    /// Home goals.
    pub home_score: Option<u32>,
    /// Away goals.
    pub away_score: Option<u32>,
    /// Identity that submitted the home report.
    pub home_submitted_by: Option<String>,
    /// Identity that submitted the away report.
    pub away_submitted_by: Option<String>,
    /// RFC 3339 time the result became final.
    pub confirmed_at: Option<String>,
    /// Recorded scorer lines.
    pub goals: Vec<GoalView>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last change.
    pub updated_at: String,
}

impl From<&MatchEntity> for MatchView {
    fn from(entity: &MatchEntity) -> Self {
        Self {
            id: entity.id,
            home_team_id: entity.home_team_id,
            away_team_id: entity.away_team_id,
            sport: entity.sport.clone(),
            status: entity.status,
            scheduled_at: entity.scheduled_at.map(format_system_time),
            venue: entity.venue.clone(),
            proposed_by: entity.proposed_by.clone(),
            home_score: entity.home_score(),
            away_score: entity.away_score(),
            home_submitted_by: entity
                .home_claim
                .as_ref()
                .map(|claim| claim.submitted_by.clone()),
            away_submitted_by: entity
                .away_claim
                .as_ref()
                .map(|claim| claim.submitted_by.clone()),
            confirmed_at: entity.confirmed_at.map(format_system_time),
            goals: entity.goals.iter().map(GoalView::from).collect(),
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

impl From<MatchEntity> for MatchView {
    fn from(entity: MatchEntity) -> Self {
        Self::from(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_lines_are_validated() {
        let request = RecordGoalsRequest {
            team_id: Some(Uuid::new_v4()),
            goals: vec![GoalInput {
                scorer: "p1".into(),
                count: 0,
                assist: None,
            }],
        };
        assert!(request.validate().is_err());

        let empty = RecordGoalsRequest {
            team_id: Some(Uuid::new_v4()),
            goals: Vec::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn propose_rejects_malformed_sport() {
        let request = ProposeMatchRequest {
            sport: Some("Soccer!".into()),
            ..ProposeMatchRequest::default()
        };
        assert!(request.validate().is_err());
    }
}
