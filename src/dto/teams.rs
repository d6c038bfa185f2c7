use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{PlayerEntity, PlayerRatingEntity, TeamEntity, TeamRatingEntity},
    dto::{
        format_system_time,
        validation::{validate_identity, validate_sport},
    },
    rating::{PlayerTier, TeamTier},
};

/// Payload used to register a team or club; the caller becomes its captain.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamRequest {
    /// Display name.
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    /// Sport label.
    #[validate(custom(function = "validate_sport"))]
    pub sport: Option<String>,
}

/// Adds an identity to a roster.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    /// Identity to add.
    #[validate(custom(function = "validate_identity"))]
    pub identity: Option<String>,
}

/// Team standing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRatingView {
    /// Tier derived from `tp`.
    pub tier: TeamTier,
    /// Team points.
    pub tp: u32,
    /// Confirmed matches played.
    pub games: u32,
    /// Matches won.
    pub wins: u32,
    /// Consecutive wins.
    pub win_streak: u32,
}

impl From<&TeamRatingEntity> for TeamRatingView {
    fn from(rating: &TeamRatingEntity) -> Self {
        Self {
            tier: rating.tier,
            tp: rating.tp,
            games: rating.games,
            wins: rating.wins,
            win_streak: rating.win_streak,
        }
    }
}

/// Public representation of a team with its standing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    /// Team id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sport label.
    pub sport: String,
    /// Identity of the captain.
    pub captain_id: String,
    /// Roster identities.
    pub members: Vec<String>,
    /// Current standing.
    pub rating: TeamRatingView,
    /// RFC 3339 registration time.
    pub created_at: String,
}

impl From<TeamEntity> for TeamView {
    fn from(entity: TeamEntity) -> Self {
        Self {
            rating: TeamRatingView::from(&entity.rating),
            created_at: format_system_time(entity.created_at),
            id: entity.id,
            name: entity.name,
            sport: entity.sport,
            captain_id: entity.captain_id,
            members: entity.members,
        }
    }
}

/// Standing of a player in one sport.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRatingView {
    /// Tier derived from `points`.
    pub tier: PlayerTier,
    /// Rating points.
    pub points: u32,
    /// Games credited.
    pub games: u32,
    /// Wins credited.
    pub wins: u32,
    /// Consecutive wins.
    pub win_streak: u32,
    /// Goals scored.
    pub goals: u32,
    /// Assists credited.
    pub assists: u32,
}

impl From<&PlayerRatingEntity> for PlayerRatingView {
    fn from(bucket: &PlayerRatingEntity) -> Self {
        Self {
            tier: bucket.tier,
            points: bucket.points,
            games: bucket.games,
            wins: bucket.wins,
            win_streak: bucket.win_streak,
            goals: bucket.goals,
            assists: bucket.assists,
        }
    }
}

/// Per-sport standing of a player.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Player identity.
    pub id: String,
    /// Standing keyed by sport.
    #[schema(value_type = Object)]
    pub ratings: IndexMap<String, PlayerRatingView>,
}

impl From<PlayerEntity> for PlayerView {
    fn from(entity: PlayerEntity) -> Self {
        Self {
            ratings: entity
                .ratings
                .iter()
                .map(|(sport, bucket)| (sport.clone(), PlayerRatingView::from(bucket)))
                .collect(),
            id: entity.id,
        }
    }
}
