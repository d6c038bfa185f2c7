use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::ActivityEntity,
    dto::{format_system_time, validation::validate_sport},
    state::activity_lifecycle::ActivityStatus,
};

/// Payload used to open a club activity.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    /// Club hosting the activity.
    pub club_id: Option<Uuid>,
    /// Sport label.
    #[validate(custom(function = "validate_sport"))]
    pub sport: Option<String>,
    /// Short title shown to members.
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    /// RFC 3339 start time.
    #[serde(default)]
    pub scheduled_at: Option<String>,
}

/// Public representation of an activity.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    /// Activity id.
    pub id: Uuid,
    /// Hosting club.
    pub club_id: Uuid,
    /// Sport label.
    pub sport: String,
    /// Title.
    pub title: String,
    /// Identity of the captain who opened it.
    pub created_by: String,
    /// Lifecycle status.
    pub status: ActivityStatus,
    /// Identities that joined, in join order.
    pub participants: Vec<String>,
    /// RFC 3339 start time.
    pub scheduled_at: Option<String>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 completion time.
    pub completed_at: Option<String>,
}

impl From<&ActivityEntity> for ActivityView {
    fn from(entity: &ActivityEntity) -> Self {
        Self {
            id: entity.id,
            club_id: entity.club_id,
            sport: entity.sport.clone(),
            title: entity.title.clone(),
            created_by: entity.created_by.clone(),
            status: entity.status,
            participants: entity.participants.clone(),
            scheduled_at: entity.scheduled_at.map(format_system_time),
            created_at: format_system_time(entity.created_at),
            completed_at: entity.completed_at.map(format_system_time),
        }
    }
}

impl From<ActivityEntity> for ActivityView {
    fn from(entity: ActivityEntity) -> Self {
        Self::from(&entity)
    }
}
