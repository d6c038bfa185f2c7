use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle of a group activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ActivityStatus {
    /// Accepting participants.
    Open,
    /// Finished; participants are frozen and points credited. Terminal.
    Completed,
}

/// Events that move an activity through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    /// A member joins.
    Join,
    /// The creator closes the activity.
    Complete,
}

/// Error returned when an event is not legal from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidActivityTransition {
    /// Status the activity was in.
    pub from: ActivityStatus,
    /// Rejected event.
    pub event: ActivityEvent,
}

/// Status reached by applying `event` to `from`, if legal.
pub fn next_status(
    from: ActivityStatus,
    event: ActivityEvent,
) -> Result<ActivityStatus, InvalidActivityTransition> {
    match (from, event) {
        (ActivityStatus::Open, ActivityEvent::Join) => Ok(ActivityStatus::Open),
        (ActivityStatus::Open, ActivityEvent::Complete) => Ok(ActivityStatus::Completed),
        (from, event) => Err(InvalidActivityTransition { from, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_activity_accepts_join_and_complete() {
        assert_eq!(
            next_status(ActivityStatus::Open, ActivityEvent::Join),
            Ok(ActivityStatus::Open)
        );
        assert_eq!(
            next_status(ActivityStatus::Open, ActivityEvent::Complete),
            Ok(ActivityStatus::Completed)
        );
    }

    #[test]
    fn completed_activity_is_frozen() {
        for event in [ActivityEvent::Join, ActivityEvent::Complete] {
            let err = next_status(ActivityStatus::Completed, event).unwrap_err();
            assert_eq!(err.from, ActivityStatus::Completed);
        }
    }
}
