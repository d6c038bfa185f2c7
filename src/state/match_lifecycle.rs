use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::dao::models::Side;

/// Lifecycle of a fixture between two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    /// Proposed by the home captain, waiting for the away captain.
    Proposed,
    /// Refused by the away captain. Terminal.
    Declined,
    /// Accepted; waiting for results.
    Scheduled,
    /// Only the home captain has reported.
    HomeSubmitted,
    /// Only the away captain has reported.
    AwaySubmitted,
    /// Both captains reported the same result; confirmation pending.
    BothSubmitted,
    /// Both captains reported and the results differ.
    Disputed,
    /// Result is final and points were credited. Terminal.
    Confirmed,
}

impl MatchStatus {
    /// Whether a captain may (re)submit a result from this status.
    pub fn accepts_scores(self) -> bool {
        matches!(
            self,
            MatchStatus::Scheduled
                | MatchStatus::HomeSubmitted
                | MatchStatus::AwaySubmitted
                | MatchStatus::Disputed
        )
    }
}

/// What the stored claims look like once a submission has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The other side has not reported yet.
    AwaitingOpponent,
    /// Both sides reported the same canonical score.
    Agreed,
    /// Both sides reported and the canonical scores differ.
    Disagreed,
}

/// Events that move a match through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// The away captain accepts.
    Accept,
    /// The away captain declines.
    Decline,
    /// A captain reports a score.
    ScoreSubmitted {
        /// Side that submitted.
        side: Side,
        /// State of the stored claims after the write.
        outcome: ClaimOutcome,
    },
    /// Both reports agree.
    Confirm,
    /// Scorers are recorded after confirmation.
    RecordGoals,
}

/// Error returned when an event is not legal from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Status the match was in.
    pub from: MatchStatus,
    /// Rejected event.
    pub event: MatchEvent,
}

/// Status reached by applying `event` to `from`, if legal.
pub fn next_status(from: MatchStatus, event: MatchEvent) -> Result<MatchStatus, InvalidTransition> {
    let next = match (from, event) {
        (MatchStatus::Proposed, MatchEvent::Accept) => MatchStatus::Scheduled,
        (MatchStatus::Proposed, MatchEvent::Decline) => MatchStatus::Declined,
        (status, MatchEvent::ScoreSubmitted { side, outcome }) if status.accepts_scores() => {
            match (outcome, side) {
                (ClaimOutcome::AwaitingOpponent, Side::Home) => MatchStatus::HomeSubmitted,
                (ClaimOutcome::AwaitingOpponent, Side::Away) => MatchStatus::AwaySubmitted,
                (ClaimOutcome::Agreed, _) => MatchStatus::BothSubmitted,
                (ClaimOutcome::Disagreed, _) => MatchStatus::Disputed,
            }
        }
        (MatchStatus::BothSubmitted, MatchEvent::Confirm) => MatchStatus::Confirmed,
        (MatchStatus::Confirmed, MatchEvent::RecordGoals) => MatchStatus::Confirmed,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(side: Side, outcome: ClaimOutcome) -> MatchEvent {
        MatchEvent::ScoreSubmitted { side, outcome }
    }

    #[test]
    fn happy_path_reaches_confirmed() {
        let mut status = MatchStatus::Proposed;
        status = next_status(status, MatchEvent::Accept).unwrap();
        assert_eq!(status, MatchStatus::Scheduled);
        status = next_status(status, submitted(Side::Home, ClaimOutcome::AwaitingOpponent)).unwrap();
        assert_eq!(status, MatchStatus::HomeSubmitted);
        status = next_status(status, submitted(Side::Away, ClaimOutcome::Agreed)).unwrap();
        assert_eq!(status, MatchStatus::BothSubmitted);
        status = next_status(status, MatchEvent::Confirm).unwrap();
        assert_eq!(status, MatchStatus::Confirmed);
        assert_eq!(
            next_status(status, MatchEvent::RecordGoals).unwrap(),
            MatchStatus::Confirmed
        );
    }

    #[test]
    fn accept_and_decline_only_from_proposed() {
        assert_eq!(
            next_status(MatchStatus::Proposed, MatchEvent::Decline).unwrap(),
            MatchStatus::Declined
        );
        for from in [
            MatchStatus::Declined,
            MatchStatus::Scheduled,
            MatchStatus::HomeSubmitted,
            MatchStatus::Confirmed,
        ] {
            let err = next_status(from, MatchEvent::Accept).unwrap_err();
            assert_eq!(err.from, from);
            assert!(next_status(from, MatchEvent::Decline).is_err());
        }
    }

    #[test]
    fn scores_rejected_outside_reporting_states() {
        for from in [
            MatchStatus::Proposed,
            MatchStatus::Declined,
            MatchStatus::BothSubmitted,
            MatchStatus::Confirmed,
        ] {
            assert!(
                next_status(from, submitted(Side::Home, ClaimOutcome::AwaitingOpponent)).is_err()
            );
        }
    }

    #[test]
    fn disagreement_leads_to_dispute_and_can_recover() {
        let status = next_status(
            MatchStatus::AwaySubmitted,
            submitted(Side::Home, ClaimOutcome::Disagreed),
        )
        .unwrap();
        assert_eq!(status, MatchStatus::Disputed);

        let status = next_status(status, submitted(Side::Away, ClaimOutcome::Agreed)).unwrap();
        assert_eq!(status, MatchStatus::BothSubmitted);
    }

    #[test]
    fn goals_and_confirmation_need_the_right_state() {
        assert!(next_status(MatchStatus::Scheduled, MatchEvent::RecordGoals).is_err());
        assert!(next_status(MatchStatus::Disputed, MatchEvent::Confirm).is_err());
        assert!(next_status(MatchStatus::Confirmed, MatchEvent::Confirm).is_err());
    }
}
