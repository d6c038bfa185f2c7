//! Turns one captain's self-referential report into a canonical claim.
//!
//! Captains report `(our, their)`; claims are stored as `(home, away)` so the
//! two sides can be compared without knowing who wrote them.

use crate::{
    dao::models::{MatchEntity, ScoreClaimEntity, Side},
    error::ServiceError,
    rating::MatchResult,
    state::match_lifecycle::ClaimOutcome,
};

/// Check one reported score: present and non-negative.
pub fn validate_score(label: &str, value: Option<i64>) -> Result<u32, ServiceError> {
    let value =
        value.ok_or_else(|| ServiceError::InvalidArgument(format!("{label} is required")))?;
    u32::try_from(value)
        .map_err(|_| ServiceError::InvalidArgument(format!("{label} must be between 0 and {}", u32::MAX)))
}

/// Convert a self-reported pair into `(home, away)` order.
pub fn canonicalize(side: Side, our: u32, their: u32) -> (u32, u32) {
    match side {
        Side::Home => (our, their),
        Side::Away => (their, our),
    }
}

/// Compare the claim just written by `side` against the opponent's, if any.
pub fn claim_outcome(entity: &MatchEntity, side: Side) -> ClaimOutcome {
    match (entity.claim(side), entity.claim(side.opposite())) {
        (Some(ours), Some(theirs)) if ours.agrees_with(theirs) => ClaimOutcome::Agreed,
        (Some(_), Some(_)) => ClaimOutcome::Disagreed,
        _ => ClaimOutcome::AwaitingOpponent,
    }
}

/// Store `claim` for `side` and report how it relates to the other side.
pub fn apply_claim(entity: &mut MatchEntity, side: Side, claim: ScoreClaimEntity) -> ClaimOutcome {
    *entity.claim_mut(side) = Some(claim);
    claim_outcome(entity, side)
}

/// Per-side results derived from the canonical score, once both sides agree.
pub fn results(entity: &MatchEntity) -> Option<(MatchResult, MatchResult)> {
    let home = entity.home_score()?;
    let away = entity.away_score()?;
    let home_result = MatchResult::from_scores(home, away);
    Some((home_result, home_result.mirrored()))
}
