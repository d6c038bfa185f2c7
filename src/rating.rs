//! Pure points and tier arithmetic shared by match and activity outcomes.
//!
//! Nothing in here performs I/O. Tiers are always derived from a points total
//! and never stored independently of it.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Base points every participant receives for a played match.
pub const MATCH_BASE_POINTS: u32 = 3;
/// Extra points on top of the base for a win.
pub const WIN_BONUS: u32 = 4;
/// Extra points on top of the base for a draw.
pub const DRAW_BONUS: u32 = 1;
/// Points credited per goal scored.
pub const POINTS_PER_GOAL: u32 = 2;
/// Flat points credited for taking part in a completed activity.
pub const ACTIVITY_POINTS: u32 = 5;

/// Outcome of a match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MatchResult {
    /// The team scored more than its opponent.
    Win,
    /// Both teams scored the same.
    Draw,
    /// The team scored less than its opponent.
    Loss,
}

impl MatchResult {
    /// Derive the result for a team from its own score and the opponent's.
    pub fn from_scores(own: u32, opponent: u32) -> Self {
        match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => MatchResult::Win,
            std::cmp::Ordering::Equal => MatchResult::Draw,
            std::cmp::Ordering::Less => MatchResult::Loss,
        }
    }

    /// Result seen from the other side of the same fixture.
    pub fn mirrored(self) -> Self {
        match self {
            MatchResult::Win => MatchResult::Loss,
            MatchResult::Draw => MatchResult::Draw,
            MatchResult::Loss => MatchResult::Win,
        }
    }

    /// Lowercase label used in logs and events.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::Win => "win",
            MatchResult::Draw => "draw",
            MatchResult::Loss => "loss",
        }
    }
}

/// Points earned for a match together with the streak to store afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPoints {
    /// Points to add to the running total.
    pub points: u32,
    /// Win streak after this match.
    pub new_win_streak: u32,
}

/// Points for a single match given the streak held before it.
///
/// A win adds the prior streak as a bonus; any non-win resets the streak.
pub fn match_points(result: MatchResult, prior_win_streak: u32) -> MatchPoints {
    let bonus = match result {
        MatchResult::Win => WIN_BONUS,
        MatchResult::Draw => DRAW_BONUS,
        MatchResult::Loss => 0,
    };
    let streak_bonus = if result == MatchResult::Win && prior_win_streak >= 1 {
        prior_win_streak
    } else {
        0
    };
    let new_win_streak = if result == MatchResult::Win {
        prior_win_streak.saturating_add(1)
    } else {
        0
    };

    MatchPoints {
        points: MATCH_BASE_POINTS + bonus + streak_bonus,
        new_win_streak,
    }
}

/// Individual points for `count` goals.
pub fn goal_points(count: u32) -> u32 {
    count.saturating_mul(POINTS_PER_GOAL)
}

/// Points for taking part in a completed activity.
pub fn activity_points() -> u32 {
    ACTIVITY_POINTS
}

/// Individual rank label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum PlayerTier {
    /// Below 25 points.
    B,
    /// 25 to 100 points.
    S,
    /// 101 to 300 points.
    A,
    /// 301 to 700 points.
    SP,
    /// 701 points and above.
    P,
}

impl PlayerTier {
    /// Tier label as stored and displayed.
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerTier::B => "B",
            PlayerTier::S => "S",
            PlayerTier::A => "A",
            PlayerTier::SP => "SP",
            PlayerTier::P => "P",
        }
    }
}

impl fmt::Display for PlayerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team rank label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum TeamTier {
    /// Below 51 team points.
    Rookie,
    /// 51 to 250 team points.
    Club,
    /// 251 to 800 team points.
    Crew,
    /// 801 to 2000 team points.
    Elite,
    /// 2001 team points and above.
    Legend,
}

impl TeamTier {
    /// Tier label as stored and displayed.
    pub fn as_str(self) -> &'static str {
        match self {
            TeamTier::Rookie => "Rookie",
            TeamTier::Club => "Club",
            TeamTier::Crew => "Crew",
            TeamTier::Elite => "Elite",
            TeamTier::Legend => "Legend",
        }
    }
}

impl fmt::Display for TeamTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier for an individual points total. Lower bounds are inclusive.
pub fn player_tier(points: u32) -> PlayerTier {
    match points {
        701.. => PlayerTier::P,
        301.. => PlayerTier::SP,
        101.. => PlayerTier::A,
        25.. => PlayerTier::S,
        _ => PlayerTier::B,
    }
}

/// Tier for a team points total. Lower bounds are inclusive.
pub fn team_tier(tp: u32) -> TeamTier {
    match tp {
        2001.. => TeamTier::Legend,
        801.. => TeamTier::Elite,
        251.. => TeamTier::Crew,
        51.. => TeamTier::Club,
        _ => TeamTier::Rookie,
    }
}

/// Apply a season decay expressed in percent, rounding down.
pub fn decayed(points: u32, keep_percent: u8) -> u32 {
    let keep = u64::from(keep_percent.min(100));
    ((u64::from(points) * keep) / 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_points_follow_result_and_streak() {
        assert_eq!(
            match_points(MatchResult::Win, 0),
            MatchPoints {
                points: 7,
                new_win_streak: 1
            }
        );
        assert_eq!(
            match_points(MatchResult::Win, 2),
            MatchPoints {
                points: 9,
                new_win_streak: 3
            }
        );
        assert_eq!(
            match_points(MatchResult::Draw, 5),
            MatchPoints {
                points: 4,
                new_win_streak: 0
            }
        );
        assert_eq!(
            match_points(MatchResult::Loss, 3),
            MatchPoints {
                points: 3,
                new_win_streak: 0
            }
        );
    }

    #[test]
    fn flat_point_sources() {
        assert_eq!(goal_points(3), 6);
        assert_eq!(goal_points(0), 0);
        assert_eq!(activity_points(), 5);
    }

    #[test]
    fn player_tier_boundaries_are_inclusive() {
        assert_eq!(player_tier(0), PlayerTier::B);
        assert_eq!(player_tier(24), PlayerTier::B);
        assert_eq!(player_tier(25), PlayerTier::S);
        assert_eq!(player_tier(100), PlayerTier::S);
        assert_eq!(player_tier(101), PlayerTier::A);
        assert_eq!(player_tier(300), PlayerTier::A);
        assert_eq!(player_tier(301), PlayerTier::SP);
        assert_eq!(player_tier(700), PlayerTier::SP);
        assert_eq!(player_tier(701), PlayerTier::P);
    }

    #[test]
    fn team_tier_boundaries_are_inclusive() {
        assert_eq!(team_tier(50), TeamTier::Rookie);
        assert_eq!(team_tier(51), TeamTier::Club);
        assert_eq!(team_tier(250), TeamTier::Club);
        assert_eq!(team_tier(251), TeamTier::Crew);
        assert_eq!(team_tier(800), TeamTier::Crew);
        assert_eq!(team_tier(801), TeamTier::Elite);
        assert_eq!(team_tier(2000), TeamTier::Elite);
        assert_eq!(team_tier(2001), TeamTier::Legend);
    }

    #[test]
    fn results_are_derived_from_scores() {
        assert_eq!(MatchResult::from_scores(2, 1), MatchResult::Win);
        assert_eq!(MatchResult::from_scores(1, 1), MatchResult::Draw);
        assert_eq!(MatchResult::from_scores(0, 3), MatchResult::Loss);
        assert_eq!(MatchResult::Win.mirrored(), MatchResult::Loss);
        assert_eq!(MatchResult::Draw.mirrored(), MatchResult::Draw);
    }

    #[test]
    fn alternating_results_never_build_a_streak() {
        let mut streak = 0;
        for result in [
            MatchResult::Win,
            MatchResult::Loss,
            MatchResult::Win,
            MatchResult::Loss,
            MatchResult::Win,
        ] {
            streak = match_points(result, streak).new_win_streak;
            assert!(streak <= 1);
        }
        assert_eq!(streak, 1);
    }

    #[test]
    fn decay_rounds_down() {
        assert_eq!(decayed(101, 50), 50);
        assert_eq!(decayed(0, 50), 0);
        assert_eq!(decayed(7, 100), 7);
        assert_eq!(decayed(7, 0), 0);
    }
}
