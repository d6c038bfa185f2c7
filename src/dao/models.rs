use std::{
    collections::{BTreeSet, VecDeque},
    time::SystemTime,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use uuid::Uuid;

use crate::{
    rating::{self, PlayerTier, TeamTier},
    state::{activity_lifecycle::ActivityStatus, match_lifecycle::MatchStatus},
};

/// Which side of a fixture a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Team that proposed the fixture.
    Home,
    /// Team that was challenged.
    Away,
}

impl Side {
    /// The other side of the same fixture.
    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Score pair asserted by one captain, already in (home, away) order.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreClaimEntity {
    /// Goals of the home team.
    pub home: u32,
    /// Goals of the away team.
    pub away: u32,
    /// Identity of the captain who submitted the claim.
    pub submitted_by: String,
    /// When the claim was stored.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub submitted_at: SystemTime,
}

impl ScoreClaimEntity {
    /// Whether two claims describe the same final score.
    pub fn agrees_with(&self, other: &ScoreClaimEntity) -> bool {
        self.home == other.home && self.away == other.away
    }
}

/// One scorer line recorded after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEntity {
    /// Identity of the player who scored.
    pub scorer: String,
    /// Team the goals count for.
    pub team: Uuid,
    /// Goals scored by this player in the line.
    pub count: u32,
    /// Identity credited with the assist, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist: Option<String>,
    /// Identifier of the recording call the line belongs to.
    pub batch: Uuid,
}

/// Persisted fixture between two teams.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntity {
    /// Unique match identifier.
    pub id: Uuid,
    /// Team whose captain proposed the fixture.
    pub home_team_id: Uuid,
    /// Team whose captain accepts or declines.
    pub away_team_id: Uuid,
    /// Sport bucket player points are credited to.
    pub sport: String,
    /// Planned kick-off, if known.
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub scheduled_at: Option<SystemTime>,
    /// Free-text venue.
    #[serde(default)]
    pub venue: Option<String>,
    /// Current lifecycle status.
    pub status: MatchStatus,
    /// Identity of the home captain who proposed.
    pub proposed_by: String,
    /// Score reported by the home captain.
    #[serde(default)]
    pub home_claim: Option<ScoreClaimEntity>,
    /// Score reported by the away captain.
    #[serde(default)]
    pub away_claim: Option<ScoreClaimEntity>,
    /// Scorer lines recorded after confirmation.
    #[serde(default)]
    pub goals: Vec<GoalEntity>,
    /// Rosters frozen at confirmation; replays credit the same players.
    #[serde(default)]
    pub home_lineup: Vec<String>,
    /// Away roster frozen at confirmation.
    #[serde(default)]
    pub away_lineup: Vec<String>,
    /// Credits this match has already handed out.
    #[serde(default)]
    pub credited: CreditReceipts,
    /// Creation timestamp.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub created_at: SystemTime,
    /// Timestamp of the last accepted write.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub updated_at: SystemTime,
    /// When the result became final.
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub confirmed_at: Option<SystemTime>,
}

impl MatchEntity {
    /// Side a team plays on, if it takes part in this fixture.
    pub fn side_of(&self, team_id: Uuid) -> Option<Side> {
        if team_id == self.home_team_id {
            Some(Side::Home)
        } else if team_id == self.away_team_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Team playing on `side`.
    pub fn team_on(&self, side: Side) -> Uuid {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }

    /// Frozen lineup of `side`; empty before confirmation.
    pub fn lineup(&self, side: Side) -> &[String] {
        match side {
            Side::Home => &self.home_lineup,
            Side::Away => &self.away_lineup,
        }
    }

    /// Claim reported for `side`, if any.
    pub fn claim(&self, side: Side) -> Option<&ScoreClaimEntity> {
        match side {
            Side::Home => self.home_claim.as_ref(),
            Side::Away => self.away_claim.as_ref(),
        }
    }

    /// Mutable slot for the claim of `side`.
    pub fn claim_mut(&mut self, side: Side) -> &mut Option<ScoreClaimEntity> {
        match side {
            Side::Home => &mut self.home_claim,
            Side::Away => &mut self.away_claim,
        }
    }

    /// Home score as reported by the home captain.
    pub fn home_score(&self) -> Option<u32> {
        self.home_claim.as_ref().map(|claim| claim.home)
    }

    /// Away score as reported by the away captain.
    pub fn away_score(&self) -> Option<u32> {
        self.away_claim.as_ref().map(|claim| claim.away)
    }

    /// Goals recorded so far for one team.
    pub fn goals_for(&self, team_id: Uuid) -> u32 {
        self.goals
            .iter()
            .filter(|goal| goal.team == team_id)
            .map(|goal| goal.count)
            .sum()
    }
}

/// Persisted non-competitive outing owned by a club.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntity {
    /// Unique activity identifier.
    pub id: Uuid,
    /// Club the activity belongs to.
    pub club_id: Uuid,
    /// Sport bucket participants are credited in.
    pub sport: String,
    /// Short human-readable title.
    pub title: String,
    /// Identity of the creator, the only one allowed to close it.
    pub created_by: String,
    /// Current lifecycle status.
    pub status: ActivityStatus,
    /// Participants in join order; the creator is always first.
    pub participants: Vec<String>,
    /// Planned start, if known.
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub scheduled_at: Option<SystemTime>,
    /// Creation timestamp.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub created_at: SystemTime,
    /// When the activity was completed.
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub completed_at: Option<SystemTime>,
    /// Credits this activity has already handed out.
    #[serde(default)]
    pub credited: CreditReceipts,
}

/// Bounded record of outcome keys already credited to an entity.
///
/// Crediting an outcome whose key is present is a no-op, which makes
/// point fan-out safe to replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeLedger(VecDeque<String>);

impl OutcomeLedger {
    /// Whether `key` was already credited.
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|entry| entry == key)
    }

    /// Remember `key`, evicting the oldest entries beyond `capacity`.
    pub fn record(&mut self, key: String, capacity: usize) {
        self.0.push_back(key);
        while self.0.len() > capacity.max(1) {
            self.0.pop_front();
        }
    }

    /// Number of remembered keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key is remembered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Credits an outcome record has handed out, one receipt per credited entity.
///
/// Unlike [`OutcomeLedger`] this set is never trimmed: it grows with the
/// lineup of a single match or activity, not with the history of a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditReceipts(BTreeSet<String>);

impl CreditReceipts {
    /// Whether `receipt` was already issued.
    pub fn contains(&self, receipt: &str) -> bool {
        self.0.contains(receipt)
    }

    /// Issue `receipt`. Returns `false` when it was already present.
    pub fn insert(&mut self, receipt: String) -> bool {
        self.0.insert(receipt)
    }

    /// Number of receipts issued.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was credited yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-sport standing of a player. `tier` is rewritten on every points change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRatingEntity {
    /// Tier derived from `points`.
    pub tier: PlayerTier,
    /// Accumulated points.
    pub points: u32,
    /// Matches and activities credited.
    pub games: u32,
    /// Matches won.
    pub wins: u32,
    /// Consecutive wins, reset by any other result.
    pub win_streak: u32,
    /// Goals scored.
    #[serde(default)]
    pub goals: u32,
    /// Assists provided.
    #[serde(default)]
    pub assists: u32,
}

impl Default for PlayerRatingEntity {
    fn default() -> Self {
        Self {
            tier: rating::player_tier(0),
            points: 0,
            games: 0,
            wins: 0,
            win_streak: 0,
            goals: 0,
            assists: 0,
        }
    }
}

impl PlayerRatingEntity {
    /// Add points and refresh the derived tier.
    pub fn add_points(&mut self, points: u32) {
        self.set_points(self.points.saturating_add(points));
    }

    /// Overwrite points and refresh the derived tier.
    pub fn set_points(&mut self, points: u32) {
        self.points = points;
        self.tier = rating::player_tier(points);
    }
}

/// Player profile section holding ratings keyed by sport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    /// Identity issued by the identity collaborator.
    pub id: String,
    /// Rating buckets keyed by sport.
    #[serde(default)]
    pub ratings: IndexMap<String, PlayerRatingEntity>,
    /// Recently credited outcome keys.
    #[serde(default)]
    pub applied: OutcomeLedger,
    /// Season labels whose decay was already applied.
    #[serde(default)]
    pub seasons: BTreeSet<String>,
}

impl PlayerEntity {
    /// Empty profile for `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Rating bucket for `sport`, created at zero state when absent.
    pub fn rating_mut(&mut self, sport: &str) -> &mut PlayerRatingEntity {
        self.ratings.entry(sport.to_owned()).or_default()
    }
}

/// Team-level standing. `tier` is rewritten on every `tp` change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRatingEntity {
    /// Tier derived from `tp`.
    pub tier: TeamTier,
    /// Team points.
    pub tp: u32,
    /// Matches and activities credited.
    pub games: u32,
    /// Matches won.
    pub wins: u32,
    /// Consecutive wins, reset by any other result.
    pub win_streak: u32,
}

impl Default for TeamRatingEntity {
    fn default() -> Self {
        Self {
            tier: rating::team_tier(0),
            tp: 0,
            games: 0,
            wins: 0,
            win_streak: 0,
        }
    }
}

impl TeamRatingEntity {
    /// Add team points and refresh the derived tier.
    pub fn add_points(&mut self, points: u32) {
        self.set_points(self.tp.saturating_add(points));
    }

    /// Overwrite team points and refresh the derived tier.
    pub fn set_points(&mut self, tp: u32) {
        self.tp = tp;
        self.tier = rating::team_tier(tp);
    }
}

/// Team or club record with its roster and embedded rating.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntity {
    /// Unique team identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sport the team plays.
    pub sport: String,
    /// Identity of the captain.
    pub captain_id: String,
    /// Roster in join order; the captain is always a member.
    pub members: Vec<String>,
    /// Embedded team rating.
    #[serde(default)]
    pub rating: TeamRatingEntity,
    /// Recently credited outcome keys.
    #[serde(default)]
    pub applied: OutcomeLedger,
    /// Season labels whose decay was already applied.
    #[serde(default)]
    pub seasons: BTreeSet<String>,
    /// Creation timestamp.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub created_at: SystemTime,
}

impl TeamEntity {
    /// Whether `identity` is on the roster.
    pub fn is_member(&self, identity: &str) -> bool {
        self.members.iter().any(|member| member == identity)
    }
}
