//! Aggregate point application.
//!
//! Every rating mutation is a versioned read-modify-write retried on
//! contention. Credited records remember the outcome keys they already
//! absorbed, so a fan-out can be replayed without double counting.

use std::{fmt, time::Duration};

use futures::future::join_all;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{
            ActivityEntity, CreditReceipts, MatchEntity, PlayerEntity, PlayerRatingEntity,
            TeamEntity, TeamRatingEntity,
        },
        record_store::RecordStore,
        records::{self, Record, Versioned},
    },
    error::ServiceError,
    rating::{self, MatchResult},
};

const BACKOFF_BASE: Duration = Duration::from_millis(5);
const BACKOFF_CAP: Duration = Duration::from_millis(250);

/// Decision taken by a mutation closure for the record it was handed.
#[derive(Debug)]
pub enum Change<R> {
    /// Persist the mutated record.
    Write(R),
    /// Leave the stored record untouched.
    Keep(R),
}

/// Result of [`modify`]: the record as last seen and what the closure returned.
#[derive(Debug)]
pub struct Modified<T, R> {
    /// Record as last read or written.
    pub current: Versioned<T>,
    /// What the closure returned.
    pub value: R,
    /// Whether a write was committed.
    pub written: bool,
}

/// Delay before retry number `attempt`: exponential, capped, with full jitter.
fn backoff(attempt: u32) -> Duration {
    let ceiling = BACKOFF_BASE
        .saturating_mul(1 << attempt.min(16))
        .min(BACKOFF_CAP);
    let millis = rand::rng().random_range(0..=ceiling.as_millis() as u64);
    Duration::from_millis(millis)
}

/// Read `key`, apply `change`, and write the result conditionally on the read version.
///
/// A lost race reloads the record and runs `change` again, so the closure must be
/// a pure function of the record it receives. `seed` builds the record when it
/// does not exist yet; without it a missing record is `NotFound`.
pub async fn modify<T, R, F>(
    store: &dyn RecordStore,
    key: &str,
    max_attempts: u32,
    seed: Option<&(dyn Fn() -> T + Sync)>,
    mut change: F,
) -> Result<Modified<T, R>, ServiceError>
where
    T: Record + Clone,
    F: FnMut(&mut T) -> Result<Change<R>, ServiceError>,
{
    for attempt in 0..max_attempts.max(1) {
        if attempt > 0 {
            sleep(backoff(attempt)).await;
        }

        let loaded = records::find::<T>(store, key).await?;
        let (read_version, mut record) = match (loaded, seed) {
            (Some(Versioned { version, record }), _) => (Some(version), record),
            (None, Some(seed)) => (None, seed()),
            (None, None) => {
                return Err(ServiceError::NotFound(format!(
                    "{key} not found in {}",
                    T::COLLECTION
                )));
            }
        };

        let value = match change(&mut record)? {
            Change::Keep(value) => {
                return Ok(Modified {
                    current: Versioned {
                        version: read_version.unwrap_or(0),
                        record,
                    },
                    value,
                    written: false,
                });
            }
            Change::Write(value) => value,
        };

        let outcome = match read_version {
            Some(version) => records::replace(store, version, record).await,
            None => records::create(store, record).await,
        };

        match outcome {
            Ok(current) => {
                return Ok(Modified {
                    current,
                    value,
                    written: true,
                });
            }
            Err(err) if err.is_contention() => {
                debug!(
                    collection = %T::COLLECTION,
                    key,
                    attempt,
                    "lost optimistic write; retrying"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    warn!(
        collection = %T::COLLECTION,
        key,
        max_attempts,
        "giving up after repeated write conflicts"
    );
    Err(ServiceError::Internal(format!(
        "too much contention on {}/{key}",
        T::COLLECTION
    )))
}

/// What an outcome contributes to one rating bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credit {
    /// A confirmed match result from the credited side's perspective.
    Match(MatchResult),
    /// Completion of a group activity.
    Activity,
    /// Individual goal and assist tallies from one recording call.
    Goals { goals: u32, assists: u32 },
}

impl Credit {
    /// Fold this credit into a player's per-sport bucket.
    pub fn apply_to_player(self, bucket: &mut PlayerRatingEntity) {
        match self {
            Credit::Match(result) => {
                let earned = rating::match_points(result, bucket.win_streak);
                bucket.add_points(earned.points);
                bucket.games += 1;
                if result == MatchResult::Win {
                    bucket.wins += 1;
                }
                bucket.win_streak = earned.new_win_streak;
            }
            Credit::Activity => {
                bucket.add_points(rating::activity_points());
                bucket.games += 1;
            }
            Credit::Goals { goals, assists } => {
                bucket.add_points(rating::goal_points(goals));
                bucket.goals += goals;
                bucket.assists += assists;
            }
        }
    }

    /// Fold this credit into a team rating. Goal tallies are individual only.
    pub fn apply_to_team(self, rating: &mut TeamRatingEntity) {
        match self {
            Credit::Match(result) => {
                let earned = rating::match_points(result, rating.win_streak);
                rating.add_points(earned.points);
                rating.games += 1;
                if result == MatchResult::Win {
                    rating.wins += 1;
                }
                rating.win_streak = earned.new_win_streak;
            }
            Credit::Activity => {
                rating.add_points(rating::activity_points());
                rating.games += 1;
            }
            Credit::Goals { .. } => {}
        }
    }
}

/// One entity to credit during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Team points for an outcome.
    Team {
        /// Team to credit.
        team_id: Uuid,
        /// Outcome the credit belongs to.
        outcome_key: String,
        /// What to credit.
        credit: Credit,
    },
    /// Player points in one sport.
    Player {
        /// Player to credit.
        identity: String,
        /// Sport bucket to credit.
        sport: String,
        /// Outcome the credit belongs to.
        outcome_key: String,
        /// What to credit.
        credit: Credit,
    },
}

impl Target {
    /// Receipt the outcome record keeps once this target holds its credit.
    pub fn receipt(&self) -> String {
        match self {
            Target::Team {
                team_id,
                outcome_key,
                ..
            } => format!("{outcome_key}|team:{team_id}"),
            Target::Player {
                identity,
                outcome_key,
                ..
            } => format!("{outcome_key}|player:{identity}"),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Team { team_id, .. } => write!(f, "team {team_id}"),
            Target::Player { identity, .. } => write!(f, "player {identity}"),
        }
    }
}

/// Tally of a completed fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Entities credited by this call.
    pub applied: usize,
    /// Entities that had already absorbed the outcome.
    pub skipped: usize,
}

/// Match or activity whose credits are tracked on the record itself.
pub trait OutcomeRecord: Record + Clone {
    /// Receipts of the credits handed out so far.
    fn receipts(&self) -> &CreditReceipts;

    /// Mutable access for issuing new receipts.
    fn receipts_mut(&mut self) -> &mut CreditReceipts;
}

impl OutcomeRecord for MatchEntity {
    fn receipts(&self) -> &CreditReceipts {
        &self.credited
    }

    fn receipts_mut(&mut self) -> &mut CreditReceipts {
        &mut self.credited
    }
}

impl OutcomeRecord for ActivityEntity {
    fn receipts(&self) -> &CreditReceipts {
        &self.credited
    }

    fn receipts_mut(&mut self) -> &mut CreditReceipts {
        &mut self.credited
    }
}

/// Credit a team once per `outcome_key`. Returns whether anything changed.
pub async fn credit_team(
    store: &dyn RecordStore,
    config: &AppConfig,
    team_id: Uuid,
    outcome_key: &str,
    credit: Credit,
) -> Result<bool, ServiceError> {
    let capacity = config.ledger_capacity;
    let modified = modify::<TeamEntity, _, _>(
        store,
        &team_id.to_string(),
        config.max_update_attempts,
        None,
        |team| {
            if team.applied.contains(outcome_key) {
                return Ok(Change::Keep(()));
            }
            credit.apply_to_team(&mut team.rating);
            team.applied.record(outcome_key.to_owned(), capacity);
            Ok(Change::Write(()))
        },
    )
    .await?;
    Ok(modified.written)
}

/// Credit a player's `sport` bucket once per `outcome_key`, creating the profile on first credit.
pub async fn credit_player(
    store: &dyn RecordStore,
    config: &AppConfig,
    identity: &str,
    sport: &str,
    outcome_key: &str,
    credit: Credit,
) -> Result<bool, ServiceError> {
    let capacity = config.ledger_capacity;
    let seed = || PlayerEntity::new(identity);
    let modified = modify::<PlayerEntity, _, _>(
        store,
        identity,
        config.max_update_attempts,
        Some(&seed),
        |player| {
            if player.applied.contains(outcome_key) {
                return Ok(Change::Keep(()));
            }
            credit.apply_to_player(player.rating_mut(sport));
            player.applied.record(outcome_key.to_owned(), capacity);
            Ok(Change::Write(()))
        },
    )
    .await?;
    Ok(modified.written)
}

async fn credit_target(
    store: &dyn RecordStore,
    config: &AppConfig,
    target: &Target,
) -> Result<bool, ServiceError> {
    match target {
        Target::Team {
            team_id,
            outcome_key,
            credit,
        } => credit_team(store, config, *team_id, outcome_key, *credit).await,
        Target::Player {
            identity,
            sport,
            outcome_key,
            credit,
        } => credit_player(store, config, identity, sport, outcome_key, *credit).await,
    }
}

/// Credit every target concurrently and tally the results.
///
/// Returns the report, the targets now holding the credit and the names of
/// the targets that failed.
async fn credit_all<'a>(
    store: &dyn RecordStore,
    config: &AppConfig,
    targets: &[&'a Target],
) -> (FanOutReport, Vec<&'a Target>, Vec<String>) {
    let results = join_all(
        targets
            .iter()
            .map(|target| credit_target(store, config, target)),
    )
    .await;

    let mut report = FanOutReport::default();
    let mut credited = Vec::new();
    let mut failed = Vec::new();
    for (target, result) in targets.iter().copied().zip(results) {
        match result {
            Ok(written) => {
                if written {
                    report.applied += 1;
                } else {
                    report.skipped += 1;
                }
                credited.push(target);
            }
            Err(err) => {
                warn!(%target, error = %err, "failed to credit outcome");
                failed.push(target.to_string());
            }
        }
    }
    (report, credited, failed)
}

fn finish(report: FanOutReport, failed: Vec<String>) -> Result<FanOutReport, ServiceError> {
    if !failed.is_empty() {
        return Err(ServiceError::Internal(format!(
            "outcome is final but crediting failed for {}; settle to retry",
            failed.join(", ")
        )));
    }

    info!(
        applied = report.applied,
        skipped = report.skipped,
        "outcome credited"
    );
    Ok(report)
}

/// Fan out the credits of the outcome stored under `key` and issue receipts.
///
/// Targets the outcome record already holds a receipt for are skipped before
/// any rating is touched, so a replay stays exact however many later outcomes
/// the credited entities absorbed. The per-entity ledgers remain a second
/// guard for the window between crediting and issuing the receipt.
pub async fn credit_outcome<T: OutcomeRecord>(
    store: &dyn RecordStore,
    config: &AppConfig,
    key: &str,
    targets: &[Target],
) -> Result<FanOutReport, ServiceError> {
    let owner = records::find::<T>(store, key).await?.ok_or_else(|| {
        ServiceError::NotFound(format!("{key} not found in {}", T::COLLECTION))
    })?;
    let pending: Vec<&Target> = targets
        .iter()
        .filter(|target| !owner.record.receipts().contains(&target.receipt()))
        .collect();

    let (mut report, credited, failed) = credit_all(store, config, &pending).await;
    report.skipped += targets.len() - pending.len();

    if !credited.is_empty() {
        let receipts: Vec<String> = credited.iter().map(|target| target.receipt()).collect();
        modify::<T, _, _>(store, key, config.max_update_attempts, None, |owner| {
            let issued = owner.receipts_mut();
            let mut fresh = false;
            for receipt in &receipts {
                fresh |= issued.insert(receipt.clone());
            }
            Ok(if fresh {
                Change::Write(())
            } else {
                Change::Keep(())
            })
        })
        .await?;
    }

    finish(report, failed)
}
