//! Season rollover: points decay, streaks restart, history is kept.

use tracing::info;

use crate::{
    dao::{
        models::{PlayerEntity, TeamEntity},
        records::{self, Record},
    },
    dto::season::{SeasonResetRequest, SeasonResetResponse},
    error::ServiceError,
    rating,
    services::{
        aggregate::{self, Change},
        sse_events,
    },
    state::SharedState,
};

/// Decay every player bucket and team rating once per season `label`.
///
/// Interrupted resets can be re-run with the same label; records that were
/// already decayed are skipped.
pub async fn reset_season(
    state: &SharedState,
    request: SeasonResetRequest,
) -> Result<SeasonResetResponse, ServiceError> {
    let label = request.label.trim().to_owned();
    if label.is_empty() {
        return Err(ServiceError::InvalidArgument("label must not be empty".into()));
    }

    let store = state.require_record_store().await?;
    let config = state.config();
    let keep = config.season_decay_percent;

    let mut players_reset = 0;
    for player in records::scan::<PlayerEntity>(store.as_ref()).await? {
        let modified = aggregate::modify::<PlayerEntity, _, _>(
            store.as_ref(),
            &player.record.key(),
            config.max_update_attempts,
            None,
            |player| {
                if player.seasons.contains(&label) {
                    return Ok(Change::Keep(()));
                }
                for bucket in player.ratings.values_mut() {
                    bucket.set_points(rating::decayed(bucket.points, keep));
                    bucket.win_streak = 0;
                }
                player.seasons.insert(label.clone());
                Ok(Change::Write(()))
            },
        )
        .await?;
        players_reset += usize::from(modified.written);
    }

    let mut teams_reset = 0;
    for team in records::scan::<TeamEntity>(store.as_ref()).await? {
        let modified = aggregate::modify::<TeamEntity, _, _>(
            store.as_ref(),
            &team.record.key(),
            config.max_update_attempts,
            None,
            |team| {
                if team.seasons.contains(&label) {
                    return Ok(Change::Keep(()));
                }
                team.rating
                    .set_points(rating::decayed(team.rating.tp, keep));
                team.rating.win_streak = 0;
                team.seasons.insert(label.clone());
                Ok(Change::Write(()))
            },
        )
        .await?;
        teams_reset += usize::from(modified.written);
    }

    info!(%label, players_reset, teams_reset, "season reset");
    sse_events::broadcast_season_reset(state, &label, players_reset, teams_reset);

    Ok(SeasonResetResponse {
        label,
        players_reset,
        teams_reset,
    })
}
