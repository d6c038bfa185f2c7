//! Minimal team registry and the player rating read view.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{OutcomeLedger, PlayerEntity, TeamEntity, TeamRatingEntity},
        record_store::RecordStore,
        records::{self, Versioned},
    },
    dto::{
        required_text,
        teams::{AddMemberRequest, PlayerView, RegisterTeamRequest, TeamView},
    },
    error::ServiceError,
    services::aggregate::{self, Change},
    state::SharedState,
};

/// Register a team; the caller becomes its captain and first member.
pub async fn register_team(
    state: &SharedState,
    caller: &str,
    request: RegisterTeamRequest,
) -> Result<TeamView, ServiceError> {
    let name = required_text("name", request.name)?;
    let sport = required_text("sport", request.sport)?;
    let store = state.require_record_store().await?;

    let team = TeamEntity {
        id: Uuid::new_v4(),
        name,
        sport,
        captain_id: caller.to_owned(),
        members: vec![caller.to_owned()],
        rating: TeamRatingEntity::default(),
        applied: OutcomeLedger::default(),
        seasons: Default::default(),
        created_at: SystemTime::now(),
    };
    let created = records::create(store.as_ref(), team).await?;
    info!(team_id = %created.record.id, captain = caller, "team registered");
    Ok(created.record.into())
}

/// Load a team with its standing.
pub async fn get_team(state: &SharedState, team_id: Uuid) -> Result<TeamView, ServiceError> {
    let store = state.require_record_store().await?;
    Ok(load_team(store.as_ref(), team_id).await?.record.into())
}

/// Add an identity to the roster. Captain only.
pub async fn add_member(
    state: &SharedState,
    team_id: Uuid,
    caller: &str,
    request: AddMemberRequest,
) -> Result<TeamView, ServiceError> {
    let identity = required_text("identity", request.identity)?;
    let store = state.require_record_store().await?;

    let team = load_team(store.as_ref(), team_id).await?;
    require_captain(&team.record, caller)?;

    let updated = aggregate::modify::<TeamEntity, _, _>(
        store.as_ref(),
        &team_id.to_string(),
        state.config().max_update_attempts,
        None,
        |team| {
            if team.is_member(&identity) {
                return Err(ServiceError::Conflict(format!(
                    "{identity} is already a member of team {team_id}"
                )));
            }
            team.members.push(identity.clone());
            Ok(Change::Write(()))
        },
    )
    .await?;

    info!(%team_id, member = %identity, "member added");
    Ok(updated.current.record.into())
}

/// Ratings of a player across every sport they have been credited in.
pub async fn get_player(state: &SharedState, identity: &str) -> Result<PlayerView, ServiceError> {
    let store = state.require_record_store().await?;
    let player = records::find::<PlayerEntity>(store.as_ref(), identity)
        .await?
        .map(|versioned| versioned.record)
        .ok_or_else(|| ServiceError::NotFound(format!("player {identity} has no ratings")))?;
    Ok(player.into())
}

/// Load a team or fail with `NotFound`.
pub(crate) async fn load_team(
    store: &dyn RecordStore,
    team_id: Uuid,
) -> Result<Versioned<TeamEntity>, ServiceError> {
    records::find::<TeamEntity>(store, &team_id.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team {team_id} not found")))
}

/// Fail with `Forbidden` unless `caller` captains `team`.
pub(crate) fn require_captain(team: &TeamEntity, caller: &str) -> Result<(), ServiceError> {
    if team.captain_id == caller {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "{caller} is not the captain of team {}",
            team.id
        )))
    }
}
