use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::ActivityEntity,
        record_store::RecordStore,
        records::{self, Versioned, team_lookup},
    },
    dto::{
        activities::{ActivityView, CreateActivityRequest},
        parse_timestamp, required, required_text,
    },
    error::ServiceError,
    services::{
        aggregate::{self, Change, Credit, Target},
        sse_events,
        team_service::load_team,
    },
    state::{
        SharedState,
        activity_lifecycle::{ActivityEvent, ActivityStatus, next_status},
    },
};

/// Open an activity for a club. The creator joins as first participant.
pub async fn create_activity(
    state: &SharedState,
    caller: &str,
    request: CreateActivityRequest,
) -> Result<ActivityView, ServiceError> {
    let club_id = required("clubId", request.club_id)?;
    let sport = required_text("sport", request.sport)?;
    let title = required_text("title", request.title)?;
    let scheduled_at = parse_timestamp("scheduledAt", request.scheduled_at.as_deref())?;

    let store = state.require_record_store().await?;
    load_team(store.as_ref(), club_id).await?;

    let entity = ActivityEntity {
        id: Uuid::new_v4(),
        club_id,
        sport,
        title,
        created_by: caller.to_owned(),
        status: ActivityStatus::Open,
        participants: vec![caller.to_owned()],
        scheduled_at,
        created_at: SystemTime::now(),
        completed_at: None,
        credited: Default::default(),
    };
    let created = records::create(store.as_ref(), entity).await?;
    info!(activity_id = %created.record.id, %club_id, "activity opened");
    Ok(created.record.into())
}

/// Add the caller to the participants of an open activity.
pub async fn join(
    state: &SharedState,
    activity_id: Uuid,
    caller: &str,
) -> Result<ActivityView, ServiceError> {
    let store = state.require_record_store().await?;
    let modified = aggregate::modify::<ActivityEntity, _, _>(
        store.as_ref(),
        &activity_id.to_string(),
        state.config().max_update_attempts,
        None,
        |entity| {
            next_status(entity.status, ActivityEvent::Join)?;
            if entity.participants.iter().any(|p| p == caller) {
                return Err(ServiceError::Conflict(format!(
                    "{caller} already joined activity {activity_id}"
                )));
            }
            entity.participants.push(caller.to_owned());
            Ok(Change::Write(()))
        },
    )
    .await
    .map_err(|err| not_found_as_activity(err, activity_id))?;

    info!(%activity_id, participant = caller, "activity joined");
    Ok(modified.current.record.into())
}

/// Close an activity and credit every participant and the club. Creator only.
pub async fn complete(
    state: &SharedState,
    activity_id: Uuid,
    caller: &str,
) -> Result<ActivityView, ServiceError> {
    let store = state.require_record_store().await?;
    let entity = load_activity(store.as_ref(), activity_id).await?;
    require_creator(&entity.record, caller)?;

    let now = SystemTime::now();
    let modified = aggregate::modify::<ActivityEntity, _, _>(
        store.as_ref(),
        &activity_id.to_string(),
        state.config().max_update_attempts,
        None,
        |entity| {
            entity.status = next_status(entity.status, ActivityEvent::Complete)?;
            entity.completed_at = Some(now);
            Ok(Change::Write(()))
        },
    )
    .await?;

    let entity = modified.current.record;
    info!(
        %activity_id,
        participants = entity.participants.len(),
        "activity completed"
    );
    sse_events::broadcast_activity_completed(state, &entity);

    aggregate::credit_outcome::<ActivityEntity>(
        store.as_ref(),
        state.config(),
        &activity_id.to_string(),
        &activity_targets(&entity),
    )
    .await?;
    Ok(entity.into())
}

/// Replay the credits of a completed activity. Creator only.
pub async fn settle_activity(
    state: &SharedState,
    activity_id: Uuid,
    caller: &str,
) -> Result<ActivityView, ServiceError> {
    let store = state.require_record_store().await?;
    let entity = load_activity(store.as_ref(), activity_id).await?;
    require_creator(&entity.record, caller)?;

    if entity.record.status != ActivityStatus::Completed {
        return Err(ServiceError::InvalidState(format!(
            "activity {activity_id} is still open"
        )));
    }

    let report = aggregate::credit_outcome::<ActivityEntity>(
        store.as_ref(),
        state.config(),
        &activity_id.to_string(),
        &activity_targets(&entity.record),
    )
    .await?;
    info!(%activity_id, applied = report.applied, "activity credits replayed");
    Ok(entity.record.into())
}

/// Activities owned by a club, newest first.
pub async fn list_activities_for_club(
    state: &SharedState,
    club_id: Uuid,
) -> Result<Vec<ActivityView>, ServiceError> {
    let store = state.require_record_store().await?;
    load_team(store.as_ref(), club_id).await?;

    let mut activities =
        records::query::<ActivityEntity>(store.as_ref(), team_lookup(club_id)).await?;
    activities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(activities.iter().map(ActivityView::from).collect())
}

/// Load an activity.
pub async fn get_activity(
    state: &SharedState,
    activity_id: Uuid,
) -> Result<ActivityView, ServiceError> {
    let store = state.require_record_store().await?;
    Ok(load_activity(store.as_ref(), activity_id)
        .await?
        .record
        .into())
}

async fn load_activity(
    store: &dyn RecordStore,
    activity_id: Uuid,
) -> Result<Versioned<ActivityEntity>, ServiceError> {
    records::find::<ActivityEntity>(store, &activity_id.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("activity {activity_id} not found")))
}

fn not_found_as_activity(err: ServiceError, activity_id: Uuid) -> ServiceError {
    match err {
        ServiceError::NotFound(_) => {
            ServiceError::NotFound(format!("activity {activity_id} not found"))
        }
        other => other,
    }
}

fn require_creator(entity: &ActivityEntity, caller: &str) -> Result<(), ServiceError> {
    if entity.created_by == caller {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "only {} can close activity {}",
            entity.created_by, entity.id
        )))
    }
}

/// Flat credit for every participant plus one for the club.
fn activity_targets(entity: &ActivityEntity) -> Vec<Target> {
    let outcome_key = format!("activity:{}", entity.id);
    std::iter::once(Target::Team {
        team_id: entity.club_id,
        outcome_key: outcome_key.clone(),
        credit: Credit::Activity,
    })
    .chain(entity.participants.iter().map(|identity| Target::Player {
        identity: identity.clone(),
        sport: entity.sport.clone(),
        outcome_key: outcome_key.clone(),
        credit: Credit::Activity,
    }))
    .collect()
}
