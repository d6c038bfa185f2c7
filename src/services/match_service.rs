use std::time::SystemTime;

use indexmap::IndexMap;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{GoalEntity, MatchEntity, ScoreClaimEntity, Side, TeamEntity},
        record_store::RecordStore,
        records::{self, Versioned, team_lookup},
    },
    dto::{
        matches::{
            MatchView, ProposeMatchRequest, RecordGoalsRequest, SubmitScoreRequest,
            TeamActionRequest,
        },
        parse_timestamp, required, required_text,
    },
    error::ServiceError,
    services::{
        aggregate::{self, Change, Credit, Target},
        reconciliation, sse_events,
        team_service::{load_team, require_captain},
    },
    state::{
        SharedState,
        match_lifecycle::{MatchEvent, MatchStatus, next_status},
    },
};

/// Propose a fixture. The caller must captain the home team.
pub async fn propose(
    state: &SharedState,
    caller: &str,
    request: ProposeMatchRequest,
) -> Result<MatchView, ServiceError> {
    let home_team_id = required("homeTeamId", request.home_team_id)?;
    let away_team_id = required("awayTeamId", request.away_team_id)?;
    if home_team_id == away_team_id {
        return Err(ServiceError::InvalidArgument(
            "a team cannot play against itself".into(),
        ));
    }
    let sport = required_text("sport", request.sport)?;
    let scheduled_at = parse_timestamp("scheduledAt", request.scheduled_at.as_deref())?;
    let venue = request
        .venue
        .map(|venue| venue.trim().to_owned())
        .filter(|venue| !venue.is_empty());

    let store = state.require_record_store().await?;
    let home = load_team(store.as_ref(), home_team_id).await?;
    load_team(store.as_ref(), away_team_id).await?;
    require_captain(&home.record, caller)?;

    let now = SystemTime::now();
    let entity = MatchEntity {
        id: Uuid::new_v4(),
        home_team_id,
        away_team_id,
        sport,
        scheduled_at,
        venue,
        status: MatchStatus::Proposed,
        proposed_by: caller.to_owned(),
        home_claim: None,
        away_claim: None,
        goals: Vec::new(),
        home_lineup: Vec::new(),
        away_lineup: Vec::new(),
        credited: Default::default(),
        created_at: now,
        updated_at: now,
        confirmed_at: None,
    };
    let created = records::create(store.as_ref(), entity).await?;
    info!(
        match_id = %created.record.id,
        %home_team_id,
        %away_team_id,
        "match proposed"
    );
    Ok(created.record.into())
}

/// Accept a proposed fixture. The caller must captain the away team.
pub async fn accept(
    state: &SharedState,
    match_id: Uuid,
    caller: &str,
) -> Result<MatchView, ServiceError> {
    respond(state, match_id, caller, MatchEvent::Accept).await
}

/// Decline a proposed fixture. The caller must captain the away team.
pub async fn decline(
    state: &SharedState,
    match_id: Uuid,
    caller: &str,
) -> Result<MatchView, ServiceError> {
    respond(state, match_id, caller, MatchEvent::Decline).await
}

async fn respond(
    state: &SharedState,
    match_id: Uuid,
    caller: &str,
    event: MatchEvent,
) -> Result<MatchView, ServiceError> {
    let store = state.require_record_store().await?;
    let entity = load_match(store.as_ref(), match_id).await?;
    let away = load_team(store.as_ref(), entity.record.away_team_id).await?;
    require_captain(&away.record, caller)?;

    let now = SystemTime::now();
    let modified = aggregate::modify::<MatchEntity, _, _>(
        store.as_ref(),
        &match_id.to_string(),
        state.config().max_update_attempts,
        None,
        |entity| {
            let from = entity.status;
            entity.status = next_status(from, event)?;
            entity.updated_at = now;
            Ok(Change::Write(from))
        },
    )
    .await?;

    let entity = modified.current.record;
    info!(%match_id, from = ?modified.value, to = ?entity.status, "match transition");
    Ok(entity.into())
}

/// Record one captain's report of the final score.
///
/// The report is stored as a canonical `(home, away)` claim. When it agrees
/// with the opponent's claim the match moves to `bothSubmitted` and is then
/// confirmed; when it disagrees the match becomes `disputed` until a captain
/// re-submits.
pub async fn submit_score(
    state: &SharedState,
    match_id: Uuid,
    caller: &str,
    request: SubmitScoreRequest,
) -> Result<MatchView, ServiceError> {
    let our = reconciliation::validate_score("ourScore", request.our_score)?;
    let their = reconciliation::validate_score("theirScore", request.their_score)?;
    let team_id = required("teamId", request.team_id)?;

    let store = state.require_record_store().await?;
    let entity = load_match(store.as_ref(), match_id).await?;
    let (side, _) = authorize_party(store.as_ref(), &entity.record, team_id, caller).await?;
    let (home, away) = reconciliation::canonicalize(side, our, their);

    let now = SystemTime::now();
    let modified = aggregate::modify::<MatchEntity, _, _>(
        store.as_ref(),
        &match_id.to_string(),
        state.config().max_update_attempts,
        None,
        |entity| {
            let from = entity.status;
            let claim = ScoreClaimEntity {
                home,
                away,
                submitted_by: caller.to_owned(),
                submitted_at: now,
            };
            let outcome = reconciliation::apply_claim(entity, side, claim);
            entity.status = next_status(from, MatchEvent::ScoreSubmitted { side, outcome })?;
            entity.updated_at = now;
            Ok(Change::Write(from))
        },
    )
    .await?;

    let entity = modified.current.record;
    info!(
        %match_id,
        side = ?side,
        from = ?modified.value,
        to = ?entity.status,
        "score submitted"
    );

    match entity.status {
        MatchStatus::BothSubmitted => {
            let confirmed = finalize(state, store.as_ref(), match_id).await?;
            Ok(confirmed.into())
        }
        MatchStatus::Disputed => {
            sse_events::broadcast_match_disputed(state, &entity);
            Ok(entity.into())
        }
        _ => Ok(entity.into()),
    }
}

/// Finish a stalled confirmation or replay the credits of a confirmed match.
pub async fn settle_match(
    state: &SharedState,
    match_id: Uuid,
    caller: &str,
    request: TeamActionRequest,
) -> Result<MatchView, ServiceError> {
    let team_id = required("teamId", request.team_id)?;
    let store = state.require_record_store().await?;
    let entity = load_match(store.as_ref(), match_id).await?;
    authorize_party(store.as_ref(), &entity.record, team_id, caller).await?;

    match entity.record.status {
        MatchStatus::BothSubmitted => {
            let confirmed = finalize(state, store.as_ref(), match_id).await?;
            Ok(confirmed.into())
        }
        MatchStatus::Confirmed => {
            let mut targets = match_targets(&entity.record);
            targets.extend(goal_targets(&entity.record, None));
            let report = aggregate::credit_outcome::<MatchEntity>(
                store.as_ref(),
                state.config(),
                &match_id.to_string(),
                &targets,
            )
            .await?;
            info!(%match_id, applied = report.applied, "match credits replayed");
            Ok(entity.record.into())
        }
        from => Err(ServiceError::InvalidState(format!(
            "match {match_id} cannot be settled while {from:?}"
        ))),
    }
}

/// Append scorer lines for the caller's team and credit the scorers.
pub async fn record_goals(
    state: &SharedState,
    match_id: Uuid,
    caller: &str,
    request: RecordGoalsRequest,
) -> Result<MatchView, ServiceError> {
    let team_id = required("teamId", request.team_id)?;
    if request.goals.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "at least one goal line is required".into(),
        ));
    }
    if let Some(line) = request.goals.iter().find(|line| line.count == 0) {
        return Err(ServiceError::InvalidArgument(format!(
            "goal count for {} must be at least 1",
            line.scorer
        )));
    }

    let store = state.require_record_store().await?;
    let entity = load_match(store.as_ref(), match_id).await?;
    let (side, team) = authorize_party(store.as_ref(), &entity.record, team_id, caller).await?;
    if entity.record.status != MatchStatus::Confirmed {
        return Err(ServiceError::InvalidState(format!(
            "goals can only be recorded for a confirmed match, {match_id} is {:?}",
            entity.record.status
        )));
    }

    for line in &request.goals {
        check_roster(&team.record, &line.scorer)?;
        if let Some(assist) = &line.assist {
            check_roster(&team.record, assist)?;
            if assist == &line.scorer {
                return Err(ServiceError::InvalidArgument(format!(
                    "{assist} cannot assist their own goal"
                )));
            }
        }
    }

    let batch = Uuid::new_v4();
    let added: u32 = request.goals.iter().map(|line| line.count).sum();
    let now = SystemTime::now();
    let modified = aggregate::modify::<MatchEntity, _, _>(
        store.as_ref(),
        &match_id.to_string(),
        state.config().max_update_attempts,
        None,
        |entity| {
            entity.status = next_status(entity.status, MatchEvent::RecordGoals)?;
            let own_score = match side {
                Side::Home => entity.home_score(),
                Side::Away => entity.away_score(),
            }
            .unwrap_or(0);
            let recorded = entity.goals_for(team_id);
            if recorded + added > own_score {
                return Err(ServiceError::InvalidArgument(format!(
                    "{} goals recorded for a team that scored {own_score}",
                    recorded + added
                )));
            }
            entity
                .goals
                .extend(request.goals.iter().map(|line| GoalEntity {
                    scorer: line.scorer.clone(),
                    team: team_id,
                    count: line.count,
                    assist: line.assist.clone(),
                    batch,
                }));
            entity.updated_at = now;
            Ok(Change::Write(()))
        },
    )
    .await?;

    let entity = modified.current.record;
    info!(%match_id, %team_id, %batch, goals = added, "goals recorded");

    let targets = goal_targets(&entity, Some(batch));
    aggregate::credit_outcome::<MatchEntity>(
        store.as_ref(),
        state.config(),
        &match_id.to_string(),
        &targets,
    )
    .await?;
    Ok(entity.into())
}

/// Matches where the team plays on either side, newest first.
pub async fn list_matches_for_team(
    state: &SharedState,
    team_id: Uuid,
) -> Result<Vec<MatchView>, ServiceError> {
    let store = state.require_record_store().await?;
    load_team(store.as_ref(), team_id).await?;

    let mut matches =
        records::query::<MatchEntity>(store.as_ref(), team_lookup(team_id)).await?;
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(matches.iter().map(MatchView::from).collect())
}

/// Load a match.
pub async fn get_match(state: &SharedState, match_id: Uuid) -> Result<MatchView, ServiceError> {
    let store = state.require_record_store().await?;
    Ok(load_match(store.as_ref(), match_id).await?.record.into())
}

/// Move `bothSubmitted` to `confirmed` and credit the result.
///
/// The conditional write on the match version lets exactly one caller win the
/// transition; everyone else sees `confirmed` and returns without crediting.
async fn finalize(
    state: &SharedState,
    store: &dyn RecordStore,
    match_id: Uuid,
) -> Result<MatchEntity, ServiceError> {
    let entity = load_match(store, match_id).await?;
    let home = load_team(store, entity.record.home_team_id).await?;
    let away = load_team(store, entity.record.away_team_id).await?;

    let now = SystemTime::now();
    let modified = aggregate::modify::<MatchEntity, _, _>(
        store,
        &match_id.to_string(),
        state.config().max_update_attempts,
        None,
        |entity| {
            if entity.status == MatchStatus::Confirmed {
                return Ok(Change::Keep(()));
            }
            entity.status = next_status(entity.status, MatchEvent::Confirm)?;
            entity.confirmed_at = Some(now);
            entity.updated_at = now;
            entity.home_lineup = home.record.members.clone();
            entity.away_lineup = away.record.members.clone();
            Ok(Change::Write(()))
        },
    )
    .await?;

    let entity = modified.current.record;
    if !modified.written {
        return Ok(entity);
    }

    info!(%match_id, from = ?MatchStatus::BothSubmitted, to = ?entity.status, "match transition");
    sse_events::broadcast_match_confirmed(state, &entity);

    let targets = match_targets(&entity);
    aggregate::credit_outcome::<MatchEntity>(store, state.config(), &match_id.to_string(), &targets)
        .await?;
    Ok(entity)
}

async fn load_match(
    store: &dyn RecordStore,
    match_id: Uuid,
) -> Result<Versioned<MatchEntity>, ServiceError> {
    records::find::<MatchEntity>(store, &match_id.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match {match_id} not found")))
}

/// Resolve the side `team_id` plays on after checking the caller captains it.
async fn authorize_party(
    store: &dyn RecordStore,
    entity: &MatchEntity,
    team_id: Uuid,
    caller: &str,
) -> Result<(Side, Versioned<TeamEntity>), ServiceError> {
    let team = load_team(store, team_id).await?;
    require_captain(&team.record, caller)?;
    let side = entity.side_of(team_id).ok_or_else(|| {
        ServiceError::InvalidState(format!(
            "team {team_id} does not play in match {}",
            entity.id
        ))
    })?;
    Ok((side, team))
}

fn check_roster(team: &TeamEntity, identity: &str) -> Result<(), ServiceError> {
    if team.is_member(identity) {
        Ok(())
    } else {
        Err(ServiceError::InvalidArgument(format!(
            "{identity} is not on the roster of team {}",
            team.id
        )))
    }
}

/// Team and lineup credits for a confirmed result.
fn match_targets(entity: &MatchEntity) -> Vec<Target> {
    let Some((home_result, away_result)) = reconciliation::results(entity) else {
        return Vec::new();
    };

    let mut targets = Vec::new();
    for (side, result) in [(Side::Home, home_result), (Side::Away, away_result)] {
        let team_id = entity.team_on(side);
        let outcome_key = format!("match:{}:{team_id}", entity.id);
        targets.push(Target::Team {
            team_id,
            outcome_key: outcome_key.clone(),
            credit: Credit::Match(result),
        });
        targets.extend(entity.lineup(side).iter().map(|identity| Target::Player {
            identity: identity.clone(),
            sport: entity.sport.clone(),
            outcome_key: outcome_key.clone(),
            credit: Credit::Match(result),
        }));
    }
    targets
}

/// Individual goal and assist credits, one per player and recording batch.
fn goal_targets(entity: &MatchEntity, only_batch: Option<Uuid>) -> Vec<Target> {
    let mut tallies: IndexMap<(Uuid, &str), (u32, u32)> = IndexMap::new();
    for goal in &entity.goals {
        if only_batch.is_some_and(|batch| batch != goal.batch) {
            continue;
        }
        tallies.entry((goal.batch, goal.scorer.as_str())).or_default().0 += goal.count;
        if let Some(assist) = &goal.assist {
            tallies.entry((goal.batch, assist.as_str())).or_default().1 += 1;
        }
    }

    tallies
        .into_iter()
        .map(|((batch, identity), (goals, assists))| Target::Player {
            identity: identity.to_owned(),
            sport: entity.sport.clone(),
            outcome_key: format!("goals:{batch}"),
            credit: Credit::Goals { goals, assists },
        })
        .collect()
}
