#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures::future::BoxFuture;
use matchday_back::{
    config::AppConfig,
    dao::{
        record_store::{Collection, RecordStore, StoredDocument, memory::MemoryStore},
        storage::{StorageError, StorageResult},
    },
    dto::{
        matches::{MatchView, ProposeMatchRequest, SubmitScoreRequest},
        teams::{AddMemberRequest, PlayerRatingView, RegisterTeamRequest, TeamView},
    },
    services::{match_service, team_service},
    state::{AppState, SharedState},
};
use uuid::Uuid;

pub const SPORT: &str = "soccer";

pub fn state() -> SharedState {
    AppState::with_store(AppConfig::default(), Arc::new(MemoryStore::new()))
}

pub fn state_with(config: AppConfig) -> SharedState {
    AppState::with_store(config, Arc::new(MemoryStore::new()))
}

/// Memory store that hands control back to the scheduler before every
/// operation, so concurrent requests interleave their reads and writes.
/// Conditional writes that lose a race are counted.
#[derive(Clone, Default)]
pub struct YieldingStore {
    inner: MemoryStore,
    conflicts: Arc<AtomicUsize>,
}

impl YieldingStore {
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }
}

impl RecordStore for YieldingStore {
    fn get(
        &self,
        collection: Collection,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            inner.get(collection, key).await
        })
    }

    fn put(
        &self,
        collection: Collection,
        document: StoredDocument,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            inner.put(collection, document).await
        })
    }

    fn update(
        &self,
        collection: Collection,
        document: StoredDocument,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        let conflicts = self.conflicts.clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            let result = inner.update(collection, document, expected_version).await;
            if matches!(result, Err(StorageError::VersionConflict { .. })) {
                conflicts.fetch_add(1, Ordering::SeqCst);
            }
            result
        })
    }

    fn query(
        &self,
        collection: Collection,
        lookup_key: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            inner.query(collection, lookup_key).await
        })
    }

    fn scan(&self, collection: Collection) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            inner.scan(collection).await
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.try_reconnect()
    }
}

/// State over a [`YieldingStore`] with a retry bound high enough for a crowd.
pub fn contended_state() -> (SharedState, YieldingStore) {
    let store = YieldingStore::default();
    let config = AppConfig {
        max_update_attempts: 64,
        ..AppConfig::default()
    };
    (AppState::with_store(config, Arc::new(store.clone())), store)
}

/// Register a team captained by `captain` with the extra `members`.
pub async fn team(state: &SharedState, name: &str, captain: &str, members: &[&str]) -> TeamView {
    let mut view = team_service::register_team(
        state,
        captain,
        RegisterTeamRequest {
            name: Some(name.into()),
            sport: Some(SPORT.into()),
        },
    )
    .await
    .unwrap();

    for member in members {
        view = team_service::add_member(
            state,
            view.id,
            captain,
            AddMemberRequest {
                identity: Some((*member).into()),
            },
        )
        .await
        .unwrap();
    }
    view
}

/// A match between `home` and `away` that the away captain already accepted.
pub async fn scheduled_match(state: &SharedState, home: &TeamView, away: &TeamView) -> MatchView {
    let proposed = match_service::propose(
        state,
        &home.captain_id,
        ProposeMatchRequest {
            home_team_id: Some(home.id),
            away_team_id: Some(away.id),
            sport: Some(SPORT.into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    match_service::accept(state, proposed.id, &away.captain_id)
        .await
        .unwrap()
}

pub fn score(team_id: Uuid, ours: i64, theirs: i64) -> SubmitScoreRequest {
    SubmitScoreRequest {
        team_id: Some(team_id),
        our_score: Some(ours),
        their_score: Some(theirs),
    }
}

pub async fn team_view(state: &SharedState, id: Uuid) -> TeamView {
    team_service::get_team(state, id).await.unwrap()
}

/// Rating bucket of `identity` for the default sport.
pub async fn player_rating(state: &SharedState, identity: &str) -> PlayerRatingView {
    let view = team_service::get_player(state, identity).await.unwrap();
    view.ratings
        .get(SPORT)
        .cloned()
        .unwrap_or_else(|| panic!("{identity} has no {SPORT} rating"))
}
