/// Activity status machine.
pub mod activity_lifecycle;
/// Match status machine.
pub mod match_lifecycle;
mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::record_store::RecordStore, error::ServiceError};

pub use self::sse::{OUTCOME_STREAM_CAPACITY, SseHub};

/// Handle to [`AppState`] shared by every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle, the outcome stream and configuration.
pub struct AppState {
    record_store: RwLock<Option<Arc<dyn RecordStore>>>,
    outcomes: SseHub,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            record_store: RwLock::new(None),
            outcomes: SseHub::default(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Build a state that is already connected to `store`.
    pub fn with_store(config: AppConfig, store: Arc<dyn RecordStore>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            record_store: RwLock::new(Some(store)),
            outcomes: SseHub::default(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Configuration the state was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current record store, if one is installed.
    pub async fn record_store(&self) -> Option<Arc<dyn RecordStore>> {
        let guard = self.record_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current record store, or [`ServiceError::Degraded`] while storage is away.
    pub async fn require_record_store(&self) -> Result<Arc<dyn RecordStore>, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.record_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new record store implementation and leave degraded mode.
    pub async fn install_record_store(&self, store: Arc<dyn RecordStore>) {
        {
            let mut guard = self.record_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current record store and enter degraded mode.
    pub async fn clear_record_store(&self) {
        {
            let mut guard = self.record_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the outcome SSE stream.
    pub fn outcomes(&self) -> &SseHub {
        &self.outcomes
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}
