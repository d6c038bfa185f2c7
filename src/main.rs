//! Matchday backend entrypoint wiring REST, SSE, tracing and the record store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchday_back::{
    config::AppConfig,
    dao::{
        record_store::{RecordStore, memory::MemoryStore},
        storage::StorageError,
    },
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".into());
    let app_state = build_state(&backend, config)?;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the record store backend. Remote backends start degraded and are
/// installed by the storage supervisor once reachable.
fn build_state(backend: &str, config: AppConfig) -> anyhow::Result<SharedState> {
    match backend {
        "memory" => Ok(AppState::with_store(config, Arc::new(MemoryStore::new()))),
        #[cfg(feature = "couch-store")]
        "couch" => {
            use matchday_back::dao::record_store::couchdb::{CouchConfig, CouchRecordStore};

            let couch = CouchConfig::from_env().context("reading CouchDB configuration")?;
            let state = AppState::new(config);
            tokio::spawn(matchday_back::services::storage_supervisor::run(
                state.clone(),
                move || {
                    let couch = couch.clone();
                    async move {
                        let store = CouchRecordStore::connect(couch).await?;
                        Ok::<Arc<dyn RecordStore>, StorageError>(Arc::new(store))
                    }
                },
            ));
            Ok(state)
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use matchday_back::dao::record_store::mongodb::{MongoConfig, MongoRecordStore};

            let state = AppState::new(config);
            tokio::spawn(matchday_back::services::storage_supervisor::run(
                state.clone(),
                || async {
                    let mongo = MongoConfig::from_env().await?;
                    let store = MongoRecordStore::connect(mongo).await?;
                    Ok::<Arc<dyn RecordStore>, StorageError>(Arc::new(store))
                },
            ));
            Ok(state)
        }
        other => bail!("unsupported STORE_BACKEND `{other}` (expected memory, couch or mongo)"),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
