//! # roomsensed — roomsense daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Rehydrate the history from its persisted snapshot
//! - Spawn the reading poller against the configured source
//! - Build the axum router and serve until Ctrl+C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use roomsense_adapter_http_axum::state::AppState;
use roomsense_adapter_http_reqwest::HttpReadingSource;
use roomsense_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteKeyValueStore};
use roomsense_app::poller::{Poller, PollerConfig, PollerStatus};
use roomsense_app::ports::{KeyValueStore, ReadingSource};
use roomsense_app::services::history_service::HistoryService;
use roomsense_app::services::latest_reading::LatestReadingStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .with_context(|| format!("failed to open database {}", config.database_url()))?;
    let store = SqliteKeyValueStore::new(db.pool().clone());

    // Services
    let history = Arc::new(HistoryService::load(store, config.history_policy()).await);
    let latest = Arc::new(LatestReadingStore::new());

    match config.poller.source_url.as_deref() {
        Some(url) => {
            let source = HttpReadingSource::new(url)
                .with_context(|| format!("invalid poller source url {url}"))?;
            tracing::info!(url, "using remote sensor device");
            serve(&config, history, latest, Arc::new(source)).await
        }
        None => {
            tracing::info!("using readings pushed to this server");
            let source = Arc::clone(&latest);
            serve(&config, history, latest, source).await
        }
    }
}

/// Spawn the poller against `source`, then serve the HTTP API until Ctrl+C.
///
/// The same source backs the poller and the `/api/toggle-sensor` endpoint.
async fn serve<S, R>(
    config: &Config,
    history: Arc<HistoryService<S>>,
    latest: Arc<LatestReadingStore>,
    source: Arc<R>,
) -> anyhow::Result<()>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    // Poller
    let (status, poller) = if config.poller.enabled {
        spawn_poller(
            Arc::clone(&source),
            Arc::clone(&history),
            config.poller_config(),
        )
    } else {
        tracing::info!("poller disabled, history will not record readings");
        let (_, status) = watch::channel(PollerStatus::default());
        (status, None)
    };

    // HTTP
    let state = AppState::new(history, latest, source, status);
    let app = roomsense_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "roomsensed listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(poller) = poller {
        poller.abort();
    }
    tracing::info!("roomsensed stopped");

    Ok(())
}

fn spawn_poller<R, S>(
    source: R,
    history: Arc<HistoryService<S>>,
    config: PollerConfig,
) -> (watch::Receiver<PollerStatus>, Option<JoinHandle<()>>)
where
    R: ReadingSource + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
{
    let poller = Poller::new(source, history, config);
    let status = poller.subscribe();
    (status, Some(tokio::spawn(poller.run())))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
