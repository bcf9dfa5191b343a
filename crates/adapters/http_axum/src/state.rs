//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use roomsense_app::poller::PollerStatus;
use roomsense_app::ports::{KeyValueStore, ReadingSource};
use roomsense_app::services::history_service::HistoryService;
use roomsense_app::services::latest_reading::LatestReadingStore;

/// Application state shared across all axum handlers.
///
/// Generic over the history storage and the reading source to avoid dynamic
/// dispatch. `Clone` is implemented manually so neither needs to be `Clone`.
pub struct AppState<S, R> {
    /// Time-gated history log.
    pub history: Arc<HistoryService<S>>,
    /// Last payload pushed by the device.
    pub latest: Arc<LatestReadingStore>,
    /// Source the poller reads from; sensor toggles are forwarded to it.
    pub source: Arc<R>,
    /// Status updates published by the poller.
    pub poller: watch::Receiver<PollerStatus>,
}

impl<S, R> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self {
            history: Arc::clone(&self.history),
            latest: Arc::clone(&self.latest),
            source: Arc::clone(&self.source),
            poller: self.poller.clone(),
        }
    }
}

impl<S, R> AppState<S, R>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    /// Create a new application state from shared services.
    ///
    /// The history, the latest-reading store and the source are usually
    /// shared with the poller task, hence the `Arc`s. When the poller reads
    /// pushed values in-process, `source` is the same store as `latest`.
    pub fn new(
        history: Arc<HistoryService<S>>,
        latest: Arc<LatestReadingStore>,
        source: Arc<R>,
        poller: watch::Receiver<PollerStatus>,
    ) -> Self {
        Self {
            history,
            latest,
            source,
            poller,
        }
    }

    /// Create a state whose poller status never changes.
    ///
    /// Useful when no poller runs, e.g. in tests.
    pub fn without_poller(
        history: Arc<HistoryService<S>>,
        latest: Arc<LatestReadingStore>,
        source: Arc<R>,
    ) -> Self {
        let (_, poller) = watch::channel(PollerStatus::default());
        Self::new(history, latest, source, poller)
    }
}
