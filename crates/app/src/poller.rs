//! Polling driver — fetches the current reading on a fixed period and offers
//! it to the history.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use roomsense_domain::error::SenseError;
use roomsense_domain::reading::{Reading, SensorPayload, looks_simulated};
use roomsense_domain::time::{Timestamp, now};

use crate::ports::{KeyValueStore, ReadingSource};
use crate::services::history_service::HistoryService;

/// Poll cadence and retry limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Period between two polls. Must be non-zero.
    pub interval: Duration,
    /// Consecutive failed fetches tolerated within one poll before the source
    /// is reported disconnected.
    pub max_retries: u32,
    /// Fixed pause between two attempts of the same poll.
    pub retry_delay: Duration,
    /// Classify readings by value range when the source carries no explicit
    /// simulation flag.
    pub detect_simulated: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            detect_simulated: true,
        }
    }
}

/// Reachability of the reading source as seen by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Snapshot of the poller's health, published after every attempt.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollerStatus {
    pub connection: ConnectionStatus,
    pub last_success: Option<Timestamp>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    /// Last payload fetched from the source.
    pub last_payload: Option<SensorPayload>,
}

/// Drives the history from a [`ReadingSource`].
///
/// Polls run one after another on a single task, so two offers can never
/// race the retention check; ticks missed while a poll is still retrying are
/// skipped rather than queued.
pub struct Poller<R, S> {
    source: R,
    history: Arc<HistoryService<S>>,
    config: PollerConfig,
    status: watch::Sender<PollerStatus>,
}

impl<R, S> Poller<R, S>
where
    R: ReadingSource + Send + Sync,
    S: KeyValueStore + Send + Sync,
{
    #[must_use]
    pub fn new(source: R, history: Arc<HistoryService<S>>, config: PollerConfig) -> Self {
        let (status, _) = watch::channel(PollerStatus::default());
        Self {
            source,
            history,
            config,
            status,
        }
    }

    /// Receive status updates published by this poller.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollerStatus> {
        self.status.subscribe()
    }

    /// Fetch once (with retries) and offer the reading to the history.
    ///
    /// Returns whether the history accepted the reading.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt when every attempt failed.
    pub async fn poll_once(&self) -> Result<bool, SenseError> {
        self.status.send_modify(|status| {
            if status.connection != ConnectionStatus::Connected {
                status.connection = ConnectionStatus::Connecting;
            }
        });

        let attempts = self.config.max_retries.max(1);
        let mut attempt = 1;
        let payload = loop {
            match self.source.fetch().await {
                Ok(payload) => break payload,
                Err(err) => {
                    self.status.send_modify(|status| {
                        status.consecutive_failures += 1;
                        status.last_error = Some(err.to_string());
                    });
                    if attempt >= attempts {
                        self.status.send_modify(|status| {
                            status.connection = ConnectionStatus::Disconnected;
                        });
                        return Err(err);
                    }
                    tracing::warn!(error = %err, attempt, attempts, "poll failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        };

        self.status.send_modify(|status| {
            status.connection = ConnectionStatus::Connected;
            status.last_success = Some(now());
            status.consecutive_failures = 0;
            status.last_error = None;
            status.last_payload = Some(payload.clone());
        });

        let reading = self.to_reading(payload);
        tracing::debug!(
            temperature = reading.temperature,
            humidity = reading.humidity,
            simulated = reading.is_dummy,
            "reading received"
        );
        Ok(self.history.offer(reading).await)
    }

    /// Poll forever at the configured interval.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs_f64(),
            "starting reading poller"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(true) => tracing::debug!("reading recorded to history"),
                Ok(false) => {}
                Err(err) => tracing::error!(
                    error = %err,
                    "reading source unreachable, will keep polling"
                ),
            }
        }
    }

    fn to_reading(&self, payload: SensorPayload) -> Reading {
        let guessed = self.config.detect_simulated
            && looks_simulated(
                payload.temperature.unwrap_or_default(),
                payload.humidity.unwrap_or_default(),
            );
        payload.into_reading(guessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryKeyValueStore;
    use crate::services::history_service::HistoryPolicy;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    /// Source that replays a scripted sequence of outcomes.
    #[derive(Default)]
    struct ScriptedSource {
        outcomes: Mutex<VecDeque<Option<SensorPayload>>>,
        fetches: Mutex<usize>,
    }

    impl ScriptedSource {
        fn new(outcomes: impl IntoIterator<Item = Option<SensorPayload>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                fetches: Mutex::new(0),
            }
        }

        fn fetches(&self) -> usize {
            *self.fetches.lock().unwrap()
        }
    }

    impl ReadingSource for ScriptedSource {
        fn fetch(&self) -> impl Future<Output = Result<SensorPayload, SenseError>> + Send {
            *self.fetches.lock().unwrap() += 1;
            let next = self.outcomes.lock().unwrap().pop_front().flatten();
            async move {
                next.ok_or_else(|| {
                    SenseError::Upstream(Box::new(std::io::Error::other("device offline")))
                })
            }
        }

        fn set_sensor_enabled(
            &self,
            enabled: bool,
        ) -> impl Future<Output = Result<bool, SenseError>> + Send {
            async move { Ok(enabled) }
        }
    }

    fn payload(temperature: f64, humidity: f64) -> SensorPayload {
        SensorPayload {
            temperature: Some(temperature),
            humidity: Some(humidity),
            sensor_enabled: Some(true),
            is_dummy: None,
        }
    }

    fn fast_config() -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(10),
            max_retries: 3,
            retry_delay: Duration::ZERO,
            detect_simulated: true,
        }
    }

    async fn history() -> Arc<HistoryService<InMemoryKeyValueStore>> {
        Arc::new(HistoryService::load(InMemoryKeyValueStore::new(), HistoryPolicy::default()).await)
    }

    #[tokio::test]
    async fn should_offer_fetched_reading_to_history() {
        let history = history().await;
        let source = ScriptedSource::new([Some(payload(18.0, 40.0))]);
        let poller = Poller::new(source, Arc::clone(&history), fast_config());

        assert!(poller.poll_once().await.unwrap());

        let records = history.all_records().await;
        assert_eq!(records.len(), 1);
        assert!((records[0].reading.temperature - 18.0).abs() < f64::EPSILON);
        assert!(!records[0].reading.is_dummy);
    }

    #[tokio::test]
    async fn should_not_record_second_poll_within_interval() {
        let history = history().await;
        let source = ScriptedSource::new([Some(payload(18.0, 40.0)), Some(payload(19.0, 41.0))]);
        let poller = Poller::new(source, Arc::clone(&history), fast_config());

        assert!(poller.poll_once().await.unwrap());
        assert!(!poller.poll_once().await.unwrap());
        assert_eq!(history.all_records().await.len(), 1);
    }

    #[tokio::test]
    async fn should_flag_simulated_band_when_detection_enabled() {
        let history = history().await;
        let source = ScriptedSource::new([Some(payload(27.0, 70.0))]);
        let poller = Poller::new(source, Arc::clone(&history), fast_config());

        poller.poll_once().await.unwrap();

        assert!(history.all_records().await[0].reading.is_dummy);
    }

    #[tokio::test]
    async fn should_trust_explicit_flag_over_heuristic() {
        let history = history().await;
        let mut explicit = payload(27.0, 70.0);
        explicit.is_dummy = Some(false);
        let source = ScriptedSource::new([Some(explicit)]);
        let poller = Poller::new(source, Arc::clone(&history), fast_config());

        poller.poll_once().await.unwrap();

        assert!(!history.all_records().await[0].reading.is_dummy);
    }

    #[tokio::test]
    async fn should_skip_heuristic_when_detection_disabled() {
        let history = history().await;
        let source = ScriptedSource::new([Some(payload(27.0, 70.0))]);
        let config = PollerConfig {
            detect_simulated: false,
            ..fast_config()
        };
        let poller = Poller::new(source, Arc::clone(&history), config);

        poller.poll_once().await.unwrap();

        assert!(!history.all_records().await[0].reading.is_dummy);
    }

    #[tokio::test]
    async fn should_retry_until_fetch_succeeds() {
        let history = history().await;
        let source = Arc::new(ScriptedSource::new([None, None, Some(payload(18.0, 40.0))]));
        let poller = Poller::new(Arc::clone(&source), Arc::clone(&history), fast_config());
        let status = poller.subscribe();

        assert!(poller.poll_once().await.unwrap());

        assert_eq!(source.fetches(), 3);
        let status = status.borrow().clone();
        assert_eq!(status.connection, ConnectionStatus::Connected);
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_success.is_some());
        assert!(status.last_error.is_none());
    }

    #[tokio::test]
    async fn should_report_disconnected_after_max_retries() {
        let history = history().await;
        let source = Arc::new(ScriptedSource::new([None, None, None, Some(payload(18.0, 40.0))]));
        let poller = Poller::new(Arc::clone(&source), Arc::clone(&history), fast_config());
        let status = poller.subscribe();

        let result = poller.poll_once().await;

        assert!(matches!(result, Err(SenseError::Upstream(_))));
        assert_eq!(source.fetches(), 3);
        assert!(history.all_records().await.is_empty());
        let status = status.borrow().clone();
        assert_eq!(status.connection, ConnectionStatus::Disconnected);
        assert_eq!(status.consecutive_failures, 3);
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn should_recover_after_disconnection() {
        let history = history().await;
        let source = ScriptedSource::new([None, None, None, Some(payload(18.0, 40.0))]);
        let poller = Poller::new(source, Arc::clone(&history), fast_config());
        let status = poller.subscribe();

        assert!(poller.poll_once().await.is_err());
        assert!(poller.poll_once().await.unwrap());

        assert_eq!(status.borrow().connection, ConnectionStatus::Connected);
        assert_eq!(history.all_records().await.len(), 1);
    }

    #[tokio::test]
    async fn should_poll_repeatedly_when_running() {
        let history = history().await;
        let source = Arc::new(ScriptedSource::new(
            std::iter::repeat_with(|| Some(payload(18.0, 40.0))).take(100),
        ));
        let poller = Poller::new(Arc::clone(&source), Arc::clone(&history), fast_config());

        let handle = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert!(source.fetches() >= 2);
        assert_eq!(history.all_records().await.len(), 1);
    }

    #[test]
    fn should_serialize_status_in_camel_case() {
        let json = serde_json::to_value(PollerStatus::default()).unwrap();
        assert_eq!(json["connection"], "connecting");
        assert_eq!(json["consecutiveFailures"], 0);
        assert!(json["lastSuccess"].is_null());
    }
}
