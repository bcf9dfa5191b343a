//! History service — time-gated sampling of readings into a bounded, persisted log.

use std::time::Duration;

use chrono::{NaiveDate, TimeDelta};
use tokio::sync::Mutex;

use roomsense_domain::error::SenseError;
use roomsense_domain::export;
use roomsense_domain::history::{self, HistoryRecord, MAX_RECORDS};
use roomsense_domain::id::RecordId;
use roomsense_domain::reading::Reading;
use roomsense_domain::stats::HistoryStats;
use roomsense_domain::time::{Timestamp, now, today};

use crate::ports::KeyValueStore;

/// Storage key of the persisted history snapshot.
pub const HISTORY_KEY: &str = "sensor_history";

/// Minimum time between two accepted records.
pub const DEFAULT_RETENTION_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Sampling and retention limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPolicy {
    /// Minimum elapsed time between two accepted records.
    pub min_interval: Duration,
    /// Maximum number of records kept, oldest evicted first.
    pub max_records: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_RETENTION_INTERVAL,
            max_records: MAX_RECORDS,
        }
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    records: Vec<HistoryRecord>,
    last_accepted: Option<Timestamp>,
}

/// Owns the history log and decides which readings become records.
///
/// The log is the source of truth; the persisted snapshot is written after
/// every accepted record on a best-effort basis. All operations go through
/// one lock so statistics and exports always see a consistent log.
pub struct HistoryService<S> {
    store: S,
    policy: HistoryPolicy,
    state: Mutex<HistoryState>,
}

impl<S: KeyValueStore> HistoryService<S> {
    /// Create the service, rehydrating the log from `store`.
    ///
    /// Never fails: a missing, unreadable or corrupt snapshot starts an
    /// empty log.
    pub async fn load(store: S, policy: HistoryPolicy) -> Self {
        let mut records = match store.load(HISTORY_KEY).await {
            Ok(Some(bytes)) => history::decode_snapshot(&bytes).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "discarding corrupt history snapshot");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "unable to read history snapshot");
                Vec::new()
            }
        };
        history::truncate_oldest(&mut records, policy.max_records);
        let last_accepted = records.last().map(|record| record.timestamp);

        tracing::debug!(records = records.len(), "history loaded");

        Self {
            store,
            policy,
            state: Mutex::new(HistoryState {
                records,
                last_accepted,
            }),
        }
    }

    /// The sampling policy in effect.
    #[must_use]
    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    /// Offer a reading at the current time. See [`offer_at`](Self::offer_at).
    pub async fn offer(&self, reading: Reading) -> bool {
        self.offer_at(reading, now()).await
    }

    /// Record `reading` if at least the retention interval elapsed since the
    /// last accepted record.
    ///
    /// Returns `false`, with no state change, when the reading arrives too
    /// early. A failed snapshot write is logged and does not undo the append.
    pub async fn offer_at(&self, reading: Reading, at: Timestamp) -> bool {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_accepted {
            let elapsed_enough = (at - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.policy.min_interval);
            if !elapsed_enough {
                tracing::debug!(last = %last, "reading rejected, retention interval not elapsed");
                return false;
            }
        }

        let mut id = RecordId::new();
        while state.records.iter().any(|record| record.id == id) {
            id = RecordId::new();
        }
        let record = HistoryRecord::builder()
            .id(id)
            .reading(reading)
            .timestamp(at)
            .build();

        state.records.push(record);
        state.last_accepted = Some(at);
        history::truncate_oldest(&mut state.records, self.policy.max_records);

        tracing::info!(
            temperature = reading.temperature,
            humidity = reading.humidity,
            at = %at,
            "history record saved"
        );

        match history::encode_snapshot(&state.records, self.policy.max_records) {
            Ok(bytes) => {
                if let Err(err) = self.store.save(HISTORY_KEY, bytes).await {
                    tracing::error!(error = %err, "failed to persist history snapshot");
                }
            }
            Err(err) => tracing::error!(error = %err, "failed to encode history snapshot"),
        }

        true
    }

    /// Every record, newest first.
    pub async fn all_records(&self) -> Vec<HistoryRecord> {
        let state = self.state.lock().await;
        state.records.iter().rev().cloned().collect()
    }

    /// Records with `start <= timestamp <= end`, newest first.
    pub async fn records_in_range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Vec<HistoryRecord> {
        if start > end {
            return Vec::new();
        }
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .rev()
            .filter(|record| record.timestamp >= start && record.timestamp <= end)
            .cloned()
            .collect()
    }

    /// Records taken on the given UTC calendar day, newest first.
    pub async fn records_on(&self, date: NaiveDate) -> Vec<HistoryRecord> {
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .rev()
            .filter(|record| record.timestamp.date_naive() == date)
            .cloned()
            .collect()
    }

    /// Records taken today (UTC), newest first.
    pub async fn today_records(&self) -> Vec<HistoryRecord> {
        self.records_on(today()).await
    }

    /// Aggregate statistics over the whole log.
    pub async fn stats(&self) -> HistoryStats {
        self.stats_at(now()).await
    }

    /// Aggregate statistics stamped with `at`.
    pub async fn stats_at(&self, at: Timestamp) -> HistoryStats {
        let state = self.state.lock().await;
        HistoryStats::compute(&state.records, at)
    }

    /// Earliest instant at which the next reading will be accepted, or `None`
    /// when nothing has been recorded yet.
    pub async fn next_accept_at(&self) -> Option<Timestamp> {
        let last = self.state.lock().await.last_accepted?;
        let interval = TimeDelta::from_std(self.policy.min_interval).ok()?;
        last.checked_add_signed(interval)
    }

    /// Drop every record and erase the persisted snapshot.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.records.clear();
        state.last_accepted = None;
        if let Err(err) = self.store.delete(HISTORY_KEY).await {
            tracing::error!(error = %err, "failed to erase history snapshot");
        }
        tracing::info!("history cleared");
    }

    /// The log as CSV, oldest first.
    pub async fn export_csv(&self) -> String {
        let state = self.state.lock().await;
        export::to_csv(&state.records)
    }

    /// The log as a JSON export document, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SenseError::Serialization`] if the document cannot be encoded.
    pub async fn export_json(&self) -> Result<String, SenseError> {
        self.export_json_at(now()).await
    }

    /// The log as a JSON export document stamped with `exported_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SenseError::Serialization`] if the document cannot be encoded.
    pub async fn export_json_at(&self, exported_at: Timestamp) -> Result<String, SenseError> {
        let state = self.state.lock().await;
        Ok(export::to_json(&state.records, exported_at)?)
    }
}
