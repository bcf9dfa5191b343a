//! History records — persisted readings with identity and a timestamp.
//!
//! A history log is an ordered `Vec<HistoryRecord>` whose insertion order is
//! chronological order. Records are never mutated once appended; they leave
//! the log only when it is cleared or when the size cap evicts the oldest.

use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::reading::Reading;
use crate::time::Timestamp;

/// Maximum number of records kept in a history log.
pub const MAX_RECORDS: usize = 1000;

/// A single persisted reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub reading: Reading,
    pub timestamp: Timestamp,
}

impl HistoryRecord {
    /// Create a builder for constructing a [`HistoryRecord`].
    #[must_use]
    pub fn builder() -> HistoryRecordBuilder {
        HistoryRecordBuilder::default()
    }
}

/// Step-by-step builder for [`HistoryRecord`].
#[derive(Debug, Default)]
pub struct HistoryRecordBuilder {
    id: Option<RecordId>,
    reading: Reading,
    timestamp: Option<Timestamp>,
}

impl HistoryRecordBuilder {
    #[must_use]
    pub fn id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn reading(mut self, reading: Reading) -> Self {
        self.reading = reading;
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Consume the builder and return a [`HistoryRecord`].
    #[must_use]
    pub fn build(self) -> HistoryRecord {
        HistoryRecord {
            id: self.id.unwrap_or_default(),
            reading: self.reading,
            timestamp: self.timestamp.unwrap_or_else(crate::time::now),
        }
    }
}

/// Drop the oldest records so that at most `max` remain.
pub fn truncate_oldest(records: &mut Vec<HistoryRecord>, max: usize) {
    if records.len() > max {
        let excess = records.len() - max;
        records.drain(..excess);
    }
}

/// Serialize the newest `max` records (oldest-first) into a storage snapshot.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if serialization fails.
pub fn encode_snapshot(
    records: &[HistoryRecord],
    max: usize,
) -> Result<Vec<u8>, serde_json::Error> {
    let start = records.len().saturating_sub(max);
    serde_json::to_vec(&records[start..])
}

/// Parse a storage snapshot back into a log.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] when the bytes are not a JSON array of
/// history records.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<HistoryRecord>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record_at(minutes: i64) -> HistoryRecord {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        HistoryRecord::builder()
            .reading(Reading::new(26.0, 65.0, true, false))
            .timestamp(base + Duration::minutes(minutes))
            .build()
    }

    #[test]
    fn should_build_record_with_all_fields() {
        let id = RecordId::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let reading = Reading::new(21.5, 40.0, false, true);

        let record = HistoryRecord::builder()
            .id(id)
            .reading(reading)
            .timestamp(ts)
            .build();

        assert_eq!(record.id, id);
        assert_eq!(record.reading, reading);
        assert_eq!(record.timestamp, ts);
    }

    #[test]
    fn should_use_defaults_when_fields_not_provided() {
        let record = HistoryRecord::builder().build();
        assert_eq!(record.reading, Reading::default());
    }

    #[test]
    fn should_flatten_reading_fields_into_record_json() {
        let record = record_at(0);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], serde_json::json!(record.id.to_string()));
        assert_eq!(json["temperature"], serde_json::json!(26.0));
        assert_eq!(json["humidity"], serde_json::json!(65.0));
        assert_eq!(json["sensorEnabled"], serde_json::json!(true));
        assert_eq!(json["isDummy"], serde_json::json!(false));
        assert_eq!(json["timestamp"], serde_json::json!("2024-05-01T08:00:00Z"));
    }

    #[test]
    fn should_keep_newest_records_when_truncating() {
        let mut records: Vec<_> = (0..5).map(record_at).collect();
        let newest: Vec<_> = records[2..].to_vec();

        truncate_oldest(&mut records, 3);

        assert_eq!(records, newest);
    }

    #[test]
    fn should_leave_short_log_untouched_when_truncating() {
        let mut records: Vec<_> = (0..2).map(record_at).collect();
        let before = records.clone();
        truncate_oldest(&mut records, 3);
        assert_eq!(records, before);
    }

    #[test]
    fn should_encode_only_newest_records_in_snapshot() {
        let records: Vec<_> = (0..4).map(record_at).collect();

        let bytes = encode_snapshot(&records, 2).unwrap();
        let decoded = decode_snapshot(&bytes).unwrap();

        assert_eq!(decoded, records[2..].to_vec());
    }

    #[test]
    fn should_keep_every_record_when_snapshot_holds_non_finite_values() {
        let mut records: Vec<_> = (0..3).map(record_at).collect();
        records[1].reading.temperature = f64::NAN;
        records[2].reading.humidity = f64::INFINITY;

        let bytes = encode_snapshot(&records, MAX_RECORDS).unwrap();
        let decoded = decode_snapshot(&bytes).unwrap();

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], records[0]);
        assert!(decoded[1].reading.temperature.is_nan());
        assert_eq!(decoded[1].id, records[1].id);
        assert!(decoded[2].reading.humidity.is_nan());
        assert_eq!(decoded[2].timestamp, records[2].timestamp);
    }

    #[test]
    fn should_fail_to_decode_corrupt_snapshot() {
        assert!(decode_snapshot(b"{not json").is_err());
        assert!(decode_snapshot(br#"{"records": []}"#).is_err());
    }
}
