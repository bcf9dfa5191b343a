//! Aggregate statistics over a history log.

use serde::{Deserialize, Serialize};

use crate::history::HistoryRecord;
use crate::time::Timestamp;

/// Count, mean, min and max of temperature and humidity.
///
/// Every numeric field is zero for an empty log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_records: usize,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
    pub last_updated: Timestamp,
}

impl HistoryStats {
    /// Compute statistics over `records`, stamped with `at`.
    #[must_use]
    pub fn compute(records: &[HistoryRecord], at: Timestamp) -> Self {
        let Some(first) = records.first() else {
            return Self::empty(at);
        };

        let mut sum_t = 0.0;
        let mut sum_h = 0.0;
        let (mut min_t, mut max_t) = (first.reading.temperature, first.reading.temperature);
        let (mut min_h, mut max_h) = (first.reading.humidity, first.reading.humidity);

        for record in records {
            let t = record.reading.temperature;
            let h = record.reading.humidity;
            sum_t += t;
            sum_h += h;
            min_t = min_t.min(t);
            max_t = max_t.max(t);
            min_h = min_h.min(h);
            max_h = max_h.max(h);
        }

        #[allow(clippy::cast_precision_loss)]
        let count = records.len() as f64;

        Self {
            total_records: records.len(),
            avg_temperature: sum_t / count,
            avg_humidity: sum_h / count,
            min_temperature: min_t,
            max_temperature: max_t,
            min_humidity: min_h,
            max_humidity: max_h,
            last_updated: at,
        }
    }

    /// All-zero statistics for an empty log.
    #[must_use]
    pub fn empty(at: Timestamp) -> Self {
        Self {
            total_records: 0,
            avg_temperature: 0.0,
            avg_humidity: 0.0,
            min_temperature: 0.0,
            max_temperature: 0.0,
            min_humidity: 0.0,
            max_humidity: 0.0,
            last_updated: at,
        }
    }
}
