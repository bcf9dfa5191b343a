//! Export formats for a history log.
//!
//! Both exports walk the log in stored (oldest-first) order, unlike the
//! newest-first listings served to clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::history::HistoryRecord;
use crate::time::Timestamp;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "Timestamp,Temperature (°C),Humidity (%),Sensor Status,Data Type";

const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A downloadable export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// MIME type for the `Content-Type` header.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    /// Download file name, e.g. `sensor_history_2024-05-01.csv`.
    #[must_use]
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("sensor_history_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

/// Quote a CSV field if it contains a delimiter, a quote or a line break.
#[must_use]
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render records as CSV, one row per record in stored order.
///
/// An empty log yields the header line alone.
#[must_use]
pub fn to_csv(records: &[HistoryRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    for record in records {
        let reading = &record.reading;
        let timestamp = record.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string();
        let status = if reading.sensor_enabled {
            "Active"
        } else {
            "Inactive"
        };
        let kind = if reading.is_dummy {
            "Simulation"
        } else {
            "Real"
        };
        out.push('\n');
        out.push_str(&format!(
            "{},{:.2},{:.2},{},{}",
            csv_escape(&timestamp),
            reading.temperature,
            reading.humidity,
            status,
            kind,
        ));
    }
    out
}

/// Earliest and latest timestamps of an exported log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

/// Metadata wrapper of the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: Timestamp,
    pub total_records: usize,
    pub data_range: DataRange,
}

/// Top-level document of the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonExport {
    pub metadata: ExportMetadata,
    pub records: Vec<HistoryRecord>,
}

impl JsonExport {
    /// Wrap `records` with export metadata stamped at `exported_at`.
    #[must_use]
    pub fn new(records: &[HistoryRecord], exported_at: Timestamp) -> Self {
        Self {
            metadata: ExportMetadata {
                exported_at,
                total_records: records.len(),
                data_range: DataRange {
                    start: records.first().map(|r| r.timestamp),
                    end: records.last().map(|r| r.timestamp),
                },
            },
            records: records.to_vec(),
        }
    }
}

/// Render records as a pretty-printed JSON export document.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if serialization fails.
pub fn to_json(
    records: &[HistoryRecord],
    exported_at: Timestamp,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonExport::new(records, exported_at))
}
