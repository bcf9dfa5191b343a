//! JSON handlers for the reading history.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use roomsense_app::ports::{KeyValueStore, ReadingSource};
use roomsense_domain::error::{SenseError, ValidationError};
use roomsense_domain::export::ExportFormat;
use roomsense_domain::history::HistoryRecord;
use roomsense_domain::stats::HistoryStats;
use roomsense_domain::time::{Timestamp, today};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the history list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Start of the range (RFC 3339, inclusive).
    pub from: Option<String>,
    /// End of the range (RFC 3339, inclusive).
    pub to: Option<String>,
}

/// Possible responses from the list endpoints.
pub enum ListResponse {
    /// 200 OK with a JSON array of records, newest first.
    Ok(Json<Vec<HistoryRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the stats endpoint.
pub enum StatsResponse {
    Ok(Json<HistoryStats>),
}

impl IntoResponse for StatsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the clear endpoint.
pub enum ClearResponse {
    NoContent,
}

impl IntoResponse for ClearResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// A history export served as a file download.
pub struct ExportResponse {
    format: ExportFormat,
    body: String,
}

impl IntoResponse for ExportResponse {
    fn into_response(self) -> Response {
        let disposition = format!(
            "attachment; filename=\"{}\"",
            self.format.file_name(today())
        );
        (
            [
                (header::CONTENT_TYPE, self.format.content_type().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

fn parse_timestamp(value: &str) -> Result<Timestamp, ApiError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|_| {
            ApiError::from(SenseError::Validation(ValidationError::InvalidTimestamp(
                value.to_owned(),
            )))
        })
}

/// `GET /api/history?from=&to=`
///
/// Without parameters every record is returned. When only one bound is
/// given the range is open-ended on the other side, which matches nothing.
pub async fn list<S, R>(
    State(state): State<AppState<S, R>>,
    Query(params): Query<HistoryQuery>,
) -> Result<ListResponse, ApiError>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    let from = params.from.as_deref().map(parse_timestamp).transpose()?;
    let to = params.to.as_deref().map(parse_timestamp).transpose()?;

    let records = match (from, to) {
        (None, None) => state.history.all_records().await,
        (Some(start), Some(end)) => state.history.records_in_range(start, end).await,
        _ => Vec::new(),
    };

    Ok(ListResponse::Ok(Json(records)))
}

/// `GET /api/history/today`
pub async fn list_today<S, R>(State(state): State<AppState<S, R>>) -> ListResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.history.today_records().await))
}

/// `GET /api/history/stats`
pub async fn stats<S, R>(State(state): State<AppState<S, R>>) -> StatsResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    StatsResponse::Ok(Json(state.history.stats().await))
}

/// `DELETE /api/history`
pub async fn clear<S, R>(State(state): State<AppState<S, R>>) -> ClearResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    state.history.clear().await;
    ClearResponse::NoContent
}

/// `GET /api/history/export.csv`
pub async fn export_csv<S, R>(State(state): State<AppState<S, R>>) -> ExportResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    ExportResponse {
        format: ExportFormat::Csv,
        body: state.history.export_csv().await,
    }
}

/// `GET /api/history/export.json`
pub async fn export_json<S, R>(State(state): State<AppState<S, R>>) -> Result<ExportResponse, ApiError>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    Ok(ExportResponse {
        format: ExportFormat::Json,
        body: state.history.export_json().await?,
    })
}
