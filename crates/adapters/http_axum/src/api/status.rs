//! Handler for the poller status endpoint.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use roomsense_app::poller::PollerStatus;
use roomsense_app::ports::{KeyValueStore, ReadingSource};
use roomsense_domain::time::Timestamp;

use crate::state::AppState;

/// Poller health plus the history's save schedule.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    #[serde(flatten)]
    pub poller: PollerStatus,
    /// When the next reading will be accepted; `null` before the first save.
    pub next_save_at: Option<Timestamp>,
    pub retention_interval_secs: u64,
}

pub enum StatusResponse {
    Ok(Json<StatusBody>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/status`
pub async fn show<S, R>(State(state): State<AppState<S, R>>) -> StatusResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    let poller = state.poller.borrow().clone();
    StatusResponse::Ok(Json(StatusBody {
        poller,
        next_save_at: state.history.next_accept_at().await,
        retention_interval_secs: state.history.policy().min_interval.as_secs(),
    }))
}
