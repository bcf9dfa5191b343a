//! Handlers for the device-facing endpoints.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use roomsense_app::ports::{KeyValueStore, ReadingSource};
use roomsense_domain::reading::SensorPayload;

use crate::error::ApiError;
use crate::state::AppState;

const STATUS_SUCCESS: &str = "success";

/// Acknowledgement returned to the device after a push.
#[derive(Debug, Serialize, Deserialize)]
pub struct PushAck {
    pub status: String,
}

/// Request body for switching the sensor on or off.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

/// Response body of the toggle endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAck {
    pub sensor_enabled: bool,
    pub status: String,
}

/// Possible responses from `GET /api/data`.
pub enum LatestResponse {
    Ok(Json<SensorPayload>),
}

impl IntoResponse for LatestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from `POST /api/data`.
pub enum PushResponse {
    Ok(Json<PushAck>),
}

impl IntoResponse for PushResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from `POST /api/toggle-sensor`.
pub enum ToggleResponse {
    Ok(Json<ToggleAck>),
}

impl IntoResponse for ToggleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/data`
pub async fn latest<S, R>(State(state): State<AppState<S, R>>) -> LatestResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    LatestResponse::Ok(Json(state.latest.latest().await))
}

/// `POST /api/data`
pub async fn push<S, R>(
    State(state): State<AppState<S, R>>,
    Json(payload): Json<SensorPayload>,
) -> PushResponse
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    tracing::debug!(
        temperature = ?payload.temperature,
        humidity = ?payload.humidity,
        "device push received"
    );
    state.latest.push(payload).await;
    PushResponse::Ok(Json(PushAck {
        status: STATUS_SUCCESS.to_string(),
    }))
}

/// `POST /api/toggle-sensor`
///
/// Forwards the switch to the reading source and mirrors the flag the
/// source reports back into the latest-reading store.
pub async fn toggle<S, R>(
    State(state): State<AppState<S, R>>,
    Json(body): Json<ToggleRequest>,
) -> Result<ToggleResponse, ApiError>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    let enabled = state.source.set_sensor_enabled(body.enabled).await?;
    state.latest.set_sensor_enabled(enabled).await;
    tracing::info!(enabled, "sensor toggled");
    Ok(ToggleResponse::Ok(Json(ToggleAck {
        sensor_enabled: enabled,
        status: STATUS_SUCCESS.to_string(),
    })))
}
