//! [`ReadingSource`] backed by a remote sensor device.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use roomsense_app::ports::ReadingSource;
use roomsense_domain::error::SenseError;
use roomsense_domain::reading::SensorPayload;

use crate::error::ClientError;

/// Per-request timeout applied to every call to the device.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct ToggleRequest {
    enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleAck {
    sensor_enabled: bool,
}

/// Reads the sensor device over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReadingSource {
    client: Client,
    base_url: String,
}

impl HttpReadingSource {
    /// Create a source for the device at `base_url`, e.g. `http://192.168.1.50`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] unless the URL starts with
    /// `http://` or `https://`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_client(base_url, client)
    }

    /// Create a source using a preconfigured reqwest [`Client`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] unless the URL starts with
    /// `http://` or `https://`.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {base_url}"
            )));
        }
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/api/data`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the device is unreachable, answers with
    /// an error status or sends an undecodable body.
    pub async fn latest(&self) -> Result<SensorPayload, ClientError> {
        let url = format!("{}/api/data", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::NotReachable {
                url: url.clone(),
                source,
            })?;
        handle_response(response).await
    }

    /// `POST {base}/api/toggle-sensor`
    ///
    /// # Errors
    ///
    /// Same as [`latest`](Self::latest).
    pub async fn toggle(&self, enabled: bool) -> Result<bool, ClientError> {
        let url = format!("{}/api/toggle-sensor", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ToggleRequest { enabled })
            .send()
            .await
            .map_err(|source| ClientError::NotReachable {
                url: url.clone(),
                source,
            })?;
        let ack: ToggleAck = handle_response(response).await?;
        Ok(ack.sensor_enabled)
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| status.to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl ReadingSource for HttpReadingSource {
    fn fetch(&self) -> impl Future<Output = Result<SensorPayload, SenseError>> + Send {
        async move {
            let payload = self.latest().await?;
            tracing::trace!(url = %self.base_url, "fetched device reading");
            Ok(payload)
        }
    }

    fn set_sensor_enabled(
        &self,
        enabled: bool,
    ) -> impl Future<Output = Result<bool, SenseError>> + Send {
        async move { Ok(self.toggle(enabled).await?) }
    }
}
