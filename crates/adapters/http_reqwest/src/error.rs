//! Error type for the device client.

use roomsense_domain::error::SenseError;

/// Errors raised while talking to the sensor device.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The device did not answer.
    #[error("device not reachable at {url}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be built or the body could not be decoded.
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    /// The base URL is not an `http(s)` URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The device answered with a non-success status.
    #[error("device error {status}: {message}")]
    Api { status: u16, message: String },
}

impl From<ClientError> for SenseError {
    fn from(err: ClientError) -> Self {
        Self::Upstream(Box::new(err))
    }
}
