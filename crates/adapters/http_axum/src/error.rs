//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use roomsense_domain::error::SenseError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SenseError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(SenseError);

impl From<SenseError> for ApiError {
    fn from(err: SenseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SenseError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            SenseError::Upstream(err) => {
                tracing::warn!(error = %err, "upstream sensor error");
                (StatusCode::BAD_GATEWAY, "sensor unreachable".to_string())
            }
            SenseError::Storage(_) | SenseError::Serialization(_) => {
                tracing::error!(error = %self.0, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
