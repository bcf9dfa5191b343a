//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`SenseError`]
//! via `From`, so callers only ever match on one enum.

/// Top-level error for roomsense operations.
#[derive(Debug, thiserror::Error)]
pub enum SenseError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("upstream sensor error")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
}

/// Rejected caller input.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A timestamp query parameter could not be parsed as RFC 3339.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
