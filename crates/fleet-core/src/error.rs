//! Error types for fleet-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Telemetry source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid telemetry payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
