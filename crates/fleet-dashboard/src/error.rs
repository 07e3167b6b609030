//! Dashboard error types.

use thiserror::Error;

/// Errors raised while hosting the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to bind dashboard listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Dashboard server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
