//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] fleet_dashboard::DashboardError),
}

pub type AppResult<T> = Result<T, AppError>;
