//! Fleet live map service.
//!
//! Wires the components together:
//! - TOML configuration
//! - File-backed telemetry provider
//! - Dashboard host serving the live map widget

pub mod app;
pub mod config;
pub mod error;
pub mod provider;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use provider::JsonFileTelemetryProvider;
