//! Dashboard configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Dashboard server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Provider poll and WebSocket broadcast interval in milliseconds.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Maximum concurrent WebSocket connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_port() -> u16 {
    8080
}

fn default_update_interval_ms() -> u64 {
    1000
}

fn default_max_connections() -> usize {
    10
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            update_interval_ms: default_update_interval_ms(),
            max_connections: default_max_connections(),
            static_dir: default_static_dir(),
        }
    }
}
