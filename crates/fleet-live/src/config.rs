//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fleet_dashboard::DashboardConfig;
use fleet_map::{IconTheme, MapView, ViewportConfig};

use crate::error::{AppError, AppResult};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "FLEET_CONFIG";

/// Config file used when neither `--config` nor [`CONFIG_ENV`] is set.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Highest zoom level served by the OpenStreetMap tile servers.
const MAX_ZOOM: u8 = 19;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Web host settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Widget presentation.
    #[serde(default)]
    pub map: MapConfig,
    /// Telemetry source.
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Widget presentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Start in fullscreen mode.
    #[serde(default)]
    pub fullscreen: bool,
    /// Initial camera.
    #[serde(flatten)]
    pub view: MapView,
    /// Marker glyphs.
    #[serde(default)]
    pub icons: IconTheme,
}

impl MapConfig {
    pub fn viewport(&self) -> ViewportConfig {
        ViewportConfig {
            fullscreen: self.fullscreen,
        }
    }
}

/// Telemetry source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// JSON file with an array of raw vehicle records, re-read on every poll.
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("fixtures/sample_fleet.json")
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            fixture_path: default_fixture_path(),
        }
    }
}

impl AppConfig {
    /// Resolve the config path (CLI arg > `FLEET_CONFIG` > default) and load it.
    ///
    /// A missing file falls back to defaults.
    pub fn load(cli_path: Option<String>) -> AppResult<Self> {
        let config_path = cli_path
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            tracing::info!(config_path = %config_path, "Loading configuration");
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dashboard.update_interval_ms == 0 {
            return Err(AppError::Config(
                "dashboard.update_interval_ms must be positive".to_string(),
            ));
        }
        if self.dashboard.max_connections == 0 {
            return Err(AppError::Config(
                "dashboard.max_connections must be positive".to_string(),
            ));
        }
        if !self.map.view.center.is_valid() {
            return Err(AppError::Config(format!(
                "map.center out of range: {}, {}",
                self.map.view.center.latitude, self.map.view.center.longitude
            )));
        }
        if self.map.view.zoom > MAX_ZOOM {
            return Err(AppError::Config(format!(
                "map.zoom must be at most {MAX_ZOOM}, got {}",
                self.map.view.zoom
            )));
        }
        Ok(())
    }
}
