//! Application wiring.
//!
//! Builds the telemetry provider and the hosted widget from configuration
//! and runs the dashboard until a shutdown signal arrives.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fleet_dashboard::{run_server, scene_widget, DashboardState};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::provider::JsonFileTelemetryProvider;

/// Main application.
pub struct Application {
    config: AppConfig,
    shutdown: CancellationToken,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        if !config.provider.fixture_path.exists() {
            warn!(
                path = %config.provider.fixture_path.display(),
                "Telemetry file not found yet, map stays empty until it appears"
            );
        }
        Ok(Self {
            config,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Token that stops [`Application::run`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Build the dashboard state for this configuration.
    pub fn dashboard_state(&self) -> DashboardState {
        let provider = JsonFileTelemetryProvider::new(&self.config.provider.fixture_path);
        let (widget, scene) = scene_widget(
            self.config.map.viewport(),
            self.config.map.view,
            self.config.map.icons.clone(),
        );
        DashboardState::new(Arc::new(provider), widget, scene)
    }

    /// Serve the live map until Ctrl-C or the shutdown token fires.
    pub async fn run(self) -> AppResult<()> {
        let state = self.dashboard_state();

        let signal_token = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    signal_token.cancel();
                }
                _ = signal_token.cancelled() => {}
            }
        });

        info!(
            port = self.config.dashboard.port,
            telemetry = %self.config.provider.fixture_path.display(),
            fullscreen = self.config.map.fullscreen,
            "Starting live map"
        );
        let result = run_server(state, self.config.dashboard.clone(), self.shutdown.clone()).await;
        self.shutdown.cancel();

        info!("Shutting down");
        result.map_err(Into::into)
    }
}
