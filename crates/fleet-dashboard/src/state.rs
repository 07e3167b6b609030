//! Dashboard state management.
//!
//! DashboardState owns the hosted widget, the telemetry provider feeding it
//! and the scene queue its engine publishes into.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use fleet_core::{is_recognized, AggregateCounts, TelemetryProvider};
use fleet_map::{LiveMapWidget, MountOutcome, WidgetView};
use fleet_telemetry::Metrics;

use crate::scene::{SceneEvent, SceneQueue};
use crate::types::DashboardSnapshot;

/// Dashboard state shared by handlers and the broadcaster.
#[derive(Clone)]
pub struct DashboardState {
    provider: Arc<dyn TelemetryProvider>,
    widget: Arc<Mutex<LiveMapWidget>>,
    scene: SceneQueue,
    publish: Arc<Mutex<()>>,
}

impl DashboardState {
    pub fn new(
        provider: Arc<dyn TelemetryProvider>,
        widget: LiveMapWidget,
        scene: SceneQueue,
    ) -> Self {
        Self {
            provider,
            widget: Arc::new(Mutex::new(widget)),
            scene,
            publish: Arc::new(Mutex::new(())),
        }
    }

    /// Mount the hosted widget.
    pub async fn mount(&self) -> MountOutcome {
        let outcome = self.widget.lock().await.mount().await;
        debug!(?outcome, "Hosted widget mounted");
        outcome
    }

    /// Unmount the hosted widget and release its engine.
    pub async fn unmount(&self) {
        self.widget.lock().await.unmount();
    }

    /// Poll the provider and render the result.
    ///
    /// A failed fetch keeps the last known vehicle list on screen.
    pub async fn refresh(&self) -> WidgetView {
        let fetched = self.provider.fetch_vehicles().await;
        let mut widget = self.widget.lock().await;
        match fetched {
            Ok(vehicles) => {
                let unrecognized = vehicles
                    .iter()
                    .filter(|v| !is_recognized(Some(v.status.as_str())))
                    .count();
                if unrecognized > 0 {
                    debug!(unrecognized, "Vehicles with unrecognized status shown as offline");
                    Metrics::unrecognized_status(unrecognized as u64);
                }
                let view = widget.render(vehicles);
                let counts = widget.counts();
                Metrics::fleet_counts(counts.moving, counts.stopped, counts.offline);
                view
            }
            Err(e) => {
                warn!(error = %e, "Telemetry fetch failed, keeping last known vehicles");
                Metrics::fetch_error();
                widget.view()
            }
        }
    }

    /// Switch the hosted viewport between windowed and fullscreen.
    pub async fn set_fullscreen(&self, fullscreen: bool) {
        self.widget.lock().await.set_fullscreen(fullscreen);
    }

    /// Counters for the last rendered snapshot.
    pub async fn counts(&self) -> AggregateCounts {
        self.widget.lock().await.counts()
    }

    /// Collect a full snapshot of the current widget.
    pub async fn collect_snapshot(&self) -> DashboardSnapshot {
        let widget = self.widget.lock().await;
        DashboardSnapshot {
            timestamp_ms: Utc::now().timestamp_millis(),
            stage: widget.stage(),
            view: widget.view(),
        }
    }

    /// Take the scene events published since the last call.
    pub fn drain_scene(&self) -> Vec<SceneEvent> {
        self.scene.drain()
    }

    /// Take pending scene events with the counters of the snapshot that
    /// produced them.
    ///
    /// The engine only publishes while the widget is locked, so the counters
    /// read here belong to the last diff in the batch.
    pub async fn take_scene(&self) -> (Vec<SceneEvent>, AggregateCounts) {
        let widget = self.widget.lock().await;
        (self.scene.drain(), widget.counts())
    }

    /// Held while scene events are forwarded, so batches from different
    /// publishers reach clients in the order they were taken.
    pub async fn publish_lock(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().await
    }
}

impl std::fmt::Debug for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardState")
            .field("pending_scene_events", &self.scene.len())
            .finish()
    }
}
