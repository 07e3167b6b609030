//! Server-side map engine.
//!
//! The browser draws the map; the server keeps the widget and its engine.
//! [`SceneEngine`] records every change the controller pushes into a shared
//! queue, which the broadcaster drains into WebSocket messages.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use fleet_map::{
    ClientEnvironment, ControllerDeps, EngineMount, IconTheme, InteractiveEnvironment,
    LiveMapWidget, MapEngine, MapEngineFactory, MapView, MarkerDiff, ThemeIconSource,
    ViewportConfig, ViewportGeometry,
};

/// One change pushed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Markers(MarkerDiff),
    Viewport(ViewportGeometry),
}

/// Shared queue of pending scene events.
#[derive(Debug, Clone, Default)]
pub struct SceneQueue {
    events: Arc<Mutex<Vec<SceneEvent>>>,
}

impl SceneQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: SceneEvent) {
        self.events.lock().push(event);
    }

    /// Take every pending event in push order.
    pub fn drain(&self) -> Vec<SceneEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

/// Attaches [`SceneEngine`]s that publish into one queue.
#[derive(Debug, Clone)]
pub struct SceneEngineFactory {
    queue: SceneQueue,
}

impl SceneEngineFactory {
    pub fn new(queue: SceneQueue) -> Self {
        Self { queue }
    }
}

impl MapEngineFactory for SceneEngineFactory {
    fn attach(&self, _env: &ClientEnvironment, mount: EngineMount<'_>) -> Box<dyn MapEngine> {
        info!(
            fullscreen = mount.geometry.fullscreen,
            zoom = mount.view.zoom,
            fallback_icons = mount.icons.fallback_count(),
            "Scene engine attached"
        );
        Box::new(SceneEngine {
            queue: self.queue.clone(),
            released: false,
        })
    }
}

/// Engine that forwards changes to connected browsers.
#[derive(Debug)]
pub struct SceneEngine {
    queue: SceneQueue,
    released: bool,
}

impl MapEngine for SceneEngine {
    fn apply(&mut self, diff: &MarkerDiff) {
        if self.released {
            return;
        }
        self.queue.push(SceneEvent::Markers(diff.clone()));
    }

    fn resize(&mut self, geometry: &ViewportGeometry) {
        if self.released {
            return;
        }
        self.queue.push(SceneEvent::Viewport(geometry.clone()));
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            debug!("Scene engine released");
        }
    }
}

/// Build a widget that renders into a scene queue.
pub fn scene_widget(
    config: ViewportConfig,
    view: MapView,
    theme: IconTheme,
) -> (LiveMapWidget, SceneQueue) {
    let queue = SceneQueue::new();
    let deps = ControllerDeps {
        environment: Arc::new(InteractiveEnvironment),
        fallback_icon_url: theme.fallback.clone(),
        icon_source: Arc::new(ThemeIconSource::new(theme)),
        engine_factory: Arc::new(SceneEngineFactory::new(queue.clone())),
        view,
    };
    (LiveMapWidget::new(config, deps), queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::{GeoPosition, VehicleId, VehicleTelemetry};
    use fleet_map::MountOutcome;

    fn truck(id: u64, status: &str) -> VehicleTelemetry {
        VehicleTelemetry {
            id: VehicleId::from(id),
            name: format!("Truck {id}"),
            driver_name: "Driver".to_string(),
            plate_number: String::new(),
            status: status.to_string(),
            position: GeoPosition::new(35.69, 51.39),
            speed_kph: 10.0,
            last_update: None,
        }
    }

    #[tokio::test]
    async fn test_widget_pushes_into_queue() {
        let (mut widget, queue) =
            scene_widget(ViewportConfig::default(), MapView::default(), IconTheme::default());
        assert_eq!(widget.mount().await, MountOutcome::Rendering);
        assert!(queue.is_empty());

        widget.render(vec![truck(1, "moving"), truck(2, "stopped")]);
        widget.set_fullscreen(true);

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        match &events[0] {
            SceneEvent::Markers(diff) => assert_eq!(diff.added.len(), 2),
            other => panic!("expected markers, got {other:?}"),
        }
        assert_eq!(events[1], SceneEvent::Viewport(ViewportGeometry::for_mode(true)));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_released_engine_ignores_changes() {
        let queue = SceneQueue::new();
        let mut engine = SceneEngine {
            queue: queue.clone(),
            released: false,
        };
        engine.release();
        engine.apply(&MarkerDiff::default());
        engine.resize(&ViewportGeometry::for_mode(false));
        assert_eq!(queue.len(), 0);
    }
}
