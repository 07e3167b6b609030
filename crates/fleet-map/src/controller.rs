//! Map viewport controller.
//!
//! Owns the map engine lifecycle for one widget instance:
//!
//! ```text
//! Unmounted ──(interactive context)──▶ EnvironmentReady ──(icons resolved)──▶ IconsLoaded
//!     ▲                                                                           │
//!     │                                                            (engine attached)
//!     │                                                                           ▼
//!     └──────────────────────────── unmount (from any stage) ◀──────────── Rendering
//! ```
//!
//! Both suspension points (context detection and icon loading) race the
//! instance's cancellation token. An unmount while either is pending drops
//! the in-flight result without touching controller state.
//!
//! The icon set and the engine are stored only in the `Rendering` phase, so
//! nothing can read them earlier.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fleet_telemetry::Metrics;

use crate::engine::{EngineMount, MapEngine, MapEngineFactory};
use crate::environment::{open_gate, ClientEnvironment, RenderEnvironment};
use crate::icons::{initialize_icons, IconSet, IconSource};
use crate::projector::MarkerDescriptor;
use crate::sync::MarkerSet;
use crate::viewport::{MapView, TileSource, ViewportConfig, ViewportGeometry};

/// Observable lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Unmounted,
    EnvironmentReady,
    IconsLoaded,
    Rendering,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmounted => "unmounted",
            Self::EnvironmentReady => "environment_ready",
            Self::IconsLoaded => "icons_loaded",
            Self::Rendering => "rendering",
        }
    }
}

/// Readiness latches. Both only ever go from false to true while mounted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientLifecycleState {
    pub is_client_environment_ready: bool,
    pub are_icons_loaded: bool,
}

/// Result of [`MapViewportController::mount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Engine attached; markers can be synced.
    Rendering,
    /// Pre-render context; the placeholder stays up.
    Deferred,
    /// Unmounted before mounting finished.
    Abandoned,
    /// Mount was already attempted on this instance.
    AlreadyMounted,
}

/// Collaborators injected into a controller.
#[derive(Clone)]
pub struct ControllerDeps {
    pub environment: Arc<dyn RenderEnvironment>,
    pub icon_source: Arc<dyn IconSource>,
    pub engine_factory: Arc<dyn MapEngineFactory>,
    pub fallback_icon_url: String,
    pub view: MapView,
}

/// Cloneable handle that unmounts the widget from outside the mount future.
#[derive(Debug, Clone)]
pub struct UnmountHandle {
    token: CancellationToken,
}

impl UnmountHandle {
    pub fn unmount(&self) {
        self.token.cancel();
    }

    pub fn is_unmounted(&self) -> bool {
        self.token.is_cancelled()
    }
}

enum Phase {
    Unmounted,
    EnvironmentReady,
    IconsLoaded,
    Rendering {
        _env: ClientEnvironment,
        icons: IconSet,
        engine: Box<dyn MapEngine>,
    },
}

impl Phase {
    fn stage(&self) -> LifecycleStage {
        match self {
            Self::Unmounted => LifecycleStage::Unmounted,
            Self::EnvironmentReady => LifecycleStage::EnvironmentReady,
            Self::IconsLoaded => LifecycleStage::IconsLoaded,
            Self::Rendering { .. } => LifecycleStage::Rendering,
        }
    }
}

/// Lifecycle owner for one widget's map engine.
pub struct MapViewportController {
    deps: ControllerDeps,
    config: ViewportConfig,
    geometry: ViewportGeometry,
    phase: Phase,
    lifecycle: ClientLifecycleState,
    markers: MarkerSet,
    transitions: Vec<LifecycleStage>,
    cancel: CancellationToken,
    mount_started: bool,
    released: bool,
}

impl MapViewportController {
    pub fn new(config: ViewportConfig, deps: ControllerDeps) -> Self {
        Self {
            deps,
            config,
            geometry: ViewportGeometry::from(config),
            phase: Phase::Unmounted,
            lifecycle: ClientLifecycleState::default(),
            markers: MarkerSet::new(),
            transitions: Vec::new(),
            cancel: CancellationToken::new(),
            mount_started: false,
            released: false,
        }
    }

    /// Current stage. Reports `Unmounted` as soon as an unmount is requested.
    pub fn stage(&self) -> LifecycleStage {
        if self.cancel.is_cancelled() {
            LifecycleStage::Unmounted
        } else {
            self.phase.stage()
        }
    }

    pub fn lifecycle(&self) -> ClientLifecycleState {
        self.lifecycle
    }

    /// Every stage entered so far, in order.
    pub fn transitions(&self) -> &[LifecycleStage] {
        &self.transitions
    }

    pub fn config(&self) -> ViewportConfig {
        self.config
    }

    pub fn geometry(&self) -> &ViewportGeometry {
        &self.geometry
    }

    pub fn view(&self) -> &MapView {
        &self.deps.view
    }

    pub fn tiles(&self) -> &'static TileSource {
        &TileSource::OPEN_STREET_MAP
    }

    /// Icon set, available only while rendering.
    pub fn icons(&self) -> Option<&IconSet> {
        match &self.phase {
            Phase::Rendering { icons, .. } if !self.cancel.is_cancelled() => Some(icons),
            _ => None,
        }
    }

    pub fn unmount_handle(&self) -> UnmountHandle {
        UnmountHandle {
            token: self.cancel.clone(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        let stage = self.phase.stage();
        self.transitions.push(stage);
        Metrics::widget_stage_set(stage.as_str());
        info!(stage = stage.as_str(), "Map viewport stage changed");
    }

    /// Open both gates and attach the map engine.
    pub async fn mount(&mut self) -> MountOutcome {
        if self.cancel.is_cancelled() {
            return MountOutcome::Abandoned;
        }
        if self.mount_started {
            return MountOutcome::AlreadyMounted;
        }
        self.mount_started = true;

        let cancel = self.cancel.clone();
        let environment = Arc::clone(&self.deps.environment);
        let gate = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Unmounted during environment detection");
                return MountOutcome::Abandoned;
            }
            gate = open_gate(environment.as_ref()) => gate,
        };
        let Some(env) = gate else {
            return MountOutcome::Deferred;
        };

        self.lifecycle.is_client_environment_ready = true;
        self.enter(Phase::EnvironmentReady);

        let source = Arc::clone(&self.deps.icon_source);
        let fallback_url = self.deps.fallback_icon_url.clone();
        let icons = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Unmounted while icons were loading, discarding result");
                return MountOutcome::Abandoned;
            }
            icons = initialize_icons(&env, source.as_ref(), &fallback_url) => icons,
        };

        self.lifecycle.are_icons_loaded = true;
        self.enter(Phase::IconsLoaded);

        let engine = self.deps.engine_factory.attach(
            &env,
            EngineMount {
                icons: &icons,
                geometry: &self.geometry,
                tiles: &TileSource::OPEN_STREET_MAP,
                view: &self.deps.view,
            },
        );
        self.enter(Phase::Rendering {
            _env: env,
            icons,
            engine,
        });
        MountOutcome::Rendering
    }

    /// Release the engine if an unmount was requested through a handle.
    fn reap(&mut self) {
        if self.cancel.is_cancelled() && !self.released {
            self.release();
        }
    }

    fn release(&mut self) {
        self.released = true;
        let was_mounted = !matches!(self.phase, Phase::Unmounted);
        if let Phase::Rendering { engine, .. } = &mut self.phase {
            engine.release();
        }
        self.markers.clear();
        if was_mounted {
            self.enter(Phase::Unmounted);
        }
    }

    /// Unmount the widget. Terminal for this instance.
    pub fn unmount(&mut self) {
        self.cancel.cancel();
        self.reap();
    }

    /// Switch between windowed and fullscreen presentation.
    ///
    /// While rendering, the live engine is resized in place; the lifecycle
    /// stage does not change and the engine is not re-attached.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.reap();
        if self.config.fullscreen == fullscreen {
            return;
        }
        self.config.fullscreen = fullscreen;
        self.geometry = ViewportGeometry::for_mode(fullscreen);
        if let Phase::Rendering { engine, .. } = &mut self.phase {
            if !self.released {
                engine.resize(&self.geometry);
                debug!(fullscreen, "Resized live viewport");
            }
        }
    }

    /// Push the latest markers to the engine. No-op until rendering.
    ///
    /// Returns the number of marker changes applied.
    pub fn sync(&mut self, markers: Vec<MarkerDescriptor>) -> usize {
        self.reap();
        if self.released {
            return 0;
        }
        let Phase::Rendering { engine, .. } = &mut self.phase else {
            return 0;
        };
        let diff = self.markers.reconcile(markers);
        if diff.is_empty() {
            return 0;
        }
        engine.apply(&diff);
        Metrics::marker_changes(diff.added.len(), diff.updated.len(), diff.removed.len());
        debug!(
            added = diff.added.len(),
            updated = diff.updated.len(),
            removed = diff.removed.len(),
            "Markers synced"
        );
        diff.change_count()
    }
}

impl Drop for MapViewportController {
    fn drop(&mut self) {
        if !self.released {
            if let Phase::Rendering { engine, .. } = &mut self.phase {
                warn!("Controller dropped while rendering, releasing engine");
                engine.release();
            }
            self.released = true;
        }
    }
}

impl std::fmt::Debug for MapViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapViewportController")
            .field("stage", &self.stage())
            .field("lifecycle", &self.lifecycle)
            .field("fullscreen", &self.config.fullscreen)
            .field("markers", &self.markers.len())
            .finish()
    }
}
