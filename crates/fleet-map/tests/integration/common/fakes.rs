//! Instrumented collaborators for lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use fleet_core::MotionState;
use fleet_map::{
    ClientEnvironment, ControllerDeps, EngineMount, ExecutionContext, IconSource, MapEngine,
    MapEngineFactory, MapError, MapResult, MapView, MarkerDiff, MarkerIcon, RenderEnvironment,
    ViewportGeometry,
};

/// Everything the recording engine observed.
#[derive(Default)]
pub struct EngineLog {
    attaches: AtomicUsize,
    releases: AtomicUsize,
    attach_geometry: Mutex<Option<ViewportGeometry>>,
    resizes: Mutex<Vec<ViewportGeometry>>,
    diffs: Mutex<Vec<MarkerDiff>>,
}

impl EngineLog {
    pub fn attaches(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn attach_geometry(&self) -> Option<ViewportGeometry> {
        self.attach_geometry.lock().clone()
    }

    pub fn resizes(&self) -> Vec<ViewportGeometry> {
        self.resizes.lock().clone()
    }

    pub fn diffs(&self) -> Vec<MarkerDiff> {
        self.diffs.lock().clone()
    }
}

pub struct RecordingFactory {
    pub log: Arc<EngineLog>,
}

struct RecordingEngine {
    log: Arc<EngineLog>,
}

impl MapEngineFactory for RecordingFactory {
    fn attach(&self, _env: &ClientEnvironment, mount: EngineMount<'_>) -> Box<dyn MapEngine> {
        self.log.attaches.fetch_add(1, Ordering::SeqCst);
        *self.log.attach_geometry.lock() = Some(mount.geometry.clone());
        Box::new(RecordingEngine {
            log: Arc::clone(&self.log),
        })
    }
}

impl MapEngine for RecordingEngine {
    fn apply(&mut self, diff: &MarkerDiff) {
        self.log.diffs.lock().push(diff.clone());
    }

    fn resize(&mut self, geometry: &ViewportGeometry) {
        self.log.resizes.lock().push(geometry.clone());
    }

    fn release(&mut self) {
        self.log.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Opens when the paired sender publishes `true`.
#[derive(Clone)]
pub struct Gate {
    rx: watch::Receiver<bool>,
}

impl Gate {
    pub fn new(open: bool) -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(open);
        (tx, Self { rx })
    }

    async fn wait(&self) -> bool {
        let mut rx = self.rx.clone();
        let opened = rx.wait_for(|open| *open).await.is_ok();
        opened
    }
}

/// Environment whose detection waits on a gate.
pub struct GatedEnvironment {
    pub context: ExecutionContext,
    pub gate: Gate,
    pub detections: AtomicUsize,
}

#[async_trait]
impl RenderEnvironment for GatedEnvironment {
    async fn detect(&self) -> ExecutionContext {
        self.detections.fetch_add(1, Ordering::SeqCst);
        self.gate.wait().await;
        self.context
    }
}

/// Icon source that waits on a gate and can fail chosen states.
pub struct GatedIconSource {
    pub gate: Gate,
    pub failing: Vec<MotionState>,
    pub requests: AtomicUsize,
}

#[async_trait]
impl IconSource for GatedIconSource {
    async fn load(&self, state: MotionState) -> MapResult<MarkerIcon> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.gate.wait().await || self.failing.contains(&state) {
            return Err(MapError::IconAsset {
                state,
                reason: "asset unavailable".to_string(),
            });
        }
        Ok(MarkerIcon::pin(state, format!("/icons/{state}.png")))
    }
}

/// Handles for steering and observing one widget under test.
pub struct Harness {
    pub deps: ControllerDeps,
    pub engine: Arc<EngineLog>,
    pub environment: Arc<GatedEnvironment>,
    pub icons: Arc<GatedIconSource>,
    pub environment_gate: watch::Sender<bool>,
    pub icon_gate: watch::Sender<bool>,
}

pub struct HarnessBuilder {
    context: ExecutionContext,
    environment_open: bool,
    icons_open: bool,
    failing: Vec<MotionState>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            context: ExecutionContext::Interactive,
            environment_open: true,
            icons_open: true,
            failing: Vec::new(),
        }
    }
}

impl HarnessBuilder {
    pub fn prerender(mut self) -> Self {
        self.context = ExecutionContext::PreRender;
        self
    }

    pub fn environment_pending(mut self) -> Self {
        self.environment_open = false;
        self
    }

    pub fn icons_pending(mut self) -> Self {
        self.icons_open = false;
        self
    }

    pub fn failing_icon(mut self, state: MotionState) -> Self {
        self.failing.push(state);
        self
    }

    pub fn build(self) -> Harness {
        let (environment_gate, env_rx) = Gate::new(self.environment_open);
        let (icon_gate, icon_rx) = Gate::new(self.icons_open);
        let engine = Arc::new(EngineLog::default());
        let environment = Arc::new(GatedEnvironment {
            context: self.context,
            gate: env_rx,
            detections: AtomicUsize::new(0),
        });
        let icons = Arc::new(GatedIconSource {
            gate: icon_rx,
            failing: self.failing,
            requests: AtomicUsize::new(0),
        });
        let deps = ControllerDeps {
            environment: environment.clone(),
            icon_source: icons.clone(),
            engine_factory: Arc::new(RecordingFactory {
                log: Arc::clone(&engine),
            }),
            fallback_icon_url: "/static/marker-fallback.svg".to_string(),
            view: MapView::default(),
        };
        Harness {
            deps,
            engine,
            environment,
            icons,
            environment_gate,
            icon_gate,
        }
    }
}

impl Harness {
    pub fn icon_requests(&self) -> usize {
        self.icons.requests.load(Ordering::SeqCst)
    }

    pub fn detections(&self) -> usize {
        self.environment.detections.load(Ordering::SeqCst)
    }
}
