//! fleet-map - live vehicle map widget core.
//!
//! Turns vehicle telemetry snapshots into classified, interactive markers on a
//! map and owns the client-only rendering lifecycle of the map engine.
//!
//! # Lifecycle
//!
//! The map engine and its icon assets only exist in an interactive context.
//! Mounting passes two one-shot gates before anything touches them:
//!
//! 1. environment detection yields a [`ClientEnvironment`] proof token
//! 2. the icon registry resolves an instance-scoped [`IconSet`]
//!
//! Only then is the engine attached. Until that point the widget renders a
//! loading placeholder.
//!
//! # Usage
//!
//! ```ignore
//! use fleet_map::{ControllerDeps, LiveMapWidget, ViewportConfig};
//!
//! let mut widget = LiveMapWidget::new(ViewportConfig::default(), deps);
//! widget.mount().await;
//!
//! let vehicles = provider.fetch_vehicles().await?;
//! let view = widget.render(vehicles);
//! ```

pub mod controller;
pub mod engine;
pub mod environment;
pub mod error;
pub mod icons;
pub mod projector;
pub mod sync;
pub mod viewport;
pub mod widget;

pub use controller::{
    ClientLifecycleState, ControllerDeps, LifecycleStage, MapViewportController, MountOutcome,
    UnmountHandle,
};
pub use engine::{EngineMount, MapEngine, MapEngineFactory};
pub use environment::{
    open_gate, ClientEnvironment, ExecutionContext, InteractiveEnvironment, PreRenderEnvironment,
    RenderEnvironment,
};
pub use error::{MapError, MapResult};
pub use icons::{initialize_icons, IconSet, IconSource, IconTheme, MarkerIcon, ThemeIconSource};
pub use projector::{project, project_all, MarkerDescriptor, PopupContent, TooltipContent};
pub use sync::{MarkerDiff, MarkerSet};
pub use viewport::{MapView, TileSource, ViewportConfig, ViewportGeometry, ViewportHeight};
pub use widget::{CounterEntry, CounterPanel, LegendEntry, LiveMapWidget, WidgetView, LOADING_MESSAGE};
