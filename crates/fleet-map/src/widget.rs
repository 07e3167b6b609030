//! Live map widget composer.
//!
//! Assembles the counter overlay, the legend and the viewport into one
//! renderable view. Until the controller reaches `Rendering`, the whole
//! widget is a loading placeholder.

use serde::Serialize;

use fleet_core::{count, AggregateCounts, MotionState, VehicleTelemetry};

use crate::controller::{
    ClientLifecycleState, ControllerDeps, LifecycleStage, MapViewportController, MountOutcome,
    UnmountHandle,
};
use crate::icons::IconSet;
use crate::projector::{project_all, MarkerDescriptor};
use crate::viewport::{MapView, TileSource, ViewportConfig, ViewportGeometry};

/// Placeholder text shown until the map is rendering.
pub const LOADING_MESSAGE: &str = "Loading map...";

/// One counter in the top overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterEntry {
    pub state: MotionState,
    pub count: usize,
    /// e.g. `2 Moving`.
    pub text: String,
}

/// Top overlay: `Total: N` followed by one entry per state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterPanel {
    pub counts: AggregateCounts,
    pub total_text: String,
    pub entries: Vec<CounterEntry>,
}

impl CounterPanel {
    pub fn from_counts(counts: AggregateCounts) -> Self {
        Self {
            counts,
            total_text: format!("Total: {}", counts.total),
            entries: MotionState::ALL
                .iter()
                .map(|&state| CounterEntry {
                    state,
                    count: counts.get(state),
                    text: format!("{} {}", counts.get(state), state.label()),
                })
                .collect(),
        }
    }
}

/// One legend row mapping a state to its icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub state: MotionState,
    pub label: &'static str,
    pub icon_url: String,
}

fn legend(icons: &IconSet) -> Vec<LegendEntry> {
    icons
        .iter()
        .map(|icon| LegendEntry {
            state: icon.state,
            label: icon.state.label(),
            icon_url: icon.url.clone(),
        })
        .collect()
}

/// Renderable surface of the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WidgetView {
    Loading {
        geometry: ViewportGeometry,
        message: &'static str,
    },
    Live {
        geometry: ViewportGeometry,
        tiles: TileSource,
        view: MapView,
        counters: CounterPanel,
        legend: Vec<LegendEntry>,
        markers: Vec<MarkerDescriptor>,
    },
}

impl WidgetView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn geometry(&self) -> &ViewportGeometry {
        match self {
            Self::Loading { geometry, .. } | Self::Live { geometry, .. } => geometry,
        }
    }
}

/// Live vehicle map widget.
#[derive(Debug)]
pub struct LiveMapWidget {
    controller: MapViewportController,
    vehicles: Vec<VehicleTelemetry>,
}

impl LiveMapWidget {
    pub fn new(config: ViewportConfig, deps: ControllerDeps) -> Self {
        Self {
            controller: MapViewportController::new(config, deps),
            vehicles: Vec::new(),
        }
    }

    /// Mount the map. Markers for any snapshot rendered before the engine was
    /// ready are pushed as soon as it attaches.
    pub async fn mount(&mut self) -> MountOutcome {
        let outcome = self.controller.mount().await;
        if outcome == MountOutcome::Rendering {
            if let Some(icons) = self.controller.icons() {
                let markers = project_all(&self.vehicles, icons);
                self.controller.sync(markers);
            }
        }
        outcome
    }

    pub fn unmount(&mut self) {
        self.controller.unmount();
    }

    pub fn unmount_handle(&self) -> UnmountHandle {
        self.controller.unmount_handle()
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.controller.set_fullscreen(fullscreen);
    }

    pub fn fullscreen(&self) -> bool {
        self.controller.config().fullscreen
    }

    pub fn stage(&self) -> LifecycleStage {
        self.controller.stage()
    }

    pub fn lifecycle(&self) -> ClientLifecycleState {
        self.controller.lifecycle()
    }

    pub fn transitions(&self) -> &[LifecycleStage] {
        self.controller.transitions()
    }

    /// Counters for the last rendered snapshot.
    pub fn counts(&self) -> AggregateCounts {
        count(&self.vehicles)
    }

    /// Take a new snapshot, sync the engine and return the composed view.
    pub fn render(&mut self, vehicles: Vec<VehicleTelemetry>) -> WidgetView {
        self.vehicles = vehicles;
        if let Some(icons) = self.controller.icons() {
            let markers = project_all(&self.vehicles, icons);
            self.controller.sync(markers);
        }
        self.view()
    }

    /// Compose the view for the last snapshot without touching the engine.
    pub fn view(&self) -> WidgetView {
        let geometry = self.controller.geometry().clone();
        let Some(icons) = self.controller.icons() else {
            return WidgetView::Loading {
                geometry,
                message: LOADING_MESSAGE,
            };
        };
        WidgetView::Live {
            geometry,
            tiles: *self.controller.tiles(),
            view: *self.controller.view(),
            counters: CounterPanel::from_counts(count(&self.vehicles)),
            legend: legend(icons),
            markers: project_all(&self.vehicles, icons),
        }
    }
}
