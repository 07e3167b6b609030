//! Dashboard API types.
//!
//! These types are used for JSON serialization in REST and WebSocket APIs.

use serde::{Deserialize, Serialize};

use fleet_core::AggregateCounts;
use fleet_map::{LifecycleStage, MarkerDiff, ViewportGeometry, WidgetView};

/// Full widget snapshot (sent on initial connection and via REST).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Timestamp when snapshot was taken (Unix milliseconds).
    pub timestamp_ms: i64,
    /// Controller lifecycle stage.
    pub stage: LifecycleStage,
    /// Composed widget for the last fetched vehicle list.
    pub view: WidgetView,
}

/// Server to client WebSocket message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage {
    /// Full state (sent once on connect).
    Snapshot(DashboardSnapshot),
    /// Incremental marker changes plus the counters they produce.
    Markers {
        timestamp_ms: i64,
        counts: AggregateCounts,
        diff: MarkerDiff,
    },
    /// The viewport switched presentation mode.
    Viewport {
        timestamp_ms: i64,
        geometry: ViewportGeometry,
    },
}

impl DashboardMessage {
    /// Label used for broadcast metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Markers { .. } => "markers",
            Self::Viewport { .. } => "viewport",
        }
    }
}

/// Client to server WebSocket command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    SetFullscreen { fullscreen: bool },
}
