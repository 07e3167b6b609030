//! fleet-dashboard - web host for the live vehicle map.
//!
//! Runs the map widget server-side and streams it to browsers:
//!
//! - REST API for the current widget snapshot
//! - WebSocket push of incremental marker diffs and viewport changes
//! - Prometheus scrape endpoint
//! - Static page that draws the scene with Leaflet
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      fleet-live process                       │
//! │                                                              │
//! │  ┌───────────────────┐        ┌────────────────────────────┐ │
//! │  │ TelemetryProvider │──poll─▶│ LiveMapWidget              │ │
//! │  └───────────────────┘        │  └─ SceneEngine ─▶ queue   │ │
//! │                               └─────────────┬──────────────┘ │
//! │                                             ▼                │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │       axum HTTP Server (port 8080)                     │  │
//! │  │  GET /             → Static HTML/JS                    │  │
//! │  │  GET /api/snapshot → JSON widget view                  │  │
//! │  │  GET /ws           → WebSocket upgrade                 │  │
//! │  │  GET /metrics      → Prometheus text                   │  │
//! │  │  GET /static/*     → Assets                            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use fleet_dashboard::{scene_widget, run_server, DashboardConfig, DashboardState};
//!
//! let (widget, scene) = scene_widget(viewport, view, theme);
//! let state = DashboardState::new(provider, widget, scene);
//!
//! run_server(state, DashboardConfig::default(), shutdown).await?;
//! ```

mod broadcast;
mod config;
mod error;
mod scene;
mod server;
mod state;
mod types;

pub use broadcast::{publish_scene, run_broadcaster};
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use scene::{scene_widget, SceneEngine, SceneEngineFactory, SceneEvent, SceneQueue};
pub use server::{create_router, run_server, serve, AppState, ConnectionGuard, ConnectionLimiter};
pub use state::DashboardState;
pub use types::{ClientCommand, DashboardMessage, DashboardSnapshot};
