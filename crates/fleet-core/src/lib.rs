//! Core domain types for the fleet live map.
//!
//! This crate provides the fundamental types shared by the widget and its hosts:
//! - `VehicleTelemetry`: one tracked vehicle as reported by the data source
//! - `MotionState`: fail-closed classification of the reported status
//! - `AggregateCounts`: total/moving/stopped/offline counters
//! - `TelemetryProvider`: the seam through which vehicle snapshots arrive

pub mod counts;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod status;
pub mod types;

pub use counts::{count, AggregateCounts};
pub use error::{CoreError, Result};
pub use normalize::{normalize, normalize_all, Coercion, NormalizedBatch, RawVehicleRecord};
pub use provider::{StaticTelemetryProvider, TelemetryProvider};
pub use status::{classify, is_recognized, MotionState};
pub use types::{GeoPosition, VehicleId, VehicleTelemetry};
