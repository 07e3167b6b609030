//! Telemetry provider seam.
//!
//! The widget never fetches or polls; hosts pull a snapshot from a
//! `TelemetryProvider` on whatever cadence they run and hand it over.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::VehicleTelemetry;

/// Source of vehicle snapshots.
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    /// Fetch the current vehicle list.
    async fn fetch_vehicles(&self) -> Result<Vec<VehicleTelemetry>>;
}

/// Provider returning a fixed vehicle list.
#[derive(Debug, Clone, Default)]
pub struct StaticTelemetryProvider {
    vehicles: Vec<VehicleTelemetry>,
}

impl StaticTelemetryProvider {
    pub fn new(vehicles: Vec<VehicleTelemetry>) -> Self {
        Self { vehicles }
    }
}

#[async_trait]
impl TelemetryProvider for StaticTelemetryProvider {
    async fn fetch_vehicles(&self) -> Result<Vec<VehicleTelemetry>> {
        Ok(self.vehicles.clone())
    }
}
