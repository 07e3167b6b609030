//! Vehicle telemetry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::{classify, MotionState};

/// Stable vehicle identifier.
///
/// Opaque to the widget; used as the identity key when diffing marker sets
/// across telemetry updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for VehicleId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
    pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (Self::LATITUDE_RANGE.0..=Self::LATITUDE_RANGE.1).contains(&self.latitude)
            && (Self::LONGITUDE_RANGE.0..=Self::LONGITUDE_RANGE.1).contains(&self.longitude)
    }

    /// Coerce into a displayable position: non-finite values become 0.0 and
    /// out-of-range values are clamped.
    pub fn sanitized(&self) -> Self {
        Self {
            latitude: sanitize_coordinate(self.latitude, Self::LATITUDE_RANGE),
            longitude: sanitize_coordinate(self.longitude, Self::LONGITUDE_RANGE),
        }
    }
}

pub(crate) fn sanitize_coordinate(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        0.0
    }
}

/// One tracked vehicle as reported by the telemetry source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTelemetry {
    pub id: VehicleId,
    pub name: String,
    pub driver_name: String,
    pub plate_number: String,
    /// Status token exactly as reported. Use [`VehicleTelemetry::motion_state`]
    /// for the classified value.
    pub status: String,
    pub position: GeoPosition,
    /// Independent of `status`: zero is valid for a moving vehicle.
    pub speed_kph: f64,
    pub last_update: Option<DateTime<Utc>>,
}

impl VehicleTelemetry {
    /// Classified motion state.
    pub fn motion_state(&self) -> MotionState {
        classify(Some(&self.status))
    }
}
