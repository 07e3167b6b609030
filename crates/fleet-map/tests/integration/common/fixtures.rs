//! Vehicle snapshots shared by the integration tests.

use chrono::{TimeZone, Utc};
use fleet_core::{GeoPosition, VehicleId, VehicleTelemetry};

pub fn vehicle(
    id: u64,
    name: &str,
    driver: &str,
    status: &str,
    lat: f64,
    lng: f64,
    speed: f64,
) -> VehicleTelemetry {
    VehicleTelemetry {
        id: VehicleId::from(id),
        name: name.to_string(),
        driver_name: driver.to_string(),
        plate_number: format!("PL-{id}"),
        status: status.to_string(),
        position: GeoPosition::new(lat, lng),
        speed_kph: speed,
        last_update: Some(Utc.with_ymd_and_hms(2025, 7, 11, 12, 1, 0).unwrap()),
    }
}

/// The three-vehicle sample fleet.
pub fn sample_fleet() -> Vec<VehicleTelemetry> {
    vec![
        vehicle(1, "Peugeot 206", "Ali Rezaei", "moving", 35.6892, 51.3890, 54.0),
        vehicle(2, "Pride", "Sara Ahmadi", "stopped", 35.7012, 51.4100, 0.0),
        vehicle(3, "Samand", "Mohammad Karimi", "offline", 35.6750, 51.4000, 0.0),
    ]
}
