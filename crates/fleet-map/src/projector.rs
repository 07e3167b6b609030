//! Vehicle-to-marker projection.

use serde::Serialize;

use fleet_core::{GeoPosition, VehicleId, VehicleTelemetry};

use crate::icons::{IconSet, MarkerIcon};

const EMPTY_FIELD: &str = "—";
const UNKNOWN_TIMESTAMP: &str = "unknown";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Renderable representation of one vehicle on the map.
///
/// Recomputed on every render pass; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub id: VehicleId,
    pub position: GeoPosition,
    pub icon: MarkerIcon,
    pub popup: PopupContent,
    pub tooltip: TooltipContent,
}

/// Popup shown when a marker is clicked or tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupContent {
    pub name: String,
    pub driver: String,
    pub plate: String,
    pub status_label: String,
    /// Speed with unit, e.g. `54 km/h`.
    pub speed: String,
    pub last_update: String,
}

/// Where a tooltip sits relative to its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipDirection {
    Top,
}

/// Persistent one-line tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    /// `name (driver)`.
    pub text: String,
    pub direction: TooltipDirection,
    pub offset: [i32; 2],
    pub opacity: f32,
    pub permanent: bool,
}

impl TooltipContent {
    fn summary(name: &str, driver: &str) -> Self {
        Self {
            text: format!("{name} ({driver})"),
            direction: TooltipDirection::Top,
            offset: [0, -20],
            opacity: 0.9,
            permanent: true,
        }
    }
}

fn or_placeholder(s: &str) -> String {
    if s.trim().is_empty() {
        EMPTY_FIELD.to_string()
    } else {
        s.to_string()
    }
}

fn format_speed(speed_kph: f64) -> String {
    let speed = if speed_kph.is_finite() && speed_kph > 0.0 {
        speed_kph
    } else {
        0.0
    };
    if speed.fract() == 0.0 {
        format!("{speed:.0} km/h")
    } else {
        format!("{speed:.1} km/h")
    }
}

/// Project one vehicle onto a marker.
pub fn project(vehicle: &VehicleTelemetry, icons: &IconSet) -> MarkerDescriptor {
    let state = vehicle.motion_state();
    let name = or_placeholder(&vehicle.name);
    let driver = or_placeholder(&vehicle.driver_name);

    MarkerDescriptor {
        id: vehicle.id.clone(),
        position: vehicle.position.sanitized(),
        icon: icons.get(state).clone(),
        tooltip: TooltipContent::summary(&name, &driver),
        popup: PopupContent {
            plate: or_placeholder(&vehicle.plate_number),
            status_label: state.label().to_string(),
            speed: format_speed(vehicle.speed_kph),
            last_update: vehicle
                .last_update
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string()),
            name,
            driver,
        },
    }
}

/// Project every vehicle, preserving order. One descriptor per vehicle.
pub fn project_all(vehicles: &[VehicleTelemetry], icons: &IconSet) -> Vec<MarkerDescriptor> {
    vehicles.iter().map(|v| project(v, icons)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::test_client_environment;
    use crate::icons::{initialize_icons, ThemeIconSource};
    use chrono::{TimeZone, Utc};
    use fleet_core::MotionState;

    fn icons() -> IconSet {
        tokio_test::block_on(initialize_icons(
            &test_client_environment(),
            &ThemeIconSource::default(),
            "/fallback.svg",
        ))
    }

    fn vehicle(id: u64, status: &str, speed: f64) -> VehicleTelemetry {
        VehicleTelemetry {
            id: VehicleId::from(id),
            name: "Peugeot 206".to_string(),
            driver_name: "Ali Rezaei".to_string(),
            plate_number: "21الف123".to_string(),
            status: status.to_string(),
            position: GeoPosition::new(35.6892, 51.3890),
            speed_kph: speed,
            last_update: Some(Utc.with_ymd_and_hms(2025, 7, 11, 12, 1, 0).unwrap()),
        }
    }

    #[test]
    fn test_project_popup_and_tooltip() {
        let marker = project(&vehicle(1, "moving", 54.0), &icons());

        assert_eq!(marker.id, VehicleId::from(1));
        assert_eq!(marker.icon.state, MotionState::Moving);
        assert_eq!(marker.popup.name, "Peugeot 206");
        assert_eq!(marker.popup.driver, "Ali Rezaei");
        assert_eq!(marker.popup.plate, "21الف123");
        assert_eq!(marker.popup.status_label, "Moving");
        assert_eq!(marker.popup.speed, "54 km/h");
        assert_eq!(marker.popup.last_update, "2025-07-11 12:01");
        assert_eq!(marker.tooltip.text, "Peugeot 206 (Ali Rezaei)");
        assert_eq!(marker.tooltip.offset, [0, -20]);
    }

    #[test]
    fn test_unknown_status_uses_offline_icon() {
        let marker = project(&vehicle(9, "unknown_value", 12.0), &icons());
        assert_eq!(marker.icon.state, MotionState::Offline);
        assert_eq!(marker.popup.status_label, "Offline");
    }

    #[test]
    fn test_malformed_numbers_are_defaulted() {
        let mut v = vehicle(2, "stopped", f64::NAN);
        v.position = GeoPosition::new(f64::NAN, 500.0);
        v.last_update = None;
        v.name.clear();

        let marker = project(&v, &icons());
        assert_eq!(marker.popup.speed, "0 km/h");
        assert_eq!(marker.position, GeoPosition::new(0.0, 180.0));
        assert_eq!(marker.popup.last_update, "unknown");
        assert_eq!(marker.popup.name, "—");
        assert_eq!(marker.tooltip.text, "— (Ali Rezaei)");
    }

    #[test]
    fn test_fractional_speed() {
        assert_eq!(format_speed(12.34), "12.3 km/h");
        assert_eq!(format_speed(-4.0), "0 km/h");
    }

    #[test]
    fn test_project_all_preserves_identity() {
        let fleet = vec![
            vehicle(1, "moving", 54.0),
            vehicle(2, "stopped", 0.0),
            vehicle(3, "offline", 0.0),
        ];
        let markers = project_all(&fleet, &icons());

        assert_eq!(markers.len(), fleet.len());
        for (marker, v) in markers.iter().zip(&fleet) {
            assert_eq!(marker.id, v.id);
            assert_eq!(marker.icon.state, v.motion_state());
        }
    }
}
