//! Lenient parsing of raw telemetry records.
//!
//! Data sources are not trusted to send well-formed records. One bad record
//! must not blank the whole map, so normalization never rejects a vehicle:
//! malformed fields are replaced with display-safe defaults and every
//! substitution is reported as a [`Coercion`] for logging and metrics.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{sanitize_coordinate, GeoPosition, VehicleId, VehicleTelemetry};

/// Raw vehicle record as delivered by a data source.
///
/// Every field is optional and loosely typed. Accepts both the snake_case
/// field names used by this workspace and the camelCase names used by the
/// dashboard frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVehicleRecord {
    pub id: Option<Value>,
    pub name: Option<Value>,
    #[serde(alias = "driverName", alias = "driver_name")]
    pub driver: Option<Value>,
    #[serde(alias = "plateNumber", alias = "plate_number")]
    pub plate: Option<Value>,
    #[serde(alias = "motionState", alias = "motion_state")]
    pub status: Option<Value>,
    #[serde(alias = "latitude")]
    pub lat: Option<Value>,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: Option<Value>,
    /// Nested `{"latitude": .., "longitude": ..}` object. Flat `lat`/`lng`
    /// take precedence when both are present.
    pub position: Option<Value>,
    #[serde(alias = "speedKph", alias = "speed_kph")]
    pub speed: Option<Value>,
    #[serde(
        alias = "lastUpdate",
        alias = "lastUpdateTimestamp",
        alias = "last_update_timestamp"
    )]
    pub last_update: Option<Value>,
}

impl RawVehicleRecord {
    /// Read a record from arbitrary JSON.
    ///
    /// Never fails: a value that is not an object yields an empty record, and
    /// an object that does not deserialize as a whole (for example one that
    /// carries both `lat` and `latitude`) is read key by key and the first value read for a field wins.
    pub fn from_json(value: Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            _ => return Self::default(),
        };
        match serde_json::from_value(Value::Object(map.clone())) {
            Ok(record) => record,
            Err(_) => map
                .into_iter()
                .map(|(key, value)| {
                    let mut single = serde_json::Map::new();
                    single.insert(key, value);
                    serde_json::from_value::<Self>(Value::Object(single)).unwrap_or_default()
                })
                .fold(Self::default(), Self::or),
        }
    }

    fn or(self, other: Self) -> Self {
        Self {
            id: self.id.or(other.id),
            name: self.name.or(other.name),
            driver: self.driver.or(other.driver),
            plate: self.plate.or(other.plate),
            status: self.status.or(other.status),
            lat: self.lat.or(other.lat),
            lng: self.lng.or(other.lng),
            position: self.position.or(other.position),
            speed: self.speed.or(other.speed),
            last_update: self.last_update.or(other.last_update),
        }
    }
}

fn nested_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| map.get(*key).cloned())
}

/// Why a field was replaced during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionReason {
    Missing,
    NotNumeric,
    NonFinite,
    OutOfRange,
    Negative,
    Unparseable,
}

impl CoercionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NotNumeric => "not_numeric",
            Self::NonFinite => "non_finite",
            Self::OutOfRange => "out_of_range",
            Self::Negative => "negative",
            Self::Unparseable => "unparseable",
        }
    }
}

/// A field substitution made while normalizing one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coercion {
    pub vehicle: VehicleId,
    pub field: &'static str,
    pub reason: CoercionReason,
}

/// Result of normalizing a batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub vehicles: Vec<VehicleTelemetry>,
    pub coercions: Vec<Coercion>,
}

/// Normalize every record. The output has exactly one vehicle per input record.
pub fn normalize_all(raws: Vec<RawVehicleRecord>) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        vehicles: Vec::with_capacity(raws.len()),
        coercions: Vec::new(),
    };
    for (index, raw) in raws.into_iter().enumerate() {
        let (vehicle, coercions) = normalize(raw, index);
        batch.vehicles.push(vehicle);
        batch.coercions.extend(coercions);
    }
    batch
}

/// Normalize one raw record. `index` is the record's position in its batch
/// and only used to synthesize an id when none is present.
pub fn normalize(raw: RawVehicleRecord, index: usize) -> (VehicleTelemetry, Vec<Coercion>) {
    let mut notes: Vec<(&'static str, CoercionReason)> = Vec::new();

    let id = match raw.id.as_ref().and_then(text) {
        Some(id) if !id.is_empty() => VehicleId::new(id),
        _ => {
            notes.push(("id", CoercionReason::Missing));
            VehicleId::new(format!("vehicle-{index}"))
        }
    };

    let name = display_text(raw.name.as_ref(), "name", &mut notes);
    let driver_name = display_text(raw.driver.as_ref(), "driver", &mut notes);
    let plate_number = display_text(raw.plate.as_ref(), "plate", &mut notes);
    let status = raw.status.as_ref().and_then(text).unwrap_or_default();

    let (lat, lng) = match raw.position {
        None | Some(Value::Null) => (raw.lat, raw.lng),
        Some(Value::Object(pos)) => (
            raw.lat.or_else(|| nested_field(&pos, &["latitude", "lat"])),
            raw.lng.or_else(|| nested_field(&pos, &["longitude", "lng", "lon"])),
        ),
        Some(_) => {
            notes.push(("position", CoercionReason::NotNumeric));
            (raw.lat, raw.lng)
        }
    };
    let position = GeoPosition::new(
        coordinate(lat.as_ref(), "latitude", GeoPosition::LATITUDE_RANGE, &mut notes),
        coordinate(lng.as_ref(), "longitude", GeoPosition::LONGITUDE_RANGE, &mut notes),
    );

    let speed_kph = match raw.speed.as_ref().map(number) {
        None => {
            notes.push(("speed", CoercionReason::Missing));
            0.0
        }
        Some(Err(reason)) => {
            notes.push(("speed", reason));
            0.0
        }
        Some(Ok(v)) if v < 0.0 => {
            notes.push(("speed", CoercionReason::Negative));
            0.0
        }
        Some(Ok(v)) => v,
    };

    let last_update = match raw.last_update.as_ref() {
        None | Some(Value::Null) => {
            notes.push(("last_update", CoercionReason::Missing));
            None
        }
        Some(value) => {
            let parsed = parse_timestamp(value);
            if parsed.is_none() {
                notes.push(("last_update", CoercionReason::Unparseable));
            }
            parsed
        }
    };

    let coercions = notes
        .into_iter()
        .map(|(field, reason)| Coercion {
            vehicle: id.clone(),
            field,
            reason,
        })
        .collect();

    let vehicle = VehicleTelemetry {
        id,
        name,
        driver_name,
        plate_number,
        status,
        position,
        speed_kph,
        last_update,
    };
    (vehicle, coercions)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn display_text(
    value: Option<&Value>,
    field: &'static str,
    notes: &mut Vec<(&'static str, CoercionReason)>,
) -> String {
    match value.and_then(text) {
        Some(s) => s,
        None => {
            notes.push((field, CoercionReason::Missing));
            String::new()
        }
    }
}

fn number(value: &Value) -> Result<f64, CoercionReason> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(CoercionReason::NonFinite),
        None => Err(CoercionReason::NotNumeric),
    }
}

fn coordinate(
    value: Option<&Value>,
    field: &'static str,
    range: (f64, f64),
    notes: &mut Vec<(&'static str, CoercionReason)>,
) -> f64 {
    match value.map(number) {
        None => {
            notes.push((field, CoercionReason::Missing));
            0.0
        }
        Some(Err(reason)) => {
            notes.push((field, reason));
            0.0
        }
        Some(Ok(v)) => {
            let sanitized = sanitize_coordinate(v, range);
            if sanitized != v {
                notes.push((field, CoercionReason::OutOfRange));
            }
            sanitized
        }
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::MotionState;
    use serde_json::json;

    fn raw(value: Value) -> RawVehicleRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_frontend_shape() {
        let record = raw(json!({
            "id": 1,
            "name": "Peugeot 206",
            "driver": "Ali Rezaei",
            "plate": "21الف123",
            "status": "moving",
            "lat": 35.6892,
            "lng": 51.3890,
            "speed": 54,
            "lastUpdate": "2025-07-11 12:01"
        }));

        let (v, coercions) = normalize(record, 0);
        assert!(coercions.is_empty(), "unexpected coercions: {coercions:?}");
        assert_eq!(v.id, VehicleId::from(1));
        assert_eq!(v.driver_name, "Ali Rezaei");
        assert_eq!(v.motion_state(), MotionState::Moving);
        assert_eq!(v.position, GeoPosition::new(35.6892, 51.3890));
        assert_eq!(v.speed_kph, 54.0);
        assert_eq!(
            v.last_update.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2025-07-11 12:01"
        );
    }

    #[test]
    fn test_normalize_camel_case_and_nested_position() {
        let record = raw(json!({
            "id": "truck-9",
            "name": "Samand",
            "driverName": "Mohammad Karimi",
            "plateNumber": "78ج789",
            "motionState": "offline",
            "position": { "latitude": 35.675, "longitude": 51.4 },
            "speedKph": "0",
            "lastUpdateTimestamp": "2025-07-11T11:40:00Z"
        }));

        let (v, coercions) = normalize(record, 3);
        assert!(coercions.is_empty());
        assert_eq!(v.id.as_str(), "truck-9");
        assert_eq!(v.plate_number, "78ج789");
        assert_eq!(v.position, GeoPosition::new(35.675, 51.4));
        assert_eq!(v.speed_kph, 0.0);
        assert!(v.last_update.is_some());
    }

    #[test]
    fn test_malformed_numeric_fields_are_coerced() {
        let record = raw(json!({
            "id": 5,
            "name": "Pride",
            "driver": "Sara Ahmadi",
            "plate": "45ب456",
            "status": "stopped",
            "lat": "not-a-number",
            "lng": 250.0,
            "speed": -3,
            "lastUpdate": "yesterday"
        }));

        let (v, coercions) = normalize(record, 0);
        assert_eq!(v.position, GeoPosition::new(0.0, 180.0));
        assert_eq!(v.speed_kph, 0.0);
        assert!(v.last_update.is_none());

        let fields: Vec<_> = coercions.iter().map(|c| (c.field, c.reason)).collect();
        assert!(fields.contains(&("latitude", CoercionReason::NotNumeric)));
        assert!(fields.contains(&("longitude", CoercionReason::OutOfRange)));
        assert!(fields.contains(&("speed", CoercionReason::Negative)));
        assert!(fields.contains(&("last_update", CoercionReason::Unparseable)));
        assert!(coercions.iter().all(|c| c.vehicle == VehicleId::from(5)));
    }

    #[test]
    fn test_missing_id_is_synthesized() {
        let (v, coercions) = normalize(RawVehicleRecord::default(), 7);
        assert_eq!(v.id.as_str(), "vehicle-7");
        assert_eq!(v.motion_state(), MotionState::Offline);
        assert!(coercions
            .iter()
            .any(|c| c.field == "id" && c.reason == CoercionReason::Missing));
    }

    #[test]
    fn test_non_object_position_keeps_other_fields() {
        for position in [json!("35.7,51.4"), json!([35.7, 51.4])] {
            let record = RawVehicleRecord::from_json(json!({
                "id": "truck-7",
                "name": "Actros",
                "status": "moving",
                "speed": 61,
                "position": position
            }));

            let (v, coercions) = normalize(record, 4);
            assert_eq!(v.id.as_str(), "truck-7");
            assert_eq!(v.name, "Actros");
            assert_eq!(v.motion_state(), MotionState::Moving);
            assert_eq!(v.speed_kph, 61.0);
            assert_eq!(v.position, GeoPosition::new(0.0, 0.0));
            assert!(coercions
                .iter()
                .any(|c| c.field == "position" && c.reason == CoercionReason::NotNumeric));
        }
    }

    #[test]
    fn test_flat_coordinates_win_over_nested() {
        let record = raw(json!({
            "id": 2,
            "lat": 35.7,
            "position": { "lat": 10.0, "lon": 51.4 }
        }));
        let (v, _) = normalize(record, 0);
        assert_eq!(v.position, GeoPosition::new(35.7, 51.4));
    }

    #[test]
    fn test_from_json_reads_conflicting_aliases_key_by_key() {
        let record = RawVehicleRecord::from_json(json!({
            "id": "van-3",
            "status": "stopped",
            "lat": 35.7,
            "latitude": 12.0,
            "lng": 51.4
        }));
        let (v, _) = normalize(record, 0);
        assert_eq!(v.id.as_str(), "van-3");
        assert_eq!(v.motion_state(), MotionState::Stopped);
        assert_eq!(v.position.longitude, 51.4);
        assert!(v.position.latitude == 35.7 || v.position.latitude == 12.0);
    }

    #[test]
    fn test_from_json_non_object_is_empty_record() {
        let (v, _) = normalize(RawVehicleRecord::from_json(json!(42)), 9);
        assert_eq!(v.id.as_str(), "vehicle-9");
    }

    #[test]
    fn test_unix_millis_timestamp() {
        let record = raw(json!({ "id": 1, "lastUpdate": 1752235260000i64 }));
        let (v, _) = normalize(record, 0);
        assert_eq!(v.last_update.unwrap().timestamp_millis(), 1752235260000);
    }

    #[test]
    fn test_normalize_all_keeps_every_record() {
        let raws = vec![
            raw(json!({ "id": 1, "status": "moving" })),
            raw(json!({ "status": 17, "lat": null })),
            raw(json!({ "id": 3, "speed": [1, 2] })),
        ];
        let batch = normalize_all(raws);
        assert_eq!(batch.vehicles.len(), 3);
        assert_eq!(batch.vehicles[1].id.as_str(), "vehicle-1");
        assert_eq!(batch.vehicles[1].motion_state(), MotionState::Offline);
        assert_eq!(batch.vehicles[2].speed_kph, 0.0);
        assert!(!batch.coercions.is_empty());
    }
}
