//! File-backed telemetry provider.
//!
//! Re-reads a JSON document on every fetch, so editing the file while the
//! service runs moves vehicles on the map.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use fleet_core::{normalize_all, CoreError, RawVehicleRecord, TelemetryProvider, VehicleTelemetry};
use fleet_telemetry::Metrics;

/// Reads raw vehicle records from a JSON file.
///
/// Accepts either a top-level array of records or an object with a
/// `vehicles` array.
#[derive(Debug, Clone)]
pub struct JsonFileTelemetryProvider {
    path: PathBuf,
}

impl JsonFileTelemetryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn records(document: Value) -> fleet_core::Result<Vec<RawVehicleRecord>> {
    let list = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("vehicles") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CoreError::InvalidPayload(
                    "expected a `vehicles` array".to_string(),
                ))
            }
        },
        other => {
            return Err(CoreError::InvalidPayload(format!(
                "expected an array of vehicles, got {}",
                json_kind(&other)
            )))
        }
    };
    // A record that is not even an object still becomes a vehicle.
    Ok(list.into_iter().map(RawVehicleRecord::from_json).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl TelemetryProvider for JsonFileTelemetryProvider {
    async fn fetch_vehicles(&self) -> fleet_core::Result<Vec<VehicleTelemetry>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        // Writers that truncate before rewriting leave a brief empty window.
        if content.trim().is_empty() {
            return Err(CoreError::SourceUnavailable(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        let document: Value = serde_json::from_str(&content)?;
        let batch = normalize_all(records(document)?);

        for coercion in &batch.coercions {
            warn!(
                vehicle = %coercion.vehicle,
                field = coercion.field,
                reason = coercion.reason.as_str(),
                "Coerced malformed telemetry field"
            );
            Metrics::field_coerced(coercion.field, coercion.reason.as_str());
        }
        debug!(
            path = %self.path.display(),
            vehicles = batch.vehicles.len(),
            coerced = batch.coercions.len(),
            "Telemetry file read"
        );
        Ok(batch.vehicles)
    }
}
