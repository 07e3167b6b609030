//! Prometheus metrics for the fleet live map.
//!
//! Covers:
//! - Fleet composition (vehicles per classified state)
//! - Data quality (unrecognized statuses, coerced fields, provider errors)
//! - Widget lifecycle (stage, icon fallbacks, marker sync volume)
//! - Dashboard delivery (WebSocket clients, broadcasts)
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on duplicate
//! metric names, which is a startup bug and should crash immediately.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_int_counter, register_int_gauge,
    CounterVec, Encoder, GaugeVec, IntCounter, IntGauge, TextEncoder,
};

use crate::error::TelemetryResult;

/// Vehicles per classified motion state in the latest snapshot.
/// Labels: state (moving/stopped/offline)
pub static FLEET_VEHICLES: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "fleet_vehicles",
        "Vehicles per classified motion state in the latest snapshot",
        &["state"]
    )
    .unwrap()
});

/// Status tokens that did not match a known state and were shown as offline.
pub static FLEET_UNRECOGNIZED_STATUS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "fleet_unrecognized_status_total",
        "Status tokens classified as offline because they were not recognized"
    )
    .unwrap()
});

/// Record fields replaced with a display default during normalization.
pub static FLEET_COERCED_FIELDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "fleet_coerced_fields_total",
        "Telemetry fields replaced with a display default",
        &["field", "reason"]
    )
    .unwrap()
});

/// Failed telemetry fetches (last known snapshot kept).
pub static FLEET_FETCH_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "fleet_fetch_errors_total",
        "Telemetry provider fetches that failed"
    )
    .unwrap()
});

/// Icons replaced by the fallback glyph.
pub static MAP_ICON_FALLBACK_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "map_icon_fallback_total",
        "Marker icons that failed to load and were replaced by the fallback glyph",
        &["state"]
    )
    .unwrap()
});

/// Widget lifecycle stage (1 = current stage).
pub static MAP_WIDGET_STAGE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "map_widget_stage",
        "Widget lifecycle stage (1=active, 0=inactive)",
        &["stage"]
    )
    .unwrap()
});

/// Marker changes applied to the map engine.
/// Labels: change (added/updated/removed)
pub static MAP_MARKER_CHANGES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "map_marker_changes_total",
        "Marker changes applied to the map engine",
        &["change"]
    )
    .unwrap()
});

/// Open dashboard WebSocket connections.
pub static DASHBOARD_WS_CONNECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "dashboard_ws_connections",
        "Open dashboard WebSocket connections"
    )
    .unwrap()
});

/// Messages pushed to the broadcast channel.
pub static DASHBOARD_BROADCAST_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dashboard_broadcast_total",
        "Messages pushed to dashboard WebSocket clients",
        &["kind"]
    )
    .unwrap()
});

const WIDGET_STAGES: [&str; 4] = ["unmounted", "environment_ready", "icons_loaded", "rendering"];

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Set the per-state vehicle gauges.
    pub fn fleet_counts(moving: usize, stopped: usize, offline: usize) {
        FLEET_VEHICLES
            .with_label_values(&["moving"])
            .set(moving as f64);
        FLEET_VEHICLES
            .with_label_values(&["stopped"])
            .set(stopped as f64);
        FLEET_VEHICLES
            .with_label_values(&["offline"])
            .set(offline as f64);
    }

    /// Record unrecognized status tokens.
    pub fn unrecognized_status(count: u64) {
        FLEET_UNRECOGNIZED_STATUS_TOTAL.inc_by(count);
    }

    /// Record one coerced field.
    pub fn field_coerced(field: &str, reason: &str) {
        FLEET_COERCED_FIELDS_TOTAL
            .with_label_values(&[field, reason])
            .inc();
    }

    /// Record a failed provider fetch.
    pub fn fetch_error() {
        FLEET_FETCH_ERRORS_TOTAL.inc();
    }

    /// Record an icon fallback.
    pub fn icon_fallback(state: &str) {
        MAP_ICON_FALLBACK_TOTAL.with_label_values(&[state]).inc();
    }

    /// Set the widget lifecycle stage. Only the active stage is 1.
    pub fn widget_stage_set(stage: &str) {
        for s in &WIDGET_STAGES {
            MAP_WIDGET_STAGE.with_label_values(&[s]).set(0.0);
        }
        MAP_WIDGET_STAGE.with_label_values(&[stage]).set(1.0);
    }

    /// Record marker changes applied in one sync pass.
    pub fn marker_changes(added: usize, updated: usize, removed: usize) {
        for (change, n) in [("added", added), ("updated", updated), ("removed", removed)] {
            if n > 0 {
                MAP_MARKER_CHANGES_TOTAL
                    .with_label_values(&[change])
                    .inc_by(n as f64);
            }
        }
    }

    /// Record a WebSocket client connecting.
    pub fn ws_client_connected() {
        DASHBOARD_WS_CONNECTIONS.inc();
    }

    /// Record a WebSocket client disconnecting.
    pub fn ws_client_disconnected() {
        DASHBOARD_WS_CONNECTIONS.dec();
    }

    /// Record a broadcast message.
    pub fn broadcast(kind: &str) {
        DASHBOARD_BROADCAST_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
