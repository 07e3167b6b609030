//! WebSocket broadcast functionality.
//!
//! The broadcaster polls the telemetry provider at a fixed interval, renders
//! the hosted widget and forwards whatever its engine published to all
//! connected WebSocket clients.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use fleet_telemetry::Metrics;

use crate::scene::SceneEvent;
use crate::state::DashboardState;
use crate::types::DashboardMessage;

/// Run the broadcaster task until `shutdown` fires.
pub async fn run_broadcaster(
    state: DashboardState,
    tx: broadcast::Sender<String>,
    interval_ms: u64,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Broadcaster stopped");
                return;
            }
            _ = interval.tick() => {}
        }

        state.refresh().await;
        publish_scene(&state, &tx).await;
    }
}

/// Drain pending scene events into the broadcast channel.
///
/// The broadcaster and every client command task publish through here; the
/// state's publish lock keeps one batch from overtaking another.
///
/// Returns the number of messages published.
pub async fn publish_scene(state: &DashboardState, tx: &broadcast::Sender<String>) -> usize {
    let _publishing = state.publish_lock().await;
    let (events, counts) = state.take_scene().await;
    if events.is_empty() {
        return 0;
    }
    let timestamp_ms = Utc::now().timestamp_millis();

    let mut published = 0;
    for event in events {
        let msg = match event {
            SceneEvent::Markers(diff) => DashboardMessage::Markers {
                timestamp_ms,
                counts,
                diff,
            },
            SceneEvent::Viewport(geometry) => DashboardMessage::Viewport {
                timestamp_ms,
                geometry,
            },
        };
        match serde_json::to_string(&msg) {
            Ok(json) => {
                Metrics::broadcast(msg.kind());
                published += 1;
                // No receivers is normal when no clients are connected.
                match tx.send(json) {
                    Ok(n) => trace!(receivers = n, kind = msg.kind(), "Broadcast sent"),
                    Err(_) => trace!("No WebSocket receivers connected"),
                }
            }
            Err(e) => {
                debug!(error = %e, "Failed to serialize dashboard message");
            }
        }
    }
    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fleet_core::{GeoPosition, StaticTelemetryProvider, VehicleId, VehicleTelemetry};
    use fleet_map::{IconTheme, MapView, ViewportConfig};

    use crate::scene::scene_widget;

    fn state() -> DashboardState {
        let vehicles = vec![VehicleTelemetry {
            id: VehicleId::from("van-1"),
            name: "Van".to_string(),
            driver_name: "Mina".to_string(),
            plate_number: "12A345".to_string(),
            status: "moving".to_string(),
            position: GeoPosition::new(35.7, 51.4),
            speed_kph: 40.0,
            last_update: None,
        }];
        let (widget, scene) =
            scene_widget(ViewportConfig::default(), MapView::default(), IconTheme::default());
        DashboardState::new(
            Arc::new(StaticTelemetryProvider::new(vehicles)),
            widget,
            scene,
        )
    }

    #[tokio::test]
    async fn test_publish_scene_forwards_markers() {
        let state = state();
        let (tx, mut rx) = broadcast::channel::<String>(16);
        state.mount().await;
        state.refresh().await;

        assert_eq!(publish_scene(&state, &tx).await, 1);
        let json: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(json["type"], "markers");
        assert_eq!(json["counts"]["moving"], 1);
        assert_eq!(json["diff"]["added"][0]["id"], "van-1");

        // Unchanged snapshot publishes nothing.
        state.refresh().await;
        assert_eq!(publish_scene(&state, &tx).await, 0);
    }

    #[tokio::test]
    async fn test_publish_scene_forwards_viewport() {
        let state = state();
        let (tx, mut rx) = broadcast::channel::<String>(16);
        state.mount().await;
        state.set_fullscreen(true).await;

        assert_eq!(publish_scene(&state, &tx).await, 1);
        let json: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(json["type"], "viewport");
        assert_eq!(json["geometry"]["fullscreen"], true);
    }

    #[tokio::test]
    async fn test_publishers_do_not_interleave() {
        let state = state();
        let (tx, mut rx) = broadcast::channel::<String>(16);
        state.mount().await;
        state.refresh().await;

        let held = state.publish_lock().await;
        let waiting = tokio::spawn({
            let state = state.clone();
            let tx = tx.clone();
            async move { publish_scene(&state, &tx).await }
        });
        tokio::task::yield_now().await;
        state.set_fullscreen(true).await;

        // The waiting publisher has not drained anything yet.
        assert!(rx.try_recv().is_err());
        assert!(!waiting.is_finished());

        drop(held);
        assert_eq!(waiting.await.unwrap(), 2);
        let first: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        let second: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(first["type"], "markers");
        assert_eq!(first["counts"]["moving"], 1);
        assert_eq!(second["type"], "viewport");
        assert_eq!(publish_scene(&state, &tx).await, 0);
    }

    #[tokio::test]
    async fn test_broadcaster_stops_on_shutdown() {
        let state = state();
        let (tx, _rx) = broadcast::channel::<String>(16);
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        run_broadcaster(state, tx, 10, shutdown).await;
    }
}
