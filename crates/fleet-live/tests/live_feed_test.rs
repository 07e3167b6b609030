//! Live feed integration tests.
//!
//! Drives the hosted widget from a telemetry file that changes between polls.

use std::path::PathBuf;

use fleet_dashboard::{DashboardState, SceneEvent};
use fleet_live::{AppConfig, Application};
use fleet_map::WidgetView;

fn feed_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fleet-live-feed-{}-{name}.json", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

fn state_for(path: &PathBuf) -> DashboardState {
    let mut config = AppConfig::default();
    config.provider.fixture_path = path.clone();
    Application::new(config).unwrap().dashboard_state()
}

#[tokio::test]
async fn test_file_edits_move_vehicles() {
    let path = feed_file(
        "moves",
        r#"[{"id": "t1", "name": "Truck", "status": "moving", "lat": 35.70, "lng": 51.40, "speed": 30}]"#,
    );
    let state = state_for(&path);
    state.mount().await;
    state.refresh().await;
    let first = state.drain_scene();
    assert!(matches!(&first[..], [SceneEvent::Markers(diff)] if diff.added.len() == 1));

    std::fs::write(
        &path,
        r#"[{"id": "t1", "name": "Truck", "status": "stopped", "lat": 35.71, "lng": 51.40, "speed": 0}]"#,
    )
    .unwrap();
    let view = state.refresh().await;
    let second = state.drain_scene();
    std::fs::remove_file(&path).ok();

    let [SceneEvent::Markers(diff)] = &second[..] else {
        panic!("expected one marker diff, got {second:?}");
    };
    assert_eq!(diff.updated.len(), 1);
    assert_eq!(diff.updated[0].position.latitude, 35.71);
    assert!(diff.added.is_empty() && diff.removed.is_empty());

    let WidgetView::Live { counters, .. } = view else {
        panic!("expected live view");
    };
    assert_eq!(counters.counts.stopped, 1);
    assert_eq!(counters.counts.moving, 0);
}

#[tokio::test]
async fn test_unreadable_file_keeps_last_snapshot() {
    let path = feed_file(
        "broken",
        r#"[{"id": 1, "status": "offline", "lat": 35.6, "lng": 51.3}]"#,
    );
    let state = state_for(&path);
    state.mount().await;
    state.refresh().await;
    state.drain_scene();

    std::fs::write(&path, "{ not json").unwrap();
    let view = state.refresh().await;
    std::fs::remove_file(&path).ok();

    assert!(state.drain_scene().is_empty());
    let WidgetView::Live { markers, .. } = view else {
        panic!("expected live view");
    };
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].popup.status_label, "Offline");
}
