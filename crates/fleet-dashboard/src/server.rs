//! HTTP server implementation using axum.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use fleet_telemetry::Metrics;

use crate::broadcast::{publish_scene, run_broadcaster};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::state::DashboardState;
use crate::types::{ClientCommand, DashboardMessage, DashboardSnapshot};

/// Caps concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Reserve a slot. The slot is returned when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                Metrics::ws_client_connected();
                return Some(ConnectionGuard {
                    limiter: Arc::clone(self),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

/// Held by a WebSocket task for the lifetime of its connection.
pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
        Metrics::ws_client_disconnected();
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dashboard_state: DashboardState,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
    config: DashboardConfig,
}

impl AppState {
    pub fn new(
        dashboard_state: DashboardState,
        broadcast_tx: broadcast::Sender<String>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            dashboard_state,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            config,
        }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    Router::new()
        .route("/", get(serve_index))
        .route("/api/snapshot", get(get_snapshot))
        .route("/ws", get(ws_handler))
        .route("/metrics", get(get_metrics))
        .nest_service("/static", static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the index HTML page.
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Get current widget snapshot as JSON.
async fn get_snapshot(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard_state.collect_snapshot().await)
}

/// Prometheus scrape endpoint.
async fn get_metrics() -> Response {
    match Metrics::gather_text() {
        Ok(body) => (
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let Some(guard) = state.connection_limiter.try_acquire() else {
        warn!(
            current = state.connection_limiter.current_count(),
            max = state.config.max_connections,
            "WebSocket connection limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

/// Handle a WebSocket connection.
async fn handle_ws_connection(socket: WebSocket, state: AppState, _guard: ConnectionGuard) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot so no change falls between the two.
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    let initial = DashboardMessage::Snapshot(state.dashboard_state.collect_snapshot().await);
    if let Ok(json) = serde_json::to_string(&initial) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("Failed to send initial snapshot, client disconnected");
            return;
        }
        Metrics::broadcast(initial.kind());
    }

    // Incoming commands change the shared viewport; the resulting scene
    // events go out to every client immediately.
    let commands_state = state.dashboard_state.clone();
    let commands_tx = state.broadcast_tx.clone();
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(text.as_str()) {
                    Ok(ClientCommand::SetFullscreen { fullscreen }) => {
                        debug!(fullscreen, "Client requested viewport change");
                        commands_state.set_fullscreen(fullscreen).await;
                        publish_scene(&commands_state, &commands_tx).await;
                    }
                    Err(e) => {
                        debug!(error = %e, "Ignoring malformed client command");
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send message, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
        }
    }
    incoming_task.abort();

    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Serve the dashboard on an already bound listener until `shutdown` fires.
///
/// Mounts the hosted widget, starts the broadcaster and unmounts the widget
/// once the server has drained.
pub async fn serve(
    listener: TcpListener,
    dashboard_state: DashboardState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> DashboardResult<()> {
    let outcome = dashboard_state.mount().await;
    info!(?outcome, "Live map widget mounted");

    // 32 messages of headroom for slow clients.
    let (broadcast_tx, _) = broadcast::channel::<String>(32);

    let state = AppState::new(dashboard_state.clone(), broadcast_tx.clone(), config.clone());
    let app = create_router(state);

    let broadcaster = tokio::spawn(run_broadcaster(
        dashboard_state.clone(),
        broadcast_tx,
        config.update_interval_ms,
        shutdown.clone(),
    ));

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .map_err(DashboardError::Serve);

    shutdown.cancel();
    if let Err(e) = broadcaster.await {
        warn!(error = %e, "Broadcaster task failed");
    }
    dashboard_state.unmount().await;
    result
}

/// Bind the configured port and run the dashboard HTTP server.
pub async fn run_server(
    dashboard_state: DashboardState,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> DashboardResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(DashboardError::Bind)?;
    info!(port = config.port, "Starting dashboard server");
    serve(listener, dashboard_state, config, shutdown).await
}
