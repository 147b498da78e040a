//! HTTP/WebSocket endpoint of the ground station.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::StationError;
use super::ingest::handle_frame;
use super::liveness::{LivenessWatch, DEFAULT_POLL_INTERVAL};
use crate::link::{ConnectionState, LinkState, WEBSOCKET_PATH};
use crate::telemetry::TelemetryStore;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 6000;

/// A session that stays silent this long is considered dead.
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(30);

/// Station server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub host: String,
    pub port: u16,
    pub liveness_poll: Duration,
    pub liveness_timeout: Duration,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            liveness_poll: DEFAULT_POLL_INTERVAL,
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
        }
    }
}

impl StationConfig {
    /// `host:port` as given to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub link: ConnectionState,
    pub samples_received: u64,
}

struct StationShared {
    link: Arc<LinkState>,
    store: Arc<TelemetryStore>,
    latest_session: AtomicU64,
    liveness_timeout: Duration,
}

impl StationShared {
    fn is_current(&self, session: u64) -> bool {
        self.latest_session.load(Ordering::SeqCst) == session
    }

    /// Register a new session and move the link to `Connected`.
    ///
    /// A still-connected older session is superseded: the link passes
    /// through `Disconnected` so observers see the handover.
    fn open_session(&self) -> u64 {
        let session = self.latest_session.fetch_add(1, Ordering::SeqCst) + 1;
        self.link.mark_disconnected();
        for to in [ConnectionState::Connecting, ConnectionState::Connected] {
            if let Err(e) = self.link.transition(to) {
                warn!(session, error = %e, "Could not mark mover connected");
            }
        }
        session
    }

    /// Mark the link `Disconnected` unless a newer session took over.
    fn close_session(&self, session: u64) {
        if self.is_current(session) {
            self.link.mark_disconnected();
        } else {
            debug!(session, "Superseded session closed");
        }
    }
}

#[derive(Clone)]
struct AppState {
    shared: Arc<StationShared>,
    cancellation: CancellationToken,
}

/// Ground station server.
///
/// Bind first, then [`start`](Self::start). Binding to port 0 picks a free
/// port; [`local_addr`](Self::local_addr) reports which.
pub struct StationServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    liveness: LivenessWatch,
    shared: Arc<StationShared>,
}

impl StationServer {
    /// Open the listening socket.
    pub async fn bind(
        config: &StationConfig,
        link: Arc<LinkState>,
        store: Arc<TelemetryStore>,
    ) -> Result<Self, StationError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(addr.as_str())
            .await
            .map_err(|source| StationError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StationError::Bind { addr, source })?;

        Ok(Self {
            listener,
            local_addr,
            liveness: LivenessWatch::new(Arc::clone(&link), config.liveness_poll),
            shared: Arc::new(StationShared {
                link,
                store,
                latest_session: AtomicU64::new(0),
                liveness_timeout: config.liveness_timeout,
            }),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn link(&self) -> &Arc<LinkState> {
        &self.shared.link
    }

    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.shared.store
    }

    /// The watch started alongside the server.
    pub fn liveness(&self) -> &LivenessWatch {
        &self.liveness
    }

    /// Serve until `cancellation` fires.
    ///
    /// Also runs the station's [`LivenessWatch`]. On return the link is
    /// `Disconnected`.
    pub fn start(self, cancellation: CancellationToken) -> JoinHandle<Result<(), StationError>> {
        let Self {
            listener,
            local_addr,
            liveness,
            shared,
        } = self;

        tokio::spawn(async move {
            let liveness = liveness.start(cancellation.clone());

            let app = router(AppState {
                shared: Arc::clone(&shared),
                cancellation: cancellation.clone(),
            });

            info!(addr = %local_addr, "Ground station listening");
            let shutdown = cancellation.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
                .map_err(StationError::Serve);

            // Serve can fail without a cancel; make sure the watch stops too.
            cancellation.cancel();
            if let Err(e) = liveness.await {
                warn!(error = %e, "Liveness watch panicked");
            }
            shared.link.mark_disconnected();
            info!("Ground station stopped");
            result
        })
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(WEBSOCKET_PATH, get(websocket_handler))
        .route("/telemetry", get(telemetry))
        .route("/status", get(status))
        .with_state(state)
}

async fn index() -> &'static str {
    "Ground Station is running"
}

async fn telemetry(State(state): State<AppState>) -> Response {
    match state.shared.store.read() {
        Some(record) => Json(record).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(StatusReport {
        link: state.shared.link.current(),
        samples_received: state.shared.store.update_count(),
    })
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

async fn handle_session(mut socket: WebSocket, state: AppState) {
    let AppState {
        shared,
        cancellation,
    } = state;
    let session = shared.open_session();
    info!(session, "Mover connected");

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
            frame = tokio::time::timeout(shared.liveness_timeout, socket.recv()) => {
                if !shared.is_current(session) {
                    info!(session, "Session superseded by a newer connection");
                    break;
                }
                match frame {
                    Err(_) => {
                        warn!(
                            session,
                            timeout_secs = shared.liveness_timeout.as_secs(),
                            "No frame from mover within liveness timeout"
                        );
                        break;
                    }
                    Ok(None) | Ok(Some(Ok(Message::Close(_)))) => {
                        info!(session, "Mover closed the connection");
                        break;
                    }
                    Ok(Some(Err(e))) => {
                        warn!(session, error = %e, "WebSocket receive error");
                        break;
                    }
                    Ok(Some(Ok(Message::Text(text)))) => {
                        handle_frame(text.as_str(), &shared.store);
                    }
                    Ok(Some(Ok(Message::Binary(_)))) => {
                        warn!(session, "Discarding binary frame");
                    }
                    Ok(Some(Ok(_))) => {}
                }
            }
        }
    }

    shared.close_session(session);
}
