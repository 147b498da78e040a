//! Duplex frame transport.
//!
//! The link manager only needs three capabilities from the wire: open a
//! connection, write a text frame, and read the next text frame. They are
//! expressed as traits so the manager can be exercised without sockets; the
//! production implementation is [`WebSocketTransport`].

use std::future::Future;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::error::LinkError;

/// Path the station serves the WebSocket upgrade on.
pub const WEBSOCKET_PATH: &str = "/ws";

/// Default handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Write half of a connection.
pub trait FrameSink: Send + 'static {
    /// Write one text frame.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), LinkError>> + Send;

    /// Close the connection. Errors are ignored; the peer may already be gone.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Read half of a connection.
pub trait FrameStream: Send + 'static {
    /// Next text frame, or `None` once the peer has closed the connection.
    fn next_text(&mut self) -> impl Future<Output = Option<Result<String, LinkError>>> + Send;
}

/// Opens connections to a peer.
pub trait Transport: Send + Sync + 'static {
    type Sink: FrameSink;
    type Stream: FrameStream;

    /// Perform the handshake with the peer at `url`.
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<(Self::Sink, Self::Stream), LinkError>> + Send;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client transport.
///
/// Accepts `http(s)://` or `ws(s)://` addresses; see [`websocket_url`].
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    connect_timeout: Duration,
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl WebSocketTransport {
    /// Create a transport with the given handshake timeout.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Transport for WebSocketTransport {
    type Sink = WebSocketSink;
    type Stream = WebSocketFrames;

    async fn connect(&self, url: &str) -> Result<(WebSocketSink, WebSocketFrames), LinkError> {
        let ws_url = websocket_url(url)?;

        let handshake = tokio_tungstenite::connect_async(ws_url.as_str());
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| LinkError::Connect {
                url: ws_url.clone(),
                reason: format!("handshake timed out after {:?}", self.connect_timeout),
            })?
            .map_err(|e| LinkError::Connect {
                url: ws_url.clone(),
                reason: e.to_string(),
            })?;

        let (sink, stream) = stream.split();
        Ok((WebSocketSink { inner: sink }, WebSocketFrames { inner: stream }))
    }
}

/// Write half of a WebSocket connection.
pub struct WebSocketSink {
    inner: SplitSink<WsStream, Message>,
}

impl FrameSink for WebSocketSink {
    async fn send_text(&mut self, text: String) -> Result<(), LinkError> {
        self.inner
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| LinkError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.inner.close().await;
    }
}

/// Read half of a WebSocket connection.
pub struct WebSocketFrames {
    inner: SplitStream<WsStream>,
}

impl FrameStream for WebSocketFrames {
    async fn next_text(&mut self) -> Option<Result<String, LinkError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                // Control frames are answered by tungstenite; binary is unused.
                Ok(_) => continue,
                Err(e) => return Some(Err(LinkError::Receive(e.to_string()))),
            }
        }
    }
}

/// Map a configured peer address to the WebSocket endpoint.
///
/// `http` becomes `ws` and `https` becomes `wss`. An address without a path
/// (or with just `/`) targets [`WEBSOCKET_PATH`].
pub fn websocket_url(url: &str) -> Result<String, LinkError> {
    let invalid = |reason: &str| LinkError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let (scheme, rest) = url.trim().split_once("://").ok_or_else(|| invalid("missing scheme"))?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("scheme must be http, https, ws or wss")),
    };

    let authority_end = rest.find('/').unwrap_or(rest.len());
    if authority_end == 0 {
        return Err(invalid("missing host"));
    }

    let (authority, path) = rest.split_at(authority_end);
    let path = if path.is_empty() || path == "/" {
        WEBSOCKET_PATH
    } else {
        path
    };

    Ok(format!("{}://{}{}", scheme, authority, path))
}
