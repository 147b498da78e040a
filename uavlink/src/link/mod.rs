//! Link layer between mover and station.
//!
//! # Architecture
//!
//! ```text
//! LinkManager (connect loop, send, disconnect)
//!     │
//!     ├── Transport trait → WebSocketTransport (tokio-tungstenite)
//!     │
//!     └── Arc<LinkState> ──▶ on_transition / subscribe / watch
//!                                 │
//!                                 └── MoverDriver, LivenessWatch
//! ```
//!
//! The station side has no manager: its server drives a [`LinkState`]
//! directly from WebSocket session events.

mod error;
mod manager;
mod protocol;
mod retry;
mod state;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use error::LinkError;
pub use manager::LinkManager;
pub use protocol::LinkMessage;
pub use retry::{Backoff, RetryPolicy, DEFAULT_MAX_BACKOFF, DEFAULT_RETRY_DELAY};
pub use state::{ConnectionState, LinkState, Transition};
pub use transport::{
    websocket_url, FrameSink, FrameStream, Transport, WebSocketFrames, WebSocketSink,
    WebSocketTransport, DEFAULT_CONNECT_TIMEOUT, WEBSOCKET_PATH,
};
