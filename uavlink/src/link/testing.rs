//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Semaphore};

use super::error::LinkError;
use super::transport::{FrameSink, FrameStream, Transport};

/// The "station" side of an accepted in-memory connection.
pub struct PeerEnd {
    /// Frames written by the manager.
    pub received: mpsc::UnboundedReceiver<String>,
    /// Dropping this closes the manager's read half.
    pub to_manager: mpsc::UnboundedSender<String>,
    /// When set, every write fails.
    pub fail_writes: Arc<AtomicBool>,
}

/// Transport whose connection attempts follow a script.
///
/// Accepted connections are handed to the test through `peers`. Once the
/// script runs out every attempt is refused. A gated transport holds each
/// handshake until the test releases a permit.
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<bool>>>,
    peers: mpsc::UnboundedSender<PeerEnd>,
    gate: Option<Arc<Semaphore>>,
    pub attempts: Arc<AtomicU32>,
}

impl ScriptedTransport {
    /// `script[i]` decides whether attempt `i` is accepted.
    pub fn new(script: Vec<bool>) -> (Self, mpsc::UnboundedReceiver<PeerEnd>) {
        let (peers, peer_rx) = mpsc::unbounded_channel();
        (
            Self {
                script: Arc::new(Mutex::new(script.into())),
                peers,
                gate: None,
                attempts: Arc::new(AtomicU32::new(0)),
            },
            peer_rx,
        )
    }

    /// Hold every handshake until a permit is added to the returned gate.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }
}

pub struct MemorySink {
    tx: mpsc::UnboundedSender<String>,
    fail_writes: Arc<AtomicBool>,
}

impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: String) -> Result<(), LinkError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LinkError::Send("simulated write failure".to_string()));
        }
        self.tx
            .send(text)
            .map_err(|_| LinkError::Send("peer gone".to_string()))
    }

    async fn close(&mut self) {}
}

pub struct MemoryStream {
    rx: mpsc::UnboundedReceiver<String>,
}

impl FrameStream for MemoryStream {
    async fn next_text(&mut self) -> Option<Result<String, LinkError>> {
        self.rx.recv().await.map(Ok)
    }
}

impl Transport for ScriptedTransport {
    type Sink = MemorySink;
    type Stream = MemoryStream;

    async fn connect(&self, url: &str) -> Result<(MemorySink, MemoryStream), LinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let accept = self.script.lock().unwrap().pop_front().unwrap_or(false);
        if !accept {
            return Err(LinkError::Connect {
                url: url.to_string(),
                reason: "refused".to_string(),
            });
        }

        let (to_peer, received) = mpsc::unbounded_channel();
        let (to_manager, from_peer) = mpsc::unbounded_channel();
        let fail_writes = Arc::new(AtomicBool::new(false));
        let _ = self.peers.send(PeerEnd {
            received,
            to_manager,
            fail_writes: Arc::clone(&fail_writes),
        });

        Ok((
            MemorySink {
                tx: to_peer,
                fail_writes,
            },
            MemoryStream { rx: from_peer },
        ))
    }
}
