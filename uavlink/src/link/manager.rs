//! Link manager - owns the mover's single duplex connection.
//!
//! # Lifecycle
//!
//! [`LinkManager::start`] spawns the connect loop:
//!
//! 1. `Disconnected → Connecting`, attempt the handshake.
//! 2. On success `→ Connected`; the manager then drains the read half until
//!    the peer closes, a read fails, or a failed [`send`](LinkManager::send)
//!    downgrades the state. The next handshake starts immediately.
//! 3. On failure `→ Disconnected`, wait per [`RetryPolicy`], go to 1.
//!
//! Connection failures never end the loop unless the policy's attempt limit
//! is reached. Cancellation closes the connection and returns `Ok(())`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::error::LinkError;
use super::protocol::LinkMessage;
use super::retry::RetryPolicy;
use super::state::{ConnectionState, LinkState};
use super::transport::{FrameSink, FrameStream, Transport};

/// Manages one connection to a fixed peer address.
pub struct LinkManager<T: Transport> {
    transport: T,
    url: String,
    retry: RetryPolicy,
    state: Arc<LinkState>,
    /// Write half of the current connection, if any.
    sink: Mutex<Option<T::Sink>>,
    messages_sent: AtomicU64,
}

impl<T: Transport> LinkManager<T> {
    /// Create a manager with its own state machine.
    pub fn new(transport: T, url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self::with_state(transport, url, retry, Arc::new(LinkState::new()))
    }

    /// Create a manager driving an existing state machine.
    pub fn with_state(
        transport: T,
        url: impl Into<String>,
        retry: RetryPolicy,
        state: Arc<LinkState>,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            retry,
            state,
            sink: Mutex::new(None),
            messages_sent: AtomicU64::new(0),
        }
    }

    /// The link state machine.
    pub fn state(&self) -> &Arc<LinkState> {
        &self.state
    }

    /// Peer address.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of frames written successfully.
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    /// Start the connect loop as an async task.
    pub fn start(
        self: &Arc<Self>,
        cancellation: CancellationToken,
    ) -> JoinHandle<Result<(), LinkError>> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.run(cancellation).await })
    }

    /// Attempt one handshake.
    ///
    /// On success the link is `Connected` and the read half is returned; the
    /// caller must keep draining it (see [`watch_session`](Self::watch_session))
    /// or peer disconnects go unnoticed. On failure the link is back in
    /// `Disconnected`.
    ///
    /// If the link was knocked out of `Connecting` while the handshake was in
    /// flight, the new connection is closed and the attempt fails with a
    /// retryable [`LinkError::Connect`].
    pub async fn connect(&self) -> Result<T::Stream, LinkError> {
        self.state.transition(ConnectionState::Connecting)?;

        match self.transport.connect(&self.url).await {
            Ok((sink, stream)) => {
                let mut guard = self.sink.lock().await;
                *guard = Some(sink);
                if let Err(e) = self.state.transition(ConnectionState::Connected) {
                    let stale = guard.take();
                    drop(guard);
                    if let Some(mut sink) = stale {
                        sink.close().await;
                    }
                    self.state.mark_disconnected();
                    warn!(
                        error = %e,
                        "Link state changed during handshake, discarding connection"
                    );
                    return Err(LinkError::Connect {
                        url: self.url.clone(),
                        reason: "link state changed during handshake".to_string(),
                    });
                }
                Ok(stream)
            }
            Err(e) => {
                self.state.mark_disconnected();
                Err(e)
            }
        }
    }

    /// Send one message to the peer.
    ///
    /// Fails with [`LinkError::NotConnected`] unless the link is
    /// `Connected`. A write failure drops the connection and moves the link
    /// to `Disconnected` before the error is returned.
    pub async fn send(&self, message: &LinkMessage) -> Result<(), LinkError> {
        let state = self.state.current();
        if state != ConnectionState::Connected {
            return Err(LinkError::NotConnected(state));
        }

        let text = message.encode()?;
        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            return Err(LinkError::NotConnected(self.state.current()));
        };

        match sink.send_text(text).await {
            Ok(()) => {
                self.messages_sent.fetch_add(1, Ordering::Relaxed);
                trace!(event = message.event_name(), "Frame sent");
                Ok(())
            }
            Err(e) => {
                guard.take();
                drop(guard);
                if self.state.mark_disconnected().is_some() {
                    warn!(error = %e, "Send failed, link marked disconnected");
                }
                Err(e)
            }
        }
    }

    /// Close the connection, if any, and move to `Disconnected`.
    ///
    /// Safe to call repeatedly.
    pub async fn disconnect(&self) {
        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            sink.close().await;
        }
        if self.state.mark_disconnected().is_some() {
            info!(url = %self.url, "Disconnected from station");
        }
    }

    /// Drain the read half until the session ends.
    ///
    /// Returns when the peer closes, a read fails, a send failure has already
    /// downgraded the link, or `cancellation` fires. In the first two cases
    /// the link is moved to `Disconnected` here.
    pub async fn watch_session(&self, mut stream: T::Stream, cancellation: &CancellationToken) {
        let mut state_rx = self.state.watch();

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => return,
                changed = state_rx.changed() => {
                    let state = *state_rx.borrow_and_update();
                    if changed.is_err() || state != ConnectionState::Connected {
                        debug!(%state, "Session ended by local state change");
                        return;
                    }
                }
                frame = stream.next_text() => match frame {
                    Some(Ok(text)) => {
                        trace!(len = text.len(), "Ignoring inbound frame");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Link read failed");
                        break;
                    }
                    None => break,
                },
            }
        }

        self.sink.lock().await.take();
        if self.state.mark_disconnected().is_some() {
            info!(url = %self.url, "Station closed the connection");
        }
    }

    /// The connect loop.
    async fn run(&self, cancellation: CancellationToken) -> Result<(), LinkError> {
        info!(
            url = %self.url,
            retry_delay_secs = self.retry.initial_delay.as_secs_f64(),
            max_attempts = ?self.retry.max_attempts,
            "Link manager started"
        );

        let mut consecutive_failures: u32 = 0;

        let result = loop {
            if cancellation.is_cancelled() {
                break Ok(());
            }

            let attempt = tokio::select! {
                _ = cancellation.cancelled() => break Ok(()),
                attempt = self.connect() => attempt,
            };

            match attempt {
                Ok(stream) => {
                    consecutive_failures = 0;
                    info!(url = %self.url, "Connected to station");
                    self.watch_session(stream, &cancellation).await;
                }
                Err(e) if e.is_transient() => {
                    consecutive_failures += 1;
                    if self.retry.is_exhausted(consecutive_failures) {
                        warn!(
                            error = %e,
                            attempts = consecutive_failures,
                            "Giving up connecting to station"
                        );
                        break Err(LinkError::RetriesExhausted {
                            attempts: consecutive_failures,
                        });
                    }

                    let delay = self.retry.delay_for(consecutive_failures);
                    warn!(
                        error = %e,
                        consecutive_failures,
                        retry_in_secs = delay.as_secs_f64(),
                        "Failed to connect to station, retrying"
                    );

                    tokio::select! {
                        _ = cancellation.cancelled() => break Ok(()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => break Err(e),
            }
        };

        self.disconnect().await;
        info!("Link manager stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::testing::ScriptedTransport;
    use crate::position::PositionSample;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const URL: &str = "http://localhost:6000";

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_millis(10))
    }

    fn sample() -> LinkMessage {
        LinkMessage::PositionUpdate(PositionSample::new(45.31, -75.91, 300.0))
    }

    #[tokio::test]
    async fn test_send_while_disconnected_fails() {
        let (transport, _peers) = ScriptedTransport::new(vec![]);
        let manager = LinkManager::new(transport, URL, fast_retry());

        let err = manager.send(&sample()).await.unwrap_err();
        assert!(matches!(
            err,
            LinkError::NotConnected(ConnectionState::Disconnected)
        ));
        assert!(err.is_transient());
        assert_eq!(manager.messages_sent(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_disconnected() {
        let (transport, _peers) = ScriptedTransport::new(vec![false]);
        let manager = LinkManager::new(transport, URL, fast_retry());

        let err = manager.connect().await.err().unwrap();
        assert!(matches!(err, LinkError::Connect { .. }));
        assert_eq!(manager.state().current(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_and_send() {
        let (transport, mut peers) = ScriptedTransport::new(vec![true]);
        let manager = LinkManager::new(transport, URL, fast_retry());

        let _stream = manager.connect().await.unwrap();
        assert!(manager.state().is_connected());

        manager.send(&sample()).await.unwrap();
        let mut peer = peers.recv().await.unwrap();
        let frame = peer.received.recv().await.unwrap();
        assert_eq!(LinkMessage::decode(&frame).unwrap(), sample());
        assert_eq!(manager.messages_sent(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_marks_disconnected() {
        let (transport, mut peers) = ScriptedTransport::new(vec![true]);
        let manager = LinkManager::new(transport, URL, fast_retry());
        let mut transitions = manager.state().subscribe();

        let _stream = manager.connect().await.unwrap();
        let peer = peers.recv().await.unwrap();
        peer.fail_writes.store(true, Ordering::SeqCst);

        let err = manager.send(&sample()).await.unwrap_err();
        assert!(matches!(err, LinkError::Send(_)));
        assert_eq!(manager.state().current(), ConnectionState::Disconnected);

        // Connecting, Connected, Disconnected - each exactly once
        assert_eq!(transitions.recv().await.unwrap().to, ConnectionState::Connecting);
        assert!(transitions.recv().await.unwrap().is_connect());
        assert!(transitions.recv().await.unwrap().is_disconnect());
        assert!(transitions.try_recv().is_err());

        // Subsequent sends are rejected up front
        assert!(matches!(
            manager.send(&sample()).await,
            Err(LinkError::NotConnected(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (transport, _peers) = ScriptedTransport::new(vec![true]);
        let manager = LinkManager::new(transport, URL, fast_retry());
        let mut transitions = manager.state().subscribe();

        let _stream = manager.connect().await.unwrap();
        manager.disconnect().await;
        manager.disconnect().await;

        assert_eq!(manager.state().current(), ConnectionState::Disconnected);
        let mut disconnects = 0;
        while let Ok(t) = transitions.try_recv() {
            if t.is_disconnect() {
                disconnects += 1;
            }
        }
        assert_eq!(disconnects, 1);
    }

    #[tokio::test]
    async fn test_run_retries_until_connected() {
        let (transport, mut peers) = ScriptedTransport::new(vec![false, false, true]);
        let attempts = Arc::clone(&transport.attempts);
        let manager = Arc::new(LinkManager::new(transport, URL, fast_retry()));
        let cancellation = CancellationToken::new();

        let handle = manager.start(cancellation.clone());

        tokio::time::timeout(
            Duration::from_secs(2),
            manager.state().wait_for(ConnectionState::Connected),
        )
        .await
        .expect("should connect on third attempt");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        let _peer = peers.recv().await.unwrap();

        cancellation.cancel();
        handle.await.unwrap().unwrap();
        assert_eq!(manager.state().current(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_run_reconnects_after_peer_close() {
        let (transport, mut peers) = ScriptedTransport::new(vec![true, true]);
        let manager = Arc::new(LinkManager::new(transport, URL, fast_retry()));
        let mut transitions = manager.state().subscribe();
        let cancellation = CancellationToken::new();
        let handle = manager.start(cancellation.clone());

        let first = peers.recv().await.unwrap();
        drop(first); // peer closes

        let second = tokio::time::timeout(Duration::from_secs(2), peers.recv())
            .await
            .expect("should reconnect")
            .unwrap();
        manager.state().wait_for(ConnectionState::Connected).await;

        // A disconnect is recorded before the second connect.
        let mut seen = Vec::new();
        while let Ok(t) = transitions.try_recv() {
            seen.push(t.to);
        }
        assert_eq!(
            seen,
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Disconnected,
                ConnectionState::Connecting,
                ConnectionState::Connected,
            ]
        );

        cancellation.cancel();
        handle.await.unwrap().unwrap();
        drop(second);
    }

    #[tokio::test]
    async fn test_disconnect_during_handshake_is_retried() {
        let (transport, mut peers) = ScriptedTransport::new(vec![true, true]);
        let (transport, gate) = transport.gated();
        let attempts = Arc::clone(&transport.attempts);
        let manager = Arc::new(LinkManager::new(transport, URL, fast_retry()));
        let cancellation = CancellationToken::new();
        let handle = manager.start(cancellation.clone());

        manager.state().wait_for(ConnectionState::Connecting).await;
        let err = manager.send(&sample()).await.unwrap_err();
        assert!(matches!(
            err,
            LinkError::NotConnected(ConnectionState::Connecting)
        ));

        // Something downgrades the link while the handshake is in flight.
        manager.state().mark_disconnected();
        gate.add_permits(2);

        tokio::time::timeout(
            Duration::from_secs(2),
            manager.state().wait_for(ConnectionState::Connected),
        )
        .await
        .expect("the next attempt should connect");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(!handle.is_finished());

        // The discarded connection was handed out first; the live one second.
        let _stale = peers.recv().await.unwrap();
        let mut live = peers.recv().await.unwrap();
        manager.send(&sample()).await.unwrap();
        assert_eq!(
            LinkMessage::decode(&live.received.recv().await.unwrap()).unwrap(),
            sample()
        );

        cancellation.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_run_gives_up_after_max_attempts() {
        let (transport, _peers) = ScriptedTransport::new(vec![]);
        let manager = Arc::new(LinkManager::new(
            transport,
            URL,
            fast_retry().with_max_attempts(3),
        ));

        let result = manager.start(CancellationToken::new()).await.unwrap();
        assert!(matches!(
            result,
            Err(LinkError::RetriesExhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_run_stops_promptly_while_waiting_to_retry() {
        let (transport, _peers) = ScriptedTransport::new(vec![]);
        let manager = Arc::new(LinkManager::new(
            transport,
            URL,
            RetryPolicy::fixed(Duration::from_secs(3600)),
        ));
        let cancellation = CancellationToken::new();
        let handle = manager.start(cancellation.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancellation.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancellation should interrupt the retry sleep")
            .unwrap();
        assert!(result.is_ok());
    }
}
