//! Link connection state machine.
//!
//! [`LinkState`] is the single owner of the [`ConnectionState`]. Every change
//! goes through [`LinkState::transition`], which validates it against the
//! allowed edges and then notifies subscribers exactly once:
//!
//! ```text
//! Disconnected ──▶ Connecting ──▶ Connected
//!       ▲              │              │
//!       └──────────────┴──────────────┘
//! ```
//!
//! Three ways to observe it:
//! - [`LinkState::on_transition`] - synchronous callbacks, `(from, to)`
//! - [`LinkState::subscribe`] - broadcast stream of [`Transition`]s
//! - [`LinkState::watch`] - latest state, for "wait until connected" loops

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use super::error::LinkError;

/// Capacity of the transition broadcast channel.
const TRANSITION_CHANNEL_CAPACITY: usize = 32;

/// Connection state of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection. Initial state.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Handshake completed; frames can flow.
    Connected,
}

impl ConnectionState {
    /// Returns true if moving from `self` to `to` is a legal edge.
    pub fn can_transition_to(self, to: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, to),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl Transition {
    /// Entered `Connected`.
    pub fn is_connect(&self) -> bool {
        self.to == ConnectionState::Connected
    }

    /// Entered `Disconnected`.
    pub fn is_disconnect(&self) -> bool {
        self.to == ConnectionState::Disconnected
    }
}

type TransitionListener = Box<dyn Fn(Transition) + Send + Sync>;

/// Owner of the link's [`ConnectionState`].
pub struct LinkState {
    state_tx: watch::Sender<ConnectionState>,
    transition_tx: broadcast::Sender<Transition>,
    listeners: Mutex<Vec<TransitionListener>>,
    /// Serializes transitions so notifications are delivered in order.
    transition_lock: Mutex<()>,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkState {
    /// Create a state machine in `Disconnected`.
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (transition_tx, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            state_tx,
            transition_tx,
            listeners: Mutex::new(Vec::new()),
            transition_lock: Mutex::new(()),
        }
    }

    /// Current state.
    pub fn current(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Shorthand for `current() == Connected`.
    pub fn is_connected(&self) -> bool {
        self.current() == ConnectionState::Connected
    }

    /// Move to `to`.
    ///
    /// Returns `Ok(None)` when already in `to` (no event fires) and
    /// `Ok(Some(transition))` after notifying subscribers. Illegal edges are
    /// rejected with [`LinkError::InvalidTransition`] and leave the state
    /// untouched.
    ///
    /// Listeners registered with [`on_transition`](Self::on_transition) run
    /// while the transition lock is held and must not call back into
    /// `transition`.
    pub fn transition(&self, to: ConnectionState) -> Result<Option<Transition>, LinkError> {
        let _guard = self
            .transition_lock
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let from = self.current();
        if from == to {
            return Ok(None);
        }
        if !from.can_transition_to(to) {
            tracing::error!(%from, %to, "Rejected invalid link transition");
            return Err(LinkError::InvalidTransition { from, to });
        }

        self.state_tx.send_replace(to);
        let transition = Transition { from, to };
        tracing::debug!(%from, %to, "Link state changed");

        for listener in self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
        {
            listener(transition);
        }
        // No receivers is fine.
        let _ = self.transition_tx.send(transition);

        Ok(Some(transition))
    }

    /// Move to `Disconnected` from any state.
    ///
    /// Every state may legally disconnect. Should the edge table ever say
    /// otherwise, the rejection is logged and the state is left alone.
    pub fn mark_disconnected(&self) -> Option<Transition> {
        match self.transition(ConnectionState::Disconnected) {
            Ok(transition) => transition,
            Err(e) => {
                tracing::error!(error = %e, "Failed to mark link disconnected");
                None
            }
        }
    }

    /// Register a callback fired once per transition with `(from, to)`.
    pub fn on_transition<F>(&self, listener: F)
    where
        F: Fn(Transition) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(listener));
    }

    /// Subscribe to the stream of transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.transition_tx.subscribe()
    }

    /// Watch the current state.
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Wait until the state equals `target`.
    pub async fn wait_for(&self, target: ConnectionState) {
        let mut rx = self.watch();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|state| *state == target).await;
    }
}
