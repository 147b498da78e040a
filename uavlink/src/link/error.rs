//! Error types for the mover/station link.

use thiserror::Error;

use super::state::ConnectionState;

/// Errors raised by the link layer.
///
/// Most variants describe expected network conditions and are handled where
/// they occur (retry, drop the frame, downgrade the state). The exceptions are
/// [`LinkError::InvalidTransition`], which signals a bug in the caller, and
/// [`LinkError::RetriesExhausted`], which ends the connect loop by policy.
/// Use [`LinkError::is_transient`] to tell them apart.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The handshake with the peer failed.
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Writing to an established connection failed.
    #[error("Failed to send on link: {0}")]
    Send(String),

    /// Reading from an established connection failed.
    #[error("Failed to receive on link: {0}")]
    Receive(String),

    /// The configured peer address cannot be used.
    #[error("Invalid link URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A send was attempted while the link was not connected.
    #[error("Link is not connected (state: {0})")]
    NotConnected(ConnectionState),

    /// An inbound frame did not have the expected shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// An outbound payload could not be serialized.
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The connect loop gave up after the configured number of attempts.
    #[error("Gave up connecting after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// A state change that the link state machine does not allow.
    #[error("Invalid link transition: {from} -> {to}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
}

impl LinkError {
    /// Returns true for expected network failures that callers recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LinkError::Connect { .. }
                | LinkError::Send(_)
                | LinkError::Receive(_)
                | LinkError::NotConnected(_)
                | LinkError::MalformedPayload(_)
        )
    }
}
