//! Error types for the ground station.

use std::io;

use thiserror::Error;

/// Errors that stop the station server.
#[derive(Debug, Error)]
pub enum StationError {
    /// The listening socket could not be opened.
    #[error("Failed to bind station to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The HTTP server failed while running.
    #[error("Station server error: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_message() {
        let err = StationError::Bind {
            addr: "0.0.0.0:6000".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to bind station to 0.0.0.0:6000: address in use"
        );
    }
}
