//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use uavlink::config::ConfigFileError;
use uavlink::link::LinkError;
use uavlink::station::StationError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded or written
    Config(ConfigFileError),
    /// Invalid command-line value
    InvalidArgument(String),
    /// Failed to install the Ctrl+C handler
    Signal(String),
    /// Ground station failed
    Station(StationError),
    /// Mover link gave up or hit an internal error
    Link(LinkError),
    /// A background task panicked or was aborted
    Task { name: &'static str, reason: String },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Station(StationError::Bind { .. }) => {
                eprintln!();
                eprintln!("Is another station already running on this port?");
                eprintln!("Pick a different one with --port or in [station] of the config file.");
            }
            CliError::Link(LinkError::RetriesExhausted { .. }) => {
                eprintln!();
                eprintln!("Make sure the ground station is running and reachable,");
                eprintln!("or set [link] max_attempts = 0 to retry forever.");
            }
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Run 'uavlink config path' to find the configuration file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::Station(e) => write!(f, "Ground station error: {}", e),
            CliError::Link(e) => write!(f, "Link error: {}", e),
            CliError::Task { name, reason } => write!(f, "{} task failed: {}", name, reason),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Station(e) => Some(e),
            CliError::Link(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<StationError> for CliError {
    fn from(e: StationError) -> Self {
        CliError::Station(e)
    }
}

impl From<LinkError> for CliError {
    fn from(e: LinkError) -> Self {
        CliError::Link(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_link_error_display_and_source() {
        let err = CliError::from(LinkError::RetriesExhausted { attempts: 3 });
        assert!(err.to_string().starts_with("Link error: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_task_error_display() {
        let err = CliError::Task {
            name: "motion driver",
            reason: "panicked".to_string(),
        };
        assert_eq!(err.to_string(), "motion driver task failed: panicked");
        assert!(err.source().is_none());
    }
}
