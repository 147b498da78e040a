//! CLI runner for common setup.
//!
//! Loads configuration, initializes logging and wires Ctrl+C to a
//! cancellation token so command handlers only deal with their own role.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::info;
use uavlink::config::{config_file_path, ConfigFile};
use uavlink::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Load the config file (default path unless `config_path` is given) and
    /// start logging.
    pub fn new(config_path: Option<&Path>, debug: bool) -> Result<Self, CliError> {
        let config_path = resolve_config_path(config_path);
        let config = ConfigFile::load_from(&config_path)?;

        let (log_dir, log_file) = config.logging.split();
        let logging_guard = init_logging(&log_dir, &log_file, debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("uavlink v{}", uavlink::VERSION);
        info!(
            config = %self.config_path.display(),
            "uavlink CLI: {} command", command
        );
    }

    /// Token cancelled on the first Ctrl+C.
    pub fn shutdown_token(&self) -> Result<CancellationToken, CliError> {
        let token = CancellationToken::new();
        let handler_token = token.clone();

        ctrlc::set_handler(move || {
            if !handler_token.is_cancelled() {
                info!("Shutdown requested");
                handler_token.cancel();
            }
        })
        .map_err(|e| CliError::Signal(e.to_string()))?;

        Ok(token)
    }
}

/// Explicit path if given, otherwise `~/.uavlink/config.ini`.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}
