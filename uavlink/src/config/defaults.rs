//! Default values for every configuration key.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::link::Backoff;
use crate::position::{DEFAULT_START_ALTITUDE, DEFAULT_START_LATITUDE, DEFAULT_START_LONGITUDE};

// [station]
pub const DEFAULT_STATION_HOST: &str = "0.0.0.0";
pub const DEFAULT_STATION_PORT: u16 = 6000;
pub const DEFAULT_LIVENESS_POLL_SECS: u64 = 2;
pub const DEFAULT_LIVENESS_TIMEOUT_SECS: u64 = 30;

// [mover]
pub const DEFAULT_MOVER_URL: &str = "http://localhost:6000";
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_SPEED_MPS: f64 = 10.0;
pub const DEFAULT_STEP_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_DWELL_SECS: u64 = 60;

// [link]
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
/// Zero means retry forever.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 0;
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 300;

// [logging]
pub const DEFAULT_LOG_FILE_NAME: &str = "uavlink.log";

/// Default log file (`~/.uavlink/uavlink.log`).
pub fn default_log_file_path() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_STATION_HOST.to_string(),
            port: DEFAULT_STATION_PORT,
            liveness_poll_secs: DEFAULT_LIVENESS_POLL_SECS,
            liveness_timeout_secs: DEFAULT_LIVENESS_TIMEOUT_SECS,
        }
    }
}

impl Default for MoverSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_MOVER_URL.to_string(),
            radius_km: DEFAULT_RADIUS_KM,
            speed_mps: DEFAULT_SPEED_MPS,
            step_interval_secs: DEFAULT_STEP_INTERVAL_SECS,
            dwell_secs: DEFAULT_DWELL_SECS,
            start_latitude: DEFAULT_START_LATITUDE,
            start_longitude: DEFAULT_START_LONGITUDE,
            start_altitude: DEFAULT_START_ALTITUDE,
        }
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Fixed,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file_path(),
        }
    }
}
