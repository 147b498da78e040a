//! Settings structs for each configuration section.
//!
//! Each struct represents one `[section]` of the INI config file, plus the
//! conversion into the runtime type the library consumes.

use std::path::PathBuf;
use std::time::Duration;

use crate::link::{Backoff, RetryPolicy};
use crate::mover::MotionConfig;
use crate::position::PositionSample;
use crate::station::StationConfig;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub station: StationSettings,
    pub mover: MoverSettings,
    pub link: LinkSettings,
    pub logging: LoggingSettings,
}

/// `[station]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSettings {
    pub host: String,
    pub port: u16,
    /// Seconds between "Waiting for mover..." polls.
    pub liveness_poll_secs: u64,
    /// Seconds of silence after which a session is dropped.
    pub liveness_timeout_secs: u64,
}

/// `[mover]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverSettings {
    /// Station URL (`http://` or `ws://`, with or without a path).
    pub url: String,
    pub radius_km: f64,
    pub speed_mps: f64,
    pub step_interval_secs: u64,
    pub dwell_secs: u64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_altitude: f64,
}

/// `[link]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    pub retry_delay_secs: u64,
    /// Consecutive failures before giving up; 0 retries forever.
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub max_backoff_secs: u64,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}

impl StationSettings {
    pub fn to_station_config(&self) -> StationConfig {
        StationConfig {
            host: self.host.clone(),
            port: self.port,
            liveness_poll: Duration::from_secs(self.liveness_poll_secs),
            liveness_timeout: Duration::from_secs(self.liveness_timeout_secs),
        }
    }
}

impl MoverSettings {
    pub fn to_motion_config(&self) -> MotionConfig {
        MotionConfig {
            radius_km: self.radius_km,
            speed_mps: self.speed_mps,
            step_interval: Duration::from_secs(self.step_interval_secs),
            dwell: Duration::from_secs(self.dwell_secs),
            start: PositionSample::new(
                self.start_latitude,
                self.start_longitude,
                self.start_altitude,
            ),
        }
    }
}

impl LinkSettings {
    pub fn to_retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::fixed(Duration::from_secs(self.retry_delay_secs));
        if self.max_attempts > 0 {
            policy = policy.with_max_attempts(self.max_attempts);
        }
        if self.backoff == Backoff::Exponential {
            policy = policy.exponential(Duration::from_secs(self.max_backoff_secs));
        }
        policy
    }
}

impl LoggingSettings {
    /// Directory and file name, as `init_logging` takes them.
    pub fn split(&self) -> (PathBuf, String) {
        let dir = self
            .file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| super::defaults::DEFAULT_LOG_FILE_NAME.to_string());
        (dir, name)
    }
}
