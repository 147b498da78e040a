//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::link::websocket_url;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [station] section
    if let Some(section) = ini.section(Some("station")) {
        let s = Section::new("station", section);
        if let Some(v) = s.string("host") {
            config.station.host = v;
        }
        if let Some(v) = s.parse("port", "must be a port number (0-65535)")? {
            config.station.port = v;
        }
        if let Some(v) = s.positive_secs("liveness_poll_secs")? {
            config.station.liveness_poll_secs = v;
        }
        if let Some(v) = s.positive_secs("liveness_timeout_secs")? {
            config.station.liveness_timeout_secs = v;
        }
    }

    // [mover] section
    if let Some(section) = ini.section(Some("mover")) {
        let s = Section::new("mover", section);
        if let Some(v) = s.string("url") {
            websocket_url(&v).map_err(|e| s.invalid("url", &v, &e.to_string()))?;
            config.mover.url = v;
        }
        if let Some(v) = s.positive_f64("radius_km")? {
            config.mover.radius_km = v;
        }
        if let Some(v) = s.positive_f64("speed_mps")? {
            config.mover.speed_mps = v;
        }
        if let Some(v) = s.positive_secs("step_interval_secs")? {
            config.mover.step_interval_secs = v;
        }
        if let Some(v) = s.parse("dwell_secs", "must be a non-negative integer (seconds)")? {
            config.mover.dwell_secs = v;
        }
        if let Some(v) = s.ranged_f64("start_latitude", -90.0, 90.0)? {
            config.mover.start_latitude = v;
        }
        if let Some(v) = s.ranged_f64("start_longitude", -180.0, 180.0)? {
            config.mover.start_longitude = v;
        }
        if let Some(v) = s.ranged_f64("start_altitude", f64::MIN, f64::MAX)? {
            config.mover.start_altitude = v;
        }
    }

    // [link] section
    if let Some(section) = ini.section(Some("link")) {
        let s = Section::new("link", section);
        if let Some(v) = s.parse("retry_delay_secs", "must be a non-negative integer (seconds)")? {
            config.link.retry_delay_secs = v;
        }
        if let Some(v) = s.parse("max_attempts", "must be a non-negative integer (0 = unlimited)")? {
            config.link.max_attempts = v;
        }
        if let Some(v) = s.parse("backoff", "must be 'fixed' or 'exponential'")? {
            config.link.backoff = v;
        }
        if let Some(v) = s.positive_secs("max_backoff_secs")? {
            config.link.max_backoff_secs = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Key lookup within one section, producing `InvalidValue` errors that name
/// the section and key.
struct Section<'a> {
    name: &'static str,
    props: &'a Properties,
}

impl<'a> Section<'a> {
    fn new(name: &'static str, props: &'a Properties) -> Self {
        Self { name, props }
    }

    /// Trimmed value; empty counts as unset.
    fn string(&self, key: &str) -> Option<String> {
        self.props
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn invalid(&self, key: &str, value: &str, reason: &str) -> ConfigFileError {
        ConfigFileError::InvalidValue {
            section: self.name.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, key: &str, reason: &str) -> Result<Option<T>, ConfigFileError> {
        match self.string(key) {
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(key, &v, reason)),
            None => Ok(None),
        }
    }

    fn positive_secs(&self, key: &str) -> Result<Option<u64>, ConfigFileError> {
        const REASON: &str = "must be a positive integer (seconds)";
        match self.parse::<u64>(key, REASON)? {
            Some(0) => Err(self.invalid(key, "0", REASON)),
            other => Ok(other),
        }
    }

    fn positive_f64(&self, key: &str) -> Result<Option<f64>, ConfigFileError> {
        const REASON: &str = "must be a positive number";
        match self.parse::<f64>(key, REASON)? {
            Some(v) if !(v.is_finite() && v > 0.0) => {
                Err(self.invalid(key, &v.to_string(), REASON))
            }
            other => Ok(other),
        }
    }

    fn ranged_f64(&self, key: &str, min: f64, max: f64) -> Result<Option<f64>, ConfigFileError> {
        let reason = if min == f64::MIN {
            "must be a finite number".to_string()
        } else {
            format!("must be a number between {} and {}", min, max)
        };
        match self.parse::<f64>(key, &reason)? {
            Some(v) if !(v.is_finite() && (min..=max).contains(&v)) => {
                Err(self.invalid(key, &v.to_string(), &reason))
            }
            other => Ok(other),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
