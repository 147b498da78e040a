//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[station]
; Address the ground station listens on
host = {}
port = {}
; Seconds between "Waiting for mover..." messages while no mover is connected
liveness_poll_secs = {}
; Drop a mover session after this many seconds without a frame
liveness_timeout_secs = {}

[mover]
; Ground station address (http/https/ws/wss). Without a path, /ws is used
url = {}
; Distance of each new waypoint from the current position
radius_km = {}
; Ground speed in metres per second
speed_mps = {}
; Seconds between position reports
step_interval_secs = {}
; Seconds to hold position after reaching a waypoint
dwell_secs = {}
; Initial position
start_latitude = {}
start_longitude = {}
start_altitude = {}

[link]
; Seconds to wait after a failed connection attempt
retry_delay_secs = {}
; Consecutive failures before the mover gives up (0 = never)
max_attempts = {}
; Delay growth between failures:
;   fixed       - always retry_delay_secs
;   exponential - doubles each failure, capped at max_backoff_secs
backoff = {}
max_backoff_secs = {}

[logging]
; Log file, truncated at the start of each session
file = {}
"#,
        config.station.host,
        config.station.port,
        config.station.liveness_poll_secs,
        config.station.liveness_timeout_secs,
        config.mover.url,
        config.mover.radius_km,
        config.mover.speed_mps,
        config.mover.step_interval_secs,
        config.mover.dwell_secs,
        config.mover.start_latitude,
        config.mover.start_longitude,
        config.mover.start_altitude,
        config.link.retry_delay_secs,
        config.link.max_attempts,
        config.link.backoff,
        config.link.max_backoff_secs,
        path_to_string(&config.logging.file),
    )
}

/// Display a path, abbreviating the home directory as `~`.
pub fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
