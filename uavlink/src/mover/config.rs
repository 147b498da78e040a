//! Motion simulator settings.

use std::time::Duration;

use crate::position::PositionSample;

/// Default waypoint radius (5 km).
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Default ground speed (10 m/s).
pub const DEFAULT_SPEED_MPS: f64 = 10.0;

/// Default time between position reports.
pub const DEFAULT_STEP_INTERVAL_SECS: u64 = 1;

/// Default pause on reaching a waypoint.
pub const DEFAULT_DWELL_SECS: u64 = 60;

/// Configuration for the mover's motion loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Distance of each new waypoint from the current position.
    pub radius_km: f64,

    /// Ground speed in metres per second.
    pub speed_mps: f64,

    /// Simulation tick: one step and one report per interval.
    pub step_interval: Duration,

    /// Pause after reaching a waypoint.
    pub dwell: Duration,

    /// Where the mover starts.
    pub start: PositionSample,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            speed_mps: DEFAULT_SPEED_MPS,
            step_interval: Duration::from_secs(DEFAULT_STEP_INTERVAL_SECS),
            dwell: Duration::from_secs(DEFAULT_DWELL_SECS),
            start: PositionSample::default(),
        }
    }
}
