//! The position sample exchanged between mover and station.

use serde::{Deserialize, Serialize};

/// Default mover start position (Ottawa area, 300 m).
pub const DEFAULT_START_LATITUDE: f64 = 45.310245556654614;
pub const DEFAULT_START_LONGITUDE: f64 = -75.91365434011453;
pub const DEFAULT_START_ALTITUDE: f64 = 300.0;

/// A single position report.
///
/// Samples are values: a new sample replaces the previous one wholesale,
/// fields are never patched individually.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// Altitude in metres.
    pub altitude: f64,
}

impl PositionSample {
    /// Create a new sample.
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Returns true if every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite()
    }
}

impl Default for PositionSample {
    fn default() -> Self {
        Self::new(
            DEFAULT_START_LATITUDE,
            DEFAULT_START_LONGITUDE,
            DEFAULT_START_ALTITUDE,
        )
    }
}

impl std::fmt::Display for PositionSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.0}m)",
            self.latitude, self.longitude, self.altitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_start_position() {
        let sample = PositionSample::default();
        assert_eq!(sample.latitude, DEFAULT_START_LATITUDE);
        assert_eq!(sample.longitude, DEFAULT_START_LONGITUDE);
        assert_eq!(sample.altitude, 300.0);
    }

    #[test]
    fn test_deserialize_payload() {
        let json = r#"{"latitude": 45.31, "longitude": -75.91, "altitude": 300}"#;
        let sample: PositionSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample, PositionSample::new(45.31, -75.91, 300.0));
    }

    #[test]
    fn test_deserialize_rejects_missing_field() {
        let json = r#"{"latitude": 45.31, "longitude": -75.91}"#;
        assert!(serde_json::from_str::<PositionSample>(json).is_err());
    }

    #[test]
    fn test_is_finite() {
        assert!(PositionSample::new(1.0, 2.0, 3.0).is_finite());
        assert!(!PositionSample::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!PositionSample::new(1.0, f64::INFINITY, 3.0).is_finite());
    }

    #[test]
    fn test_display() {
        let sample = PositionSample::new(45.31, -75.91, 300.0);
        assert_eq!(sample.to_string(), "(45.310000, -75.910000, 300m)");
    }
}
