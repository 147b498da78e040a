//! Flat-earth motion math for the mover simulator.
//!
//! All distances are measured in angular degrees on a lat/lon plane, with
//! kilometres converted through [`KM_PER_DEGREE`]. Good enough for a
//! simulated vehicle wandering a few kilometres around its start point.

use std::time::Duration;

use super::sample::PositionSample;

/// Approximate kilometres per degree of latitude/longitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Horizontal distance (degrees) below which a waypoint counts as reached.
///
/// [`step_toward`] snaps exactly onto the target on the final step, so in
/// practice arrival is detected at distance zero.
pub const ARRIVAL_EPSILON_DEG: f64 = 1e-12;

/// Convert kilometres to angular degrees.
#[inline]
pub fn km_to_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

/// Distance covered in one tick, in degrees, for a ground speed in m/s.
pub fn speed_to_step_deg(speed_mps: f64, tick: Duration) -> f64 {
    speed_mps * tick.as_secs_f64() / (KM_PER_DEGREE * 1000.0)
}

/// Euclidean lat/lon distance in degrees (altitude ignored).
pub fn horizontal_distance_deg(a: &PositionSample, b: &PositionSample) -> f64 {
    let d_lat = b.latitude - a.latitude;
    let d_lon = b.longitude - a.longitude;
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}

/// Waypoint at `radius_km` from `origin` along `bearing_rad`.
///
/// The cosine component displaces latitude and the sine component
/// longitude. Altitude is carried over from the origin.
pub fn generate_waypoint(
    origin: &PositionSample,
    radius_km: f64,
    bearing_rad: f64,
) -> PositionSample {
    let radius_deg = km_to_degrees(radius_km);
    PositionSample::new(
        origin.latitude + radius_deg * bearing_rad.cos(),
        origin.longitude + radius_deg * bearing_rad.sin(),
        origin.altitude,
    )
}

/// Advance `current` toward `target` by at most `step_deg`.
///
/// Never overshoots: when the remaining distance is within one step the
/// target itself is returned, bit for bit. A remaining distance of exactly
/// one step also snaps, since interpolating with a ratio of 1.0 can land a
/// rounding error away from the target.
pub fn step_toward(
    current: &PositionSample,
    target: &PositionSample,
    step_deg: f64,
) -> PositionSample {
    let distance = horizontal_distance_deg(current, target);
    if distance <= step_deg {
        return *target;
    }

    let ratio = step_deg / distance;
    PositionSample::new(
        current.latitude + (target.latitude - current.latitude) * ratio,
        current.longitude + (target.longitude - current.longitude) * ratio,
        current.altitude + (target.altitude - current.altitude) * ratio,
    )
}

/// Returns true once `current` sits on `target`.
pub fn has_arrived(current: &PositionSample, target: &PositionSample) -> bool {
    horizontal_distance_deg(current, target) <= ARRIVAL_EPSILON_DEG
        && (current.altitude - target.altitude).abs() <= ARRIVAL_EPSILON_DEG
}
