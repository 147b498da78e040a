//! Mover position model.
//!
//! Everything the motion simulator needs to produce a stream of position
//! samples:
//!
//! - [`PositionSample`] - immutable latitude/longitude/altitude value
//! - [`motion`] - waypoint generation and linear stepping toward a target
//! - [`PositionGenerator`] - pluggable source of waypoints
//! - [`SharedPosition`] - synchronized holder of the mover's current position
//!
//! The motion model is illustrative, not navigation-grade: degrees are
//! converted to kilometres with a flat 1° ≈ 111 km approximation.

mod generator;
pub mod motion;
mod sample;
mod shared;

pub use generator::{PositionGenerator, RandomWaypointGenerator};
pub use motion::{
    generate_waypoint, has_arrived, horizontal_distance_deg, km_to_degrees, speed_to_step_deg,
    step_toward, ARRIVAL_EPSILON_DEG, KM_PER_DEGREE,
};
pub use sample::{
    PositionSample, DEFAULT_START_ALTITUDE, DEFAULT_START_LATITUDE, DEFAULT_START_LONGITUDE,
};
pub use shared::SharedPosition;
