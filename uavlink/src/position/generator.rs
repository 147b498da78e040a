//! Waypoint generators.
//!
//! The driver asks a [`PositionGenerator`] for its next target whenever it
//! starts moving or reaches the previous one. The default
//! [`RandomWaypointGenerator`] picks a uniformly random bearing at a fixed
//! radius.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::motion::generate_waypoint;
use super::sample::PositionSample;

/// Source of successive waypoints for the motion simulator.
pub trait PositionGenerator: Send {
    /// Produce the next target relative to the current position.
    fn next_waypoint(&mut self, current: &PositionSample) -> PositionSample;
}

/// Random waypoints on a circle of fixed radius around the current position.
pub struct RandomWaypointGenerator {
    radius_km: f64,
    rng: StdRng,
}

impl RandomWaypointGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(radius_km: f64) -> Self {
        Self {
            radius_km,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator.
    pub fn with_seed(radius_km: f64, seed: u64) -> Self {
        Self {
            radius_km,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Radius in kilometres.
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }
}

impl PositionGenerator for RandomWaypointGenerator {
    fn next_waypoint(&mut self, current: &PositionSample) -> PositionSample {
        let bearing = self.rng.gen_range(0.0..TAU);
        generate_waypoint(current, self.radius_km, bearing)
    }
}
