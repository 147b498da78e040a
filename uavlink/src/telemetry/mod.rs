//! Station-side telemetry store.
//!
//! Holds the single most recent [`TelemetryRecord`]. There is no history:
//! the station reports where the mover is now, not where it has been.

mod store;

pub use store::{TelemetryRecord, TelemetryStore};
