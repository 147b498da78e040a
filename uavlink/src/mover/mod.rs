//! Mover role of the motion/reporting driver.
//!
//! The [`MoverDriver`] follows the link state: each time the link becomes
//! `Connected` it makes sure exactly one motion loop is running. The loop
//! picks a waypoint, walks toward it one tick at a time sending every
//! intermediate position through a [`PositionSink`], dwells on arrival and
//! starts over. While dwelling it keeps re-sending the held position once
//! per step interval so the station's liveness timeout never fires on a
//! healthy mover. A failed write ends the loop and marks the link
//! `Disconnected`; a `NotConnected` rejection ends the loop without touching
//! the state. Either way the link manager's connect loop takes it from there.

mod config;
mod driver;
mod sink;

pub use config::{
    MotionConfig, DEFAULT_DWELL_SECS, DEFAULT_RADIUS_KM, DEFAULT_SPEED_MPS,
    DEFAULT_STEP_INTERVAL_SECS,
};
pub use driver::{MotionExit, MoverDriver};
pub use sink::PositionSink;
