//! Ground station role.
//!
//! The station accepts one mover at a time over a WebSocket at `/ws` and
//! drives its [`LinkState`](crate::link::LinkState) from session events.
//! Every valid `position_update` frame lands in the
//! [`TelemetryStore`](crate::telemetry::TelemetryStore); malformed frames are
//! logged and dropped without affecting the session. A [`LivenessWatch`]
//! announces "Waiting for mover..." until a mover connects and again after
//! each disconnect.

mod error;
mod ingest;
mod liveness;
mod server;

pub use error::StationError;
pub use ingest::handle_frame;
pub use liveness::{LivenessWatch, DEFAULT_POLL_INTERVAL};
pub use server::{
    StationConfig, StationServer, StatusReport, DEFAULT_HOST, DEFAULT_LIVENESS_TIMEOUT,
    DEFAULT_PORT,
};
