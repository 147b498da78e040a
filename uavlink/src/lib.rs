//! uavlink - mover/ground-station telemetry link
//!
//! A simulated mover wanders between random waypoints and reports every
//! position step to a ground station over a persistent WebSocket link. The
//! station keeps the latest sample and reports whether a mover is connected.
//!
//! # Components
//!
//! - [`link`]: connection state machine, wire protocol and the mover's
//!   connect/retry loop ([`link::LinkManager`])
//! - [`telemetry`]: the station's latest-sample store
//! - [`mover`]: motion supervisor and motion-and-report loop
//! - [`station`]: WebSocket/HTTP server and liveness watch
//! - [`position`]: samples, waypoint generation and motion math
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use uavlink::link::{LinkManager, RetryPolicy, WebSocketTransport};
//! use uavlink::mover::{MotionConfig, MoverDriver};
//! use uavlink::position::RandomWaypointGenerator;
//!
//! let manager = Arc::new(LinkManager::new(
//!     WebSocketTransport::default(),
//!     "http://localhost:6000",
//!     RetryPolicy::default(),
//! ));
//! let config = MotionConfig::default();
//! let driver = MoverDriver::new(
//!     Arc::clone(&manager),
//!     Arc::clone(manager.state()),
//!     RandomWaypointGenerator::new(config.radius_km),
//!     config,
//! );
//! let link_task = manager.start(cancel.clone());
//! let motion_task = driver.start(cancel.clone());
//! ```

pub mod config;
pub mod link;
pub mod logging;
pub mod mover;
pub mod position;
pub mod station;
pub mod telemetry;

/// Version of the uavlink library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
