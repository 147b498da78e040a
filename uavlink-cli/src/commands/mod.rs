//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration file (path, show, init)
//! - [`mover`] - Simulated mover reporting to a station
//! - [`station`] - Ground station receiving reports

pub mod common;
pub mod config;
pub mod mover;
pub mod station;
