//! Configuration file for uavlink.
//!
//! One INI file (`~/.uavlink/config.ini`) covers both roles:
//!
//! - `[station]` listen address and liveness timing
//! - `[mover]` target URL and motion simulator
//! - `[link]` mover reconnect policy
//! - `[logging]` log file location
//!
//! Every key is optional. Settings structs live in [`settings`], constants in
//! [`defaults`], parsing in `parser` and serialization in `writer`.
//!
//! # Example
//!
//! ```
//! use uavlink::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let station = config.station.to_station_config();
//! assert_eq!(station.port, 6000);
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use parser::expand_tilde;
pub use settings::{ConfigFile, LinkSettings, LoggingSettings, MoverSettings, StationSettings};
pub use writer::{path_to_string, to_config_string};
