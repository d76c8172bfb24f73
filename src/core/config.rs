//! Persistent user configuration.
//!
//! The config file only holds endpoint overrides; chat sessions themselves are
//! never written to disk.

pub mod data;
pub mod io;


pub use data::{Config, ConfigKey};
pub use io::ConfigError;
