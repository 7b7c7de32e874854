//! Domain layer for iobus-host.
//!
//! Pure configuration types with no I/O, no async, and no framework types.
//! The infrastructure layer populates them from the config file and CLI.

pub mod config;

pub use config::{ConnectionLimits, HostConfig};
