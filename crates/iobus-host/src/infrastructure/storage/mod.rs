//! Storage infrastructure: configuration file loading.
//!
//! The host only ever reads its config file; nothing is written back.  A
//! missing file at the default location is not an error, so a fresh machine
//! runs on built-in defaults.

pub mod config;
