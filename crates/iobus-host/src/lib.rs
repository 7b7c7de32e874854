//! iobus-host library crate.
//!
//! Accepts line-delimited JSON input events over TCP and injects them into
//! the local machine.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Sender (one JSON event per line over TCP)
//!         ↓
//! [iobus-host]
//!   ├── domain/            Pure types: HostConfig, ConnectionLimits
//!   ├── application/       Dispatcher and the InjectionBackend capability
//!   └── infrastructure/
//!         ├── network/     Accept loop and per-connection read loop (tokio)
//!         ├── injection/   Recording, logging and CoreGraphics backends
//!         └── storage/     TOML config file
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` and `iobus-core` only.
//! - `infrastructure` depends on all other layers plus `tokio` and the OS.

/// Domain layer: runtime configuration types (no I/O).
pub mod domain;

/// Application layer: event dispatch.
pub mod application;

/// Infrastructure layer: TCP listener, injection backends, config file.
pub mod infrastructure;
