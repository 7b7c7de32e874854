//! Host configuration types.
//!
//! [`HostConfig`] is built once at startup and passed by value into the
//! listener.  There is no global configuration; tests build their own.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default TCP port the host listens on.
pub const DEFAULT_PORT: u16 = 8765;

/// Default upper bound on one wire line, newline excluded.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Per-connection resource limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Longest accepted line in bytes, newline excluded.  Longer lines are
    /// discarded and reported; the connection stays open.
    pub max_line_bytes: usize,

    /// How long a connection may stay idle before it is closed.
    ///
    /// `None` means no timeout: a silent peer holds its task suspended until
    /// it disconnects.  This is the default.
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            read_timeout: None,
        }
    }
}

/// All runtime configuration for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Address and port to accept sender connections on.
    pub bind_addr: SocketAddr,
    pub limits: ConnectionLimits,
}

impl Default for HostConfig {
    /// | Field                  | Default        |
    /// |------------------------|----------------|
    /// | bind_addr              | `0.0.0.0:8765` |
    /// | limits.max_line_bytes  | 65536          |
    /// | limits.read_timeout    | none           |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            limits: ConnectionLimits::default(),
        }
    }
}
