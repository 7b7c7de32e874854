//! TCP transport: the accept loop and the per-connection read loop.
//!
//! Messages flow one way only, sender to host.  Nothing is ever written back
//! to a connection; the only write-side operation is the final shutdown.

pub mod connection;
pub mod listener;

use std::fmt;
use std::io;
use std::time::Duration;

use iobus_core::ProtocolError;
use thiserror::Error;
use uuid::Uuid;

use crate::application::dispatch_event::InjectionError;

pub use connection::{handle_connection, ConnectionEnd, ConnectionSummary};
pub use listener::{run_server, HostListener, ListenerError};

/// Why one message was rejected.  The connection survives every variant.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("injection failed: {0}")]
    Injection(#[from] InjectionError),
    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Errors that end a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("no data received for {0:?}")]
    ReadTimeout(Duration),
}

/// Identifies one accepted connection in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocates a fresh random ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn test_rejection_messages_do_not_contain_key_text() {
        // Arrange
        let unsupported = MessageError::from(InjectionError::UnsupportedKey("p4ssw0rd".into()));
        let unknown = MessageError::from(ProtocolError::MalformedEvent(
            iobus_core::DecodeError::UnknownMember {
                field: "modifiers",
                value: "p4ssw0rd".into(),
            },
        ));

        // Act / Assert
        for err in [unsupported, unknown] {
            let message = err.to_string();
            assert!(!message.contains("p4ssw0rd"), "leaked value: {message}");
        }
    }

    #[test]
    fn test_line_too_long_message_names_the_limit() {
        let err = MessageError::LineTooLong { limit: 16 };
        assert_eq!(err.to_string(), "line exceeds 16 bytes");
    }
}
