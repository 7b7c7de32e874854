//! Dry-run backend: logs each event and injects nothing.
//!
//! Useful on machines without a native backend and for watching what a sender
//! transmits.  Keys are still looked up in the keymap so an unknown key name
//! fails here exactly as it would on the real backend.

use iobus_core::keymap::KeyMapper;
use iobus_core::protocol::events::{KeyAction, Modifiers, SystemCommand, TrackpadAction};
use tracing::info;

use crate::application::dispatch_event::{InjectionBackend, InjectionError};

/// Injection backend that only writes to the log.
#[derive(Debug, Default)]
pub struct LoggingBackend;

impl LoggingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl InjectionBackend for LoggingBackend {
    fn inject_keyboard(
        &self,
        key: &str,
        action: KeyAction,
        modifiers: Modifiers,
    ) -> Result<(), InjectionError> {
        let keycode = KeyMapper::key_to_macos_cgkeycode(key)
            .ok_or_else(|| InjectionError::UnsupportedKey(key.to_string()))?;
        let modifiers: Vec<&str> = modifiers.iter().map(|m| m.wire_name()).collect();
        info!(
            keycode,
            action = action.wire_name(),
            ?modifiers,
            "keyboard event"
        );
        Ok(())
    }

    fn inject_trackpad(
        &self,
        action: TrackpadAction,
        dx: f64,
        dy: f64,
    ) -> Result<(), InjectionError> {
        info!(action = action.wire_name(), dx, dy, "trackpad event");
        Ok(())
    }

    fn handle_system_command(&self, command: SystemCommand) -> Result<(), InjectionError> {
        info!(command = command.wire_name(), "system command");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iobus_core::protocol::events::Modifier;

    #[test]
    fn test_known_key_is_accepted() {
        let backend = LoggingBackend::new();
        let mods: Modifiers = [Modifier::Shift].into_iter().collect();
        assert!(backend.inject_keyboard("a", KeyAction::Down, mods).is_ok());
    }

    #[test]
    fn test_unknown_key_is_unsupported() {
        // Arrange
        let backend = LoggingBackend::new();

        // Act
        let result = backend.inject_keyboard("NOT_A_KEY", KeyAction::Up, Modifiers::NONE);

        // Assert
        assert!(matches!(result, Err(InjectionError::UnsupportedKey(k)) if k == "NOT_A_KEY"));
    }

    #[test]
    fn test_trackpad_and_system_always_succeed() {
        let backend = LoggingBackend::new();
        assert!(backend
            .inject_trackpad(TrackpadAction::Scroll, -4.0, 12.5)
            .is_ok());
        for command in SystemCommand::ALL {
            assert!(backend.handle_system_command(command).is_ok());
        }
    }
}
