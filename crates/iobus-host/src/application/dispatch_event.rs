//! DispatchEventUseCase: routes decoded events to the injection backend.
//!
//! This use case sits at the application layer and delegates to an
//! [`InjectionBackend`] trait object for OS-level injection.  The
//! platform-specific implementations are in the infrastructure layer.
//!
//! Dispatch is a single exhaustive `match` over [`Event`]: a new variant that
//! lacks an arm here fails to compile.  The dispatcher does not interpret
//! events (it never looks at key names or deltas); that knowledge belongs to
//! the backend.

use std::sync::Arc;

use iobus_core::protocol::events::{
    Event, KeyAction, KeyboardEvent, Modifiers, SystemCommand, SystemCommandEvent, TrackpadAction,
    TrackpadEvent,
};
use thiserror::Error;

/// Error type for injection operations.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The backend has no key code for this key name.  The name is not part
    /// of the message so typed text stays out of the logs.
    #[error("unsupported key")]
    UnsupportedKey(String),
    #[error("platform error: {0}")]
    Platform(String),
    /// The backend cannot inject on this machine (missing permission, no
    /// session, wrong OS).
    #[error("injection backend unavailable")]
    Unavailable,
}

/// Platform-agnostic injection capability.
///
/// Each supported OS provides an implementation in the infrastructure layer.
/// Calls are synchronous.  One backend instance is shared by every
/// connection; if the OS input queue needs serialised access, the
/// implementation provides it.
#[cfg_attr(test, mockall::automock)]
pub trait InjectionBackend: Send + Sync {
    /// Presses or releases `key` with `modifiers` held.
    fn inject_keyboard(
        &self,
        key: &str,
        action: KeyAction,
        modifiers: Modifiers,
    ) -> Result<(), InjectionError>;

    /// Moves, clicks, or scrolls the pointer.
    fn inject_trackpad(&self, action: TrackpadAction, dx: f64, dy: f64)
        -> Result<(), InjectionError>;

    /// Locks, sleeps, or opens the power dialog.
    fn handle_system_command(&self, command: SystemCommand) -> Result<(), InjectionError>;
}

/// Forwards `event` to the matching backend operation.
///
/// The event is consumed; nothing retains it afterwards.
///
/// # Errors
///
/// Returns whatever [`InjectionError`] the backend reports.
pub fn dispatch(event: Event, backend: &dyn InjectionBackend) -> Result<(), InjectionError> {
    match event {
        Event::Keyboard(KeyboardEvent {
            key,
            action,
            modifiers,
            ..
        }) => backend.inject_keyboard(&key, action, modifiers),
        Event::Trackpad(TrackpadEvent { action, dx, dy, .. }) => {
            backend.inject_trackpad(action, dx, dy)
        }
        Event::System(SystemCommandEvent { command, .. }) => backend.handle_system_command(command),
    }
}

/// The Dispatch Event use case.
///
/// Cheap to clone: every connection task holds its own handle to the shared
/// backend.
#[derive(Clone)]
pub struct DispatchEventUseCase {
    backend: Arc<dyn InjectionBackend>,
}

impl DispatchEventUseCase {
    /// Creates a new use case with the given backend.
    pub fn new(backend: Arc<dyn InjectionBackend>) -> Self {
        Self { backend }
    }

    /// Dispatches one decoded event.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] if the backend fails.
    pub fn dispatch(&self, event: Event) -> Result<(), InjectionError> {
        dispatch(event, self.backend.as_ref())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use iobus_core::protocol::events::Modifier;

    fn keyboard(key: &str, action: KeyAction, modifiers: &[Modifier]) -> Event {
        Event::Keyboard(KeyboardEvent {
            timestamp: 0.0,
            key: key.to_string(),
            action,
            modifiers: modifiers.iter().copied().collect(),
        })
    }

    #[test]
    fn test_keyboard_event_calls_inject_keyboard_only() {
        // Arrange
        let mut backend = MockInjectionBackend::new();
        backend
            .expect_inject_keyboard()
            .withf(|key, action, modifiers| {
                key == "A"
                    && *action == KeyAction::Down
                    && *modifiers == [Modifier::Cmd].into_iter().collect::<Modifiers>()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        backend.expect_inject_trackpad().never();
        backend.expect_handle_system_command().never();

        // Act
        let result = dispatch(keyboard("A", KeyAction::Down, &[Modifier::Cmd]), &backend);

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_trackpad_event_calls_inject_trackpad_with_deltas() {
        let mut backend = MockInjectionBackend::new();
        backend
            .expect_inject_trackpad()
            .withf(|action, dx, dy| *action == TrackpadAction::Scroll && *dx == 1.5 && *dy == -2.0)
            .times(1)
            .returning(|_, _, _| Ok(()));
        backend.expect_inject_keyboard().never();

        let event = Event::Trackpad(TrackpadEvent {
            timestamp: 0.0,
            action: TrackpadAction::Scroll,
            dx: 1.5,
            dy: -2.0,
        });

        assert!(dispatch(event, &backend).is_ok());
    }

    #[test]
    fn test_system_event_calls_handle_system_command() {
        let mut backend = MockInjectionBackend::new();
        backend
            .expect_handle_system_command()
            .withf(|command| *command == SystemCommand::LockScreen)
            .times(1)
            .returning(|_| Ok(()));

        let event = Event::System(SystemCommandEvent {
            timestamp: 0.0,
            command: SystemCommand::LockScreen,
        });

        assert!(dispatch(event, &backend).is_ok());
    }

    #[test]
    fn test_backend_failure_is_returned_to_caller() {
        // Arrange
        let mut backend = MockInjectionBackend::new();
        backend
            .expect_inject_keyboard()
            .returning(|key, _, _| Err(InjectionError::UnsupportedKey(key.to_string())));

        // Act
        let result = dispatch(keyboard("HYPER", KeyAction::Up, &[]), &backend);

        // Assert
        assert!(matches!(result, Err(InjectionError::UnsupportedKey(k)) if k == "HYPER"));
    }

    #[test]
    fn test_use_case_clones_share_one_backend() {
        // Arrange
        let mut backend = MockInjectionBackend::new();
        backend
            .expect_handle_system_command()
            .times(2)
            .returning(|_| Ok(()));
        let use_case = DispatchEventUseCase::new(Arc::new(backend));
        let clone = use_case.clone();
        let sleep = || {
            Event::System(SystemCommandEvent {
                timestamp: 0.0,
                command: SystemCommand::Sleep,
            })
        };

        // Act
        use_case.dispatch(sleep()).unwrap();
        clone.dispatch(sleep()).unwrap();

        // Assert: `times(2)` is verified when the mock is dropped.
    }
}
