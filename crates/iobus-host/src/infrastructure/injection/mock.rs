//! Recording injection backend for tests.
//!
//! The real backends make OS calls that move the cursor or press keys on the
//! test machine and cannot be observed from Rust.  `RecordingBackend` pushes
//! every call into a `Mutex<Vec<...>>` instead, so tests can assert exactly
//! what was injected and in what order.
//!
//! ```ignore
//! let backend = Arc::new(RecordingBackend::new());
//! let dispatcher = DispatchEventUseCase::new(backend.clone());
//!
//! dispatcher.dispatch(event).unwrap();
//!
//! assert_eq!(backend.calls().len(), 1);
//! ```
//!
//! Set `should_fail = true` to make every call return
//! `InjectionError::Platform`, which exercises the per-message error path.

use std::sync::{Mutex, PoisonError};

use iobus_core::protocol::events::{KeyAction, Modifiers, SystemCommand, TrackpadAction};

use crate::application::dispatch_event::{InjectionBackend, InjectionError};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionCall {
    Keyboard {
        key: String,
        action: KeyAction,
        modifiers: Modifiers,
    },
    Trackpad {
        action: TrackpadAction,
        dx: f64,
        dy: f64,
    },
    System(SystemCommand),
}

/// A backend that records all calls without performing OS API calls.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<InjectionCall>>,
    /// When `true`, every method returns `InjectionError::Platform` and
    /// records nothing.
    pub should_fail: bool,
}

impl RecordingBackend {
    /// Creates a backend with no recorded calls and `should_fail = false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<InjectionCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: InjectionCall) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        Ok(())
    }
}

impl InjectionBackend for RecordingBackend {
    fn inject_keyboard(
        &self,
        key: &str,
        action: KeyAction,
        modifiers: Modifiers,
    ) -> Result<(), InjectionError> {
        self.record(InjectionCall::Keyboard {
            key: key.to_string(),
            action,
            modifiers,
        })
    }

    fn inject_trackpad(
        &self,
        action: TrackpadAction,
        dx: f64,
        dy: f64,
    ) -> Result<(), InjectionError> {
        self.record(InjectionCall::Trackpad { action, dx, dy })
    }

    fn handle_system_command(&self, command: SystemCommand) -> Result<(), InjectionError> {
        self.record(InjectionCall::System(command))
    }
}
