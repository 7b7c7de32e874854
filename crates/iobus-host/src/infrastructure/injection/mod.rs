//! Injection backends.
//!
//! The real backend is selected at compile time via `#[cfg(target_os = ...)]`;
//! which one a running host uses is chosen at startup from [`BackendKind`].

pub mod logging;
pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::dispatch_event::{InjectionBackend, InjectionError};

/// Which injection backend the host should run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The native backend on macOS, the logging backend elsewhere.
    #[default]
    Auto,
    /// Log every event and inject nothing.
    Log,
    /// CoreGraphics injection.  macOS only.
    Macos,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Auto => "auto",
            BackendKind::Log => "log",
            BackendKind::Macos => "macos",
        })
    }
}

impl BackendKind {
    /// Resolves `Auto` to the concrete backend for the current OS.
    pub fn resolve(self) -> BackendKind {
        match self {
            BackendKind::Auto if cfg!(target_os = "macos") => BackendKind::Macos,
            BackendKind::Auto => BackendKind::Log,
            other => other,
        }
    }
}

/// Builds the backend named by `kind`.
///
/// # Errors
///
/// Returns [`InjectionError::Unavailable`] when `kind` names a backend this
/// build cannot provide, or any error from the backend's own constructor.
pub fn build_backend(kind: BackendKind) -> Result<Arc<dyn InjectionBackend>, InjectionError> {
    match kind.resolve() {
        BackendKind::Log => Ok(Arc::new(logging::LoggingBackend::new())),
        BackendKind::Macos => build_native(),
        BackendKind::Auto => Err(InjectionError::Unavailable),
    }
}

#[cfg(target_os = "macos")]
fn build_native() -> Result<Arc<dyn InjectionBackend>, InjectionError> {
    Ok(Arc::new(macos::MacosInjectionBackend::new()?))
}

#[cfg(not(target_os = "macos"))]
fn build_native() -> Result<Arc<dyn InjectionBackend>, InjectionError> {
    Err(InjectionError::Unavailable)
}
