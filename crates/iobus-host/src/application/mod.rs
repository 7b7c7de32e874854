//! Application layer use cases for the host.
//!
//! - **`dispatch_event`** – Routes a decoded [`Event`](iobus_core::Event) to
//!   the [`InjectionBackend`] capability.  The actual OS call is made by an
//!   implementation injected at construction time.

pub mod dispatch_event;

pub use dispatch_event::{dispatch, DispatchEventUseCase, InjectionBackend, InjectionError};
