//! # iobus-core
//!
//! Shared library for the IOBus input host containing the event model, the
//! JSON line decoder, and key code translation tables.
//!
//! It has zero dependencies on OS APIs, async runtimes, or network sockets.
//!
//! # Architecture overview
//!
//! A remote client drives the host's keyboard, pointer and power state by
//! sending one JSON object per line over TCP.  This crate defines:
//!
//! - **`protocol`** – What a valid event is (`events`), how untrusted bytes
//!   become one (`decoder`), and how to write one back out (`encoder`).
//!   The decoder is the trust boundary: everything downstream only ever sees a
//!   fully validated [`Event`].
//!
//! - **`keymap`** – Translation from wire key names and modifier sets to
//!   macOS virtual key codes and event flag masks.

pub mod keymap;
pub mod protocol;

pub use protocol::decoder::{decode_event, decode_line, DecodeError, ProtocolError};
pub use protocol::encoder::encode_line;
pub use protocol::events::{
    Event, EventType, KeyAction, KeyboardEvent, Modifier, Modifiers, SystemCommand,
    SystemCommandEvent, TrackpadAction, TrackpadEvent,
};
