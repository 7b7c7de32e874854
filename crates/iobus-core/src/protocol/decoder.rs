//! Trust-boundary decoder: untrusted JSON lines → validated [`Event`]s.
//!
//! Decoding happens in two steps:
//!
//! 1. [`decode_line`] parses raw bytes as JSON.  Bytes that are not valid
//!    UTF-8 JSON produce [`ProtocolError::MalformedMessage`].
//! 2. [`decode_event`] resolves the `event_type` tag first and then checks the
//!    fields required by that variant.  Any missing field, unknown enum member,
//!    or wrongly-typed value produces a [`DecodeError`] naming the offending
//!    field.
//!
//! Decoding has no side effects.  The only input besides the message itself is
//! the clock, and only when the sender omitted `timestamp`;
//! [`decode_event_at`] takes that fallback explicitly.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use crate::protocol::events::{
    Event, EventType, KeyAction, KeyboardEvent, Modifier, Modifiers, SystemCommand,
    SystemCommandEvent, TrackpadAction, TrackpadEvent,
};

/// Why a structurally valid JSON message could not become an [`Event`].
///
/// Every variant belongs to the "malformed event" category: the connection
/// that sent it stays open.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    /// The top-level JSON value is an array, string, number, etc.
    #[error("message is not a JSON object")]
    NotAnObject,

    /// A field required by the resolved variant is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// `event_type` is a string but not one of the known tags.
    ///
    /// The rejected value is kept for callers but left out of the message,
    /// since it is sender-supplied text.
    #[error("unknown event_type")]
    UnknownEventType(String),

    /// An enum-valued field holds a name that is not a declared member.
    #[error("field `{field}` has an unknown value")]
    UnknownMember { field: &'static str, value: String },

    /// A numeric field (`timestamp`, `dx`, `dy`) is present but not a number.
    #[error("field `{0}` must be a number")]
    NotNumeric(&'static str),

    /// A field has the wrong JSON type (e.g. `key` is not a string).
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Per-line failures, split into "not JSON" and "JSON but not an event".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("malformed event: {0}")]
    MalformedEvent(#[from] DecodeError),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one wire line (without or with its trailing newline).
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedMessage`] if `line` is not valid JSON and
/// [`ProtocolError::MalformedEvent`] if it is JSON but not a valid event.
///
/// # Examples
///
/// ```rust
/// use iobus_core::protocol::decoder::decode_line;
/// use iobus_core::protocol::events::{Event, SystemCommand};
///
/// let event = decode_line(br#"{"event_type":"SYSTEM","command":"SLEEP"}"#).unwrap();
/// match event {
///     Event::System(e) => assert_eq!(e.command, SystemCommand::Sleep),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn decode_line(line: &[u8]) -> Result<Event, ProtocolError> {
    let raw: Value =
        serde_json::from_slice(line).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))?;
    Ok(decode_event(&raw)?)
}

/// Decodes a parsed JSON message, defaulting `timestamp` to the current time.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode_event(raw: &Value) -> Result<Event, DecodeError> {
    decode_event_at(raw, now_timestamp())
}

/// Decodes a parsed JSON message, using `received_at` when the message has
/// no `timestamp` field.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode_event_at(raw: &Value, received_at: f64) -> Result<Event, DecodeError> {
    let obj = raw.as_object().ok_or(DecodeError::NotAnObject)?;

    let tag = required_str(obj, "event_type")?;
    let event_type =
        EventType::try_from(tag).map_err(|()| DecodeError::UnknownEventType(tag.to_string()))?;

    let timestamp = match obj.get("timestamp") {
        Some(value) => value.as_f64().ok_or(DecodeError::NotNumeric("timestamp"))?,
        None => {
            trace!("timestamp absent; using receipt time");
            received_at
        }
    };

    match event_type {
        EventType::Keyboard => Ok(Event::Keyboard(KeyboardEvent {
            timestamp,
            key: required_str(obj, "key")?.to_string(),
            action: required_member::<KeyAction>(obj, "action")?,
            modifiers: modifiers(obj)?,
        })),
        EventType::Trackpad => Ok(Event::Trackpad(TrackpadEvent {
            timestamp,
            action: required_member::<TrackpadAction>(obj, "action")?,
            dx: optional_f64(obj, "dx")?,
            dy: optional_f64(obj, "dy")?,
        })),
        EventType::System => Ok(Event::System(SystemCommandEvent {
            timestamp,
            command: required_member::<SystemCommand>(obj, "command")?,
        })),
    }
}

/// Current wall-clock time as seconds since the Unix epoch.
pub fn now_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn required_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, DecodeError> {
    obj.get(field)
        .ok_or(DecodeError::MissingField(field))?
        .as_str()
        .ok_or(DecodeError::WrongType {
            field,
            expected: "a string",
        })
}

fn required_member<T>(obj: &Map<String, Value>, field: &'static str) -> Result<T, DecodeError>
where
    T: for<'s> TryFrom<&'s str, Error = ()>,
{
    let name = required_str(obj, field)?;
    T::try_from(name).map_err(|()| DecodeError::UnknownMember {
        field,
        value: name.to_string(),
    })
}

fn optional_f64(obj: &Map<String, Value>, field: &'static str) -> Result<f64, DecodeError> {
    match obj.get(field) {
        Some(value) => value.as_f64().ok_or(DecodeError::NotNumeric(field)),
        None => Ok(0.0),
    }
}

fn modifiers(obj: &Map<String, Value>) -> Result<Modifiers, DecodeError> {
    const FIELD: &str = "modifiers";
    let not_string_array = DecodeError::WrongType {
        field: FIELD,
        expected: "an array of strings",
    };

    let Some(value) = obj.get(FIELD) else {
        return Ok(Modifiers::NONE);
    };
    let items = value.as_array().ok_or_else(|| not_string_array.clone())?;

    let mut set = Modifiers::NONE;
    for item in items {
        let name = item.as_str().ok_or_else(|| not_string_array.clone())?;
        let modifier = Modifier::try_from(name).map_err(|()| DecodeError::UnknownMember {
            field: FIELD,
            value: name.to_string(),
        })?;
        set.insert(modifier);
    }
    Ok(set)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
