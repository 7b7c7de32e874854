//! Renders [`Event`]s as wire lines.
//!
//! The host never writes to its connections; this is for senders, tests and
//! benches.  Output is canonical: fields in a fixed order, modifiers in
//! [`Modifier::ALL`](crate::protocol::events::Modifier::ALL) order, and
//! every field of the variant present.

use serde::Serialize;

use crate::protocol::events::Event;

#[derive(Serialize)]
struct WireEvent<'a> {
    event_type: &'static str,
    timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modifiers: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'static str>,
}

impl<'a> From<&'a Event> for WireEvent<'a> {
    fn from(event: &'a Event) -> Self {
        let mut wire = WireEvent {
            event_type: event.event_type().wire_name(),
            timestamp: event.timestamp(),
            key: None,
            action: None,
            modifiers: None,
            dx: None,
            dy: None,
            command: None,
        };
        match event {
            Event::Keyboard(k) => {
                wire.key = Some(&k.key);
                wire.action = Some(k.action.wire_name());
                wire.modifiers = Some(k.modifiers.iter().map(|m| m.wire_name()).collect());
            }
            Event::Trackpad(t) => {
                wire.action = Some(t.action.wire_name());
                wire.dx = Some(t.dx);
                wire.dy = Some(t.dy);
            }
            Event::System(s) => {
                wire.command = Some(s.command.wire_name());
            }
        }
        wire
    }
}

/// Encodes `event` as a single JSON object followed by `'\n'`.
///
/// # Errors
///
/// Returns the underlying `serde_json` error if a delta or timestamp is not
/// finite (JSON has no representation for NaN or infinity).
pub fn encode_line(event: &Event) -> Result<String, serde_json::Error> {
    let wire = WireEvent::from(event);
    if !wire.timestamp.is_finite()
        || !wire.dx.map_or(true, f64::is_finite)
        || !wire.dy.map_or(true, f64::is_finite)
    {
        return Err(serde::ser::Error::custom("non-finite number in event"));
    }
    let mut line = serde_json::to_string(&wire)?;
    line.push('\n');
    Ok(line)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
