//! Integration tests for the iobus-core decoder.
//!
//! These tests drive the public API the way the host does: raw bytes in,
//! validated events or categorised errors out.

use iobus_core::{
    decode_line,
    protocol::{decode_event_at, now_timestamp},
    DecodeError, Event, KeyAction, KeyboardEvent, Modifier, ProtocolError, SystemCommand,
    SystemCommandEvent, TrackpadAction, TrackpadEvent,
};
use serde_json::json;

/// Lines that are missing exactly one field required by their variant.
const MISSING_REQUIRED: &[(&str, &str)] = &[
    (r#"{"event_type":"KEYBOARD","action":"DOWN"}"#, "key"),
    (r#"{"event_type":"KEYBOARD","key":"A"}"#, "action"),
    (r#"{"event_type":"TRACKPAD","dx":1.0}"#, "action"),
    (r#"{"event_type":"SYSTEM"}"#, "command"),
    (r#"{"key":"A","action":"DOWN"}"#, "event_type"),
];

/// Lines whose enum-valued fields name a member that does not exist.
const UNKNOWN_MEMBERS: &[&str] = &[
    r#"{"event_type":"MOUSE","action":"MOVE"}"#,
    r#"{"event_type":"KEYBOARD","key":"A","action":"PRESS"}"#,
    r#"{"event_type":"KEYBOARD","key":"A","action":"DOWN","modifiers":["META"]}"#,
    r#"{"event_type":"TRACKPAD","action":"RIGHT_CLICK"}"#,
    r#"{"event_type":"SYSTEM","command":"RESTART"}"#,
    r#"{"event_type":"system","command":"SLEEP"}"#,
];

#[test]
fn test_keyboard_line_decodes_to_matching_event() {
    let event =
        decode_line(br#"{"event_type":"KEYBOARD","key":"A","action":"DOWN","modifiers":["CMD"],"timestamp":5.0}"#)
            .expect("valid keyboard line");

    assert_eq!(
        event,
        Event::Keyboard(KeyboardEvent {
            timestamp: 5.0,
            key: "A".to_string(),
            action: KeyAction::Down,
            modifiers: [Modifier::Cmd].into_iter().collect(),
        })
    );
}

#[test]
fn test_trackpad_line_decodes_to_matching_event() {
    let event = decode_line(br#"{"event_type":"TRACKPAD","action":"SCROLL","dx":1.5,"dy":-2.0,"timestamp":7.0}"#)
        .expect("valid trackpad line");

    assert_eq!(
        event,
        Event::Trackpad(TrackpadEvent {
            timestamp: 7.0,
            action: TrackpadAction::Scroll,
            dx: 1.5,
            dy: -2.0,
        })
    );
}

#[test]
fn test_system_line_decodes_to_matching_event() {
    let event = decode_line(br#"{"event_type":"SYSTEM","command":"LOCK_SCREEN","timestamp":9.0}"#)
        .expect("valid system line");

    assert_eq!(
        event,
        Event::System(SystemCommandEvent {
            timestamp: 9.0,
            command: SystemCommand::LockScreen,
        })
    );
}

#[test]
fn test_defaulted_timestamp_is_close_to_decode_time() {
    // Arrange
    let before = now_timestamp();

    // Act
    let event = decode_line(br#"{"event_type":"TRACKPAD","action":"MOVE"}"#).unwrap();
    let after = now_timestamp();

    // Assert
    assert!(event.timestamp() >= before && event.timestamp() <= after);
}

#[test]
fn test_missing_required_fields_are_malformed_events_only() {
    for (line, field) in MISSING_REQUIRED {
        let err = decode_line(line.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MalformedEvent(DecodeError::MissingField(*field)),
            "line: {line}"
        );
    }
}

#[test]
fn test_unknown_enum_members_are_never_coerced() {
    for line in UNKNOWN_MEMBERS {
        let err = decode_line(line.as_bytes()).unwrap_err();
        assert!(
            matches!(
                err,
                ProtocolError::MalformedEvent(
                    DecodeError::UnknownMember { .. } | DecodeError::UnknownEventType(_)
                )
            ),
            "line {line} gave {err:?}"
        );
    }
}

#[test]
fn test_decoding_same_message_twice_yields_equal_events() {
    // Arrange: no timestamp, so both decodes share an explicit receipt time.
    let raw = json!({"event_type": "KEYBOARD", "key": "Q", "action": "UP", "modifiers": ["ALT", "CTRL"]});

    // Act
    let first = decode_event_at(&raw, 100.0).unwrap();
    let second = decode_event_at(&raw, 100.0).unwrap();

    // Assert
    assert_eq!(first, second);
}

#[test]
fn test_decoding_same_message_twice_differs_only_in_defaulted_timestamp() {
    let line = br#"{"event_type":"TRACKPAD","action":"CLICK_UP","dx":2.0}"#;

    let (Event::Trackpad(a), Event::Trackpad(b)) = (decode_line(line).unwrap(), decode_line(line).unwrap())
    else {
        panic!("expected trackpad events");
    };

    assert_eq!((a.action, a.dx, a.dy), (b.action, b.dx, b.dy));
}

#[test]
fn test_garbage_bytes_are_malformed_messages() {
    for line in [&b"hello"[..], &b"{"[..], &b""[..], &b"\"KEYBOARD"[..]] {
        assert!(matches!(
            decode_line(line),
            Err(ProtocolError::MalformedMessage(_))
        ));
    }
}
