//! Wire key name to macOS CGKeyCode translation table.
//!
//! CGKeyCode values are defined in Carbon Events.h (HIToolbox framework):
//! /System/Library/Frameworks/Carbon.framework/Versions/A/Frameworks/HIToolbox.framework/Headers/Events.h
//!
//! The codes identify physical key positions on an ANSI keyboard, not
//! characters, so `"A"` maps to `kVK_ANSI_A` regardless of the active layout.

use crate::protocol::events::{Modifier, Modifiers};

/// `kCGEventFlagMaskCommand`
pub const FLAG_MASK_COMMAND: u64 = 0x0010_0000;
/// `kCGEventFlagMaskShift`
pub const FLAG_MASK_SHIFT: u64 = 0x0002_0000;
/// `kCGEventFlagMaskControl`
pub const FLAG_MASK_CONTROL: u64 = 0x0004_0000;
/// `kCGEventFlagMaskAlternate`
pub const FLAG_MASK_ALTERNATE: u64 = 0x0008_0000;

/// Virtual key code that opens the power/shutdown dialog.
pub const POWER_KEY: u16 = 0x7F;

/// Translates a wire key name to a macOS `CGKeyCode`.
///
/// Names are matched case-insensitively.  Single printable characters map to
/// the key that produces them unshifted (`"-"`, `"/"`, ...).
pub fn key_name_to_cgkeycode(name: &str) -> Option<u16> {
    let upper = name.to_ascii_uppercase();
    let code = match upper.as_str() {
        // Letters
        "A" => 0x00,
        "S" => 0x01,
        "D" => 0x02,
        "F" => 0x03,
        "H" => 0x04,
        "G" => 0x05,
        "Z" => 0x06,
        "X" => 0x07,
        "C" => 0x08,
        "V" => 0x09,
        "B" => 0x0B,
        "Q" => 0x0C,
        "W" => 0x0D,
        "E" => 0x0E,
        "R" => 0x0F,
        "Y" => 0x10,
        "T" => 0x11,
        "O" => 0x1F,
        "U" => 0x20,
        "I" => 0x22,
        "P" => 0x23,
        "L" => 0x25,
        "J" => 0x26,
        "K" => 0x28,
        "N" => 0x2D,
        "M" => 0x2E,

        // Digits
        "1" => 0x12,
        "2" => 0x13,
        "3" => 0x14,
        "4" => 0x15,
        "6" => 0x16,
        "5" => 0x17,
        "9" => 0x19,
        "7" => 0x1A,
        "8" => 0x1C,
        "0" => 0x1D,

        // Punctuation
        "=" | "EQUAL" => 0x18,
        "-" | "MINUS" => 0x1B,
        "]" | "RIGHT_BRACKET" => 0x1E,
        "[" | "LEFT_BRACKET" => 0x21,
        "'" | "QUOTE" => 0x27,
        ";" | "SEMICOLON" => 0x29,
        "\\" | "BACKSLASH" => 0x2A,
        "," | "COMMA" => 0x2B,
        "/" | "SLASH" => 0x2C,
        "." | "PERIOD" => 0x2F,
        "`" | "GRAVE" => 0x32,

        // Control keys
        "ENTER" | "RETURN" => 0x24,
        "TAB" => 0x30,
        "SPACE" => 0x31,
        "BACKSPACE" | "DELETE" => 0x33, // kVK_Delete
        "ESCAPE" | "ESC" => 0x35,
        "CAPS_LOCK" => 0x39,
        "FORWARD_DELETE" => 0x75,
        "HOME" => 0x73,
        "END" => 0x77,
        "PAGE_UP" => 0x74,
        "PAGE_DOWN" => 0x79,

        // Arrows
        "LEFT" => 0x7B,
        "RIGHT" => 0x7C,
        "DOWN" => 0x7D,
        "UP" => 0x7E,

        // Modifier keys pressed on their own
        "CMD" => 0x37,
        "SHIFT" => 0x38,
        "ALT" => 0x3A,
        "CTRL" => 0x3B,

        // Function keys
        "F1" => 0x7A,
        "F2" => 0x78,
        "F3" => 0x63,
        "F4" => 0x76,
        "F5" => 0x60,
        "F6" => 0x61,
        "F7" => 0x62,
        "F8" => 0x64,
        "F9" => 0x65,
        "F10" => 0x6D,
        "F11" => 0x67,
        "F12" => 0x6F,

        _ => return None,
    };
    Some(code)
}

/// Returns the `CGEventFlags` mask for a modifier set.
pub fn modifier_flags(modifiers: Modifiers) -> u64 {
    modifiers
        .iter()
        .map(|m| match m {
            Modifier::Cmd => FLAG_MASK_COMMAND,
            Modifier::Shift => FLAG_MASK_SHIFT,
            Modifier::Ctrl => FLAG_MASK_CONTROL,
            Modifier::Alt => FLAG_MASK_ALTERNATE,
        })
        .fold(0, |acc, flag| acc | flag)
}
