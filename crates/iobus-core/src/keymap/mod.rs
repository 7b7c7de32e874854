//! Key code translation tables.
//!
//! Keys travel on the wire as names (`"A"`, `"ENTER"`, `"F5"`); modifiers as a
//! [`Modifiers`] set.  Backends translate both to OS-native values at the
//! injection boundary, so the decoder never has to know which keys exist.

pub mod macos_cg;

use crate::protocol::events::Modifiers;

/// Unified key mapper providing all translation directions.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a wire key name to a macOS `CGKeyCode`.
    ///
    /// Matching is case-insensitive.  Returns `None` if the name is unknown.
    pub fn key_to_macos_cgkeycode(name: &str) -> Option<u16> {
        macos_cg::key_name_to_cgkeycode(name)
    }

    /// Translates a modifier set to a macOS `CGEventFlags` mask.
    pub fn modifiers_to_macos_flags(modifiers: Modifiers) -> u64 {
        macos_cg::modifier_flags(modifiers)
    }
}
