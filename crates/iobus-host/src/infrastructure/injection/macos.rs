//! macOS CoreGraphics injection backend.
//!
//! Every event is posted at the HID tap (`CGEventTapLocation::HID`), the same
//! level as physical keyboard and pointer input.  A fresh
//! `CGEventSource` in `HIDSystemState` is created per call so injected events
//! pick up the live hardware modifier state.
//!
//! # Accessibility permission
//!
//! Posting at the HID tap requires the **Accessibility** permission
//! (System Settings → Privacy & Security → Accessibility).  Without it macOS
//! drops the events silently; nothing here can detect that.
//!
//! # Pointer coordinates
//!
//! `MOVE` is relative: the new position is the current cursor location plus
//! `(dx, dy)` in global display coordinates, so no screen-size lookup is
//! needed.  Clicks land wherever the cursor currently is.

#![cfg(target_os = "macos")]

use std::process::Command;

use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTapLocation, CGEventType, CGMouseButton, ScrollEventUnit,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use iobus_core::keymap::macos_cg::{FLAG_MASK_COMMAND, FLAG_MASK_CONTROL, POWER_KEY};
use iobus_core::keymap::KeyMapper;
use iobus_core::protocol::events::{KeyAction, Modifiers, SystemCommand, TrackpadAction};
use tracing::debug;

use crate::application::dispatch_event::{InjectionBackend, InjectionError};

/// CoreGraphics event poster.
pub struct MacosInjectionBackend;

impl MacosInjectionBackend {
    /// Creates the backend after checking an event source can be obtained.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Unavailable`] when CoreGraphics refuses to
    /// create an event source (no window server session).
    pub fn new() -> Result<Self, InjectionError> {
        source()?;
        Ok(Self)
    }

    fn post_key(&self, keycode: u16, key_down: bool, flags: u64) -> Result<(), InjectionError> {
        let event = CGEvent::new_keyboard_event(source()?, keycode, key_down)
            .map_err(|()| platform("CGEventCreateKeyboardEvent"))?;
        event.set_flags(CGEventFlags::from_bits_truncate(flags));
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    /// Posts a full press and release of `keycode` with `flags` held.
    fn tap_key(&self, keycode: u16, flags: u64) -> Result<(), InjectionError> {
        self.post_key(keycode, true, flags)?;
        self.post_key(keycode, false, flags)
    }

    fn post_mouse(&self, kind: CGEventType, position: CGPoint) -> Result<(), InjectionError> {
        let event = CGEvent::new_mouse_event(source()?, kind, position, CGMouseButton::Left)
            .map_err(|()| platform("CGEventCreateMouseEvent"))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

fn source() -> Result<CGEventSource, InjectionError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|()| InjectionError::Unavailable)
}

fn platform(call: &str) -> InjectionError {
    InjectionError::Platform(format!("{call} returned null"))
}

fn cursor_location() -> Result<CGPoint, InjectionError> {
    let event = CGEvent::new(source()?).map_err(|()| platform("CGEventCreate"))?;
    Ok(event.location())
}

impl InjectionBackend for MacosInjectionBackend {
    fn inject_keyboard(
        &self,
        key: &str,
        action: KeyAction,
        modifiers: Modifiers,
    ) -> Result<(), InjectionError> {
        let keycode = KeyMapper::key_to_macos_cgkeycode(key)
            .ok_or_else(|| InjectionError::UnsupportedKey(key.to_string()))?;
        let flags = KeyMapper::modifiers_to_macos_flags(modifiers);
        self.post_key(keycode, action == KeyAction::Down, flags)
    }

    fn inject_trackpad(
        &self,
        action: TrackpadAction,
        dx: f64,
        dy: f64,
    ) -> Result<(), InjectionError> {
        match action {
            TrackpadAction::Move => {
                let here = cursor_location()?;
                self.post_mouse(
                    CGEventType::MouseMoved,
                    CGPoint::new(here.x + dx, here.y + dy),
                )
            }
            TrackpadAction::ClickDown => {
                self.post_mouse(CGEventType::LeftMouseDown, cursor_location()?)
            }
            TrackpadAction::ClickUp => self.post_mouse(CGEventType::LeftMouseUp, cursor_location()?),
            TrackpadAction::Scroll => {
                // Axis 1 is vertical, axis 2 horizontal.
                let event = CGEvent::new_scroll_event(
                    source()?,
                    ScrollEventUnit::PIXEL,
                    2,
                    dy as i32,
                    dx as i32,
                    0,
                )
                .map_err(|()| platform("CGEventCreateScrollWheelEvent"))?;
                event.post(CGEventTapLocation::HID);
                Ok(())
            }
        }
    }

    fn handle_system_command(&self, command: SystemCommand) -> Result<(), InjectionError> {
        match command {
            SystemCommand::LockScreen => {
                let q = KeyMapper::key_to_macos_cgkeycode("Q")
                    .ok_or_else(|| InjectionError::UnsupportedKey("Q".into()))?;
                self.tap_key(q, FLAG_MASK_CONTROL | FLAG_MASK_COMMAND)
            }
            SystemCommand::Sleep => {
                let status = Command::new("pmset")
                    .arg("sleepnow")
                    .status()
                    .map_err(|e| InjectionError::Platform(format!("pmset: {e}")))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(InjectionError::Platform(format!("pmset exited with {status}")))
                }
            }
            SystemCommand::ShowPowerDialog => {
                debug!("posting power key");
                self.tap_key(POWER_KEY, 0)
            }
        }
    }
}
