//! The closed set of events a remote sender can ask the host to perform.
//!
//! Every value in this module is already validated: an [`Event`] can only be
//! built from known enum members, so code downstream of the decoder never has
//! to handle an "unknown action" or "unknown command" case.
//!
//! Each enum carries an explicit wire-name table (`wire_name` /
//! `TryFrom<&str>`).  Adding a new key action or system command means adding
//! one arm to each table; nothing is looked up by reflection.

// ── Event type tag ────────────────────────────────────────────────────────────

/// The `event_type` tag carried on the wire.
///
/// The tag only exists during decoding; the typed model stores the variant
/// itself (see [`Event`]) rather than a redundant tag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Keyboard,
    Trackpad,
    System,
}

impl EventType {
    /// All members, in declaration order.
    pub const ALL: [EventType; 3] = [EventType::Keyboard, EventType::Trackpad, EventType::System];

    /// Returns the exact string used for this member on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            EventType::Keyboard => "KEYBOARD",
            EventType::Trackpad => "TRACKPAD",
            EventType::System => "SYSTEM",
        }
    }
}

impl TryFrom<&str> for EventType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "KEYBOARD" => Ok(EventType::Keyboard),
            "TRACKPAD" => Ok(EventType::Trackpad),
            "SYSTEM" => Ok(EventType::System),
            _ => Err(()),
        }
    }
}

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// Whether a key is being pressed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
}

impl KeyAction {
    pub const ALL: [KeyAction; 2] = [KeyAction::Down, KeyAction::Up];

    pub fn wire_name(self) -> &'static str {
        match self {
            KeyAction::Down => "DOWN",
            KeyAction::Up => "UP",
        }
    }
}

impl TryFrom<&str> for KeyAction {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DOWN" => Ok(KeyAction::Down),
            "UP" => Ok(KeyAction::Up),
            _ => Err(()),
        }
    }
}

/// A modifier key held while a keyboard event is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Cmd,
    Shift,
    Ctrl,
    Alt,
}

impl Modifier {
    /// All members in canonical order (the order used when encoding).
    pub const ALL: [Modifier; 4] = [Modifier::Cmd, Modifier::Shift, Modifier::Ctrl, Modifier::Alt];

    pub fn wire_name(self) -> &'static str {
        match self {
            Modifier::Cmd => "CMD",
            Modifier::Shift => "SHIFT",
            Modifier::Ctrl => "CTRL",
            Modifier::Alt => "ALT",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Modifier::Cmd => 1 << 0,
            Modifier::Shift => 1 << 1,
            Modifier::Ctrl => 1 << 2,
            Modifier::Alt => 1 << 3,
        }
    }
}

impl TryFrom<&str> for Modifier {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CMD" => Ok(Modifier::Cmd),
            "SHIFT" => Ok(Modifier::Shift),
            "CTRL" => Ok(Modifier::Ctrl),
            "ALT" => Ok(Modifier::Alt),
            _ => Err(()),
        }
    }
}

/// A set of [`Modifier`]s stored as a bitmask.
///
/// Inserting the same modifier twice is a no-op and iteration always follows
/// [`Modifier::ALL`], so two sets built from the same members in any order
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    /// The empty set.
    pub const NONE: Modifiers = Modifiers(0);

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = Modifiers::NONE;
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

/// KEYBOARD: press or release a named key with optional modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardEvent {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    /// Key name as sent by the client (e.g. `"A"`, `"ENTER"`).  The decoder
    /// does not interpret it; mapping to a key code is the backend's job.
    pub key: String,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

// ── Trackpad ──────────────────────────────────────────────────────────────────

/// Pointer action requested by a trackpad event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackpadAction {
    Move,
    ClickDown,
    ClickUp,
    Scroll,
}

impl TrackpadAction {
    pub const ALL: [TrackpadAction; 4] = [
        TrackpadAction::Move,
        TrackpadAction::ClickDown,
        TrackpadAction::ClickUp,
        TrackpadAction::Scroll,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            TrackpadAction::Move => "MOVE",
            TrackpadAction::ClickDown => "CLICK_DOWN",
            TrackpadAction::ClickUp => "CLICK_UP",
            TrackpadAction::Scroll => "SCROLL",
        }
    }
}

impl TryFrom<&str> for TrackpadAction {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "MOVE" => Ok(TrackpadAction::Move),
            "CLICK_DOWN" => Ok(TrackpadAction::ClickDown),
            "CLICK_UP" => Ok(TrackpadAction::ClickUp),
            "SCROLL" => Ok(TrackpadAction::Scroll),
            _ => Err(()),
        }
    }
}

/// TRACKPAD: relative pointer movement, left click, or scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackpadEvent {
    pub timestamp: f64,
    pub action: TrackpadAction,
    /// Horizontal delta; `0.0` when the sender omitted it.
    pub dx: f64,
    /// Vertical delta; `0.0` when the sender omitted it.
    pub dy: f64,
}

// ── System ────────────────────────────────────────────────────────────────────

/// Power/session command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemCommand {
    LockScreen,
    Sleep,
    ShowPowerDialog,
}

impl SystemCommand {
    pub const ALL: [SystemCommand; 3] = [
        SystemCommand::LockScreen,
        SystemCommand::Sleep,
        SystemCommand::ShowPowerDialog,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            SystemCommand::LockScreen => "LOCK_SCREEN",
            SystemCommand::Sleep => "SLEEP",
            SystemCommand::ShowPowerDialog => "SHOW_POWER_DIALOG",
        }
    }
}

impl TryFrom<&str> for SystemCommand {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "LOCK_SCREEN" => Ok(SystemCommand::LockScreen),
            "SLEEP" => Ok(SystemCommand::Sleep),
            "SHOW_POWER_DIALOG" => Ok(SystemCommand::ShowPowerDialog),
            _ => Err(()),
        }
    }
}

/// SYSTEM: lock, sleep, or open the power dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemCommandEvent {
    pub timestamp: f64,
    pub command: SystemCommand,
}

// ── Top-level event enum ──────────────────────────────────────────────────────

/// One decoded, validated instruction from the remote sender.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Keyboard(KeyboardEvent),
    Trackpad(TrackpadEvent),
    System(SystemCommandEvent),
}

impl Event {
    /// Returns the wire tag for this event's variant.
    pub fn event_type(&self) -> EventType {
        match self {
            Event::Keyboard(_) => EventType::Keyboard,
            Event::Trackpad(_) => EventType::Trackpad,
            Event::System(_) => EventType::System,
        }
    }

    /// Seconds since the Unix epoch at which the sender created the event
    /// (or the host received it, when the sender sent no timestamp).
    pub fn timestamp(&self) -> f64 {
        match self {
            Event::Keyboard(e) => e.timestamp,
            Event::Trackpad(e) => e.timestamp,
            Event::System(e) => e.timestamp,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_type_maps_back_from_its_wire_name() {
        for member in EventType::ALL {
            assert_eq!(EventType::try_from(member.wire_name()), Ok(member));
        }
    }

    #[test]
    fn test_every_key_action_maps_back_from_its_wire_name() {
        for member in KeyAction::ALL {
            assert_eq!(KeyAction::try_from(member.wire_name()), Ok(member));
        }
    }

    #[test]
    fn test_every_modifier_maps_back_from_its_wire_name() {
        for member in Modifier::ALL {
            assert_eq!(Modifier::try_from(member.wire_name()), Ok(member));
        }
    }

    #[test]
    fn test_every_trackpad_action_maps_back_from_its_wire_name() {
        for member in TrackpadAction::ALL {
            assert_eq!(TrackpadAction::try_from(member.wire_name()), Ok(member));
        }
    }

    #[test]
    fn test_every_system_command_maps_back_from_its_wire_name() {
        for member in SystemCommand::ALL {
            assert_eq!(SystemCommand::try_from(member.wire_name()), Ok(member));
        }
    }

    #[test]
    fn test_wire_names_are_case_sensitive() {
        // The wire protocol uses upper-case member names only.
        assert!(EventType::try_from("keyboard").is_err());
        assert!(KeyAction::try_from("down").is_err());
        assert!(Modifier::try_from("Cmd").is_err());
        assert!(SystemCommand::try_from("lock_screen").is_err());
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        assert!(EventType::try_from("GAMEPAD").is_err());
        assert!(TrackpadAction::try_from("DOUBLE_CLICK").is_err());
        assert!(SystemCommand::try_from("REBOOT").is_err());
        assert!(Modifier::try_from("").is_err());
    }

    #[test]
    fn test_modifiers_collapse_duplicates() {
        // Arrange / Act
        let set: Modifiers = [Modifier::Cmd, Modifier::Cmd, Modifier::Shift].into_iter().collect();

        // Assert
        assert_eq!(set.len(), 2);
        assert!(set.contains(Modifier::Cmd));
        assert!(set.contains(Modifier::Shift));
        assert!(!set.contains(Modifier::Alt));
    }

    #[test]
    fn test_modifiers_equality_ignores_insertion_order() {
        let a: Modifiers = [Modifier::Alt, Modifier::Ctrl].into_iter().collect();
        let b: Modifiers = [Modifier::Ctrl, Modifier::Alt].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_modifiers_iterate_in_canonical_order() {
        let set: Modifiers = [Modifier::Alt, Modifier::Shift, Modifier::Cmd].into_iter().collect();
        let order: Vec<Modifier> = set.iter().collect();
        assert_eq!(order, vec![Modifier::Cmd, Modifier::Shift, Modifier::Alt]);
    }

    #[test]
    fn test_empty_modifiers() {
        assert!(Modifiers::NONE.is_empty());
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        assert_eq!(Modifiers::NONE.iter().count(), 0);
    }

    #[test]
    fn test_event_reports_its_type_and_timestamp() {
        let event = Event::System(SystemCommandEvent {
            timestamp: 12.5,
            command: SystemCommand::Sleep,
        });
        assert_eq!(event.event_type(), EventType::System);
        assert_eq!(event.timestamp(), 12.5);
    }
}
