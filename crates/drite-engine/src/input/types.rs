use std::fmt;

/// Keyboard key identifier.
///
/// Closed set: keys the backends cannot name map to `KeyCode::Unknown`.
/// Discriminant values are internal and carry no stability guarantee.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum KeyCode {
    #[default]
    Unknown,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    // Special keys
    Escape,
    Tab,
    CapsLock,
    Shift,
    Control,
    Alt,
    Command,
    Space,
    Enter,
    Backspace,
    Delete,

    // Navigation
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // Punctuation
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    Backslash,
    Grave,
}

impl KeyCode {
    /// True for the keys that also show up as `KeyModifiers` flags.
    pub fn is_modifier(self) -> bool {
        matches!(self, KeyCode::Shift | KeyCode::Control | KeyCode::Alt | KeyCode::Command)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum KeyAction {
    #[default]
    Press,
    Release,
    Repeat,
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct KeyModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    /// Command on macOS, the Windows/Super key elsewhere.
    pub command: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self::new(false, false, false, false);

    pub const fn new(shift: bool, control: bool, alt: bool, command: bool) -> Self {
        Self { shift, control, alt, command }
    }

    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.command
    }
}

/// Keyboard event.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub action: KeyAction,
    pub modifiers: KeyModifiers,
    /// Platform scancode, `0` when the backend cannot provide one.
    pub scancode: u32,
}

impl KeyEvent {
    pub fn new(key: KeyCode, action: KeyAction) -> Self {
        Self {
            key,
            action,
            ..Self::default()
        }
    }

    pub fn is_press(&self, key: KeyCode) -> bool {
        self.key == key && self.action == KeyAction::Press
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    /// Usually "back" on five-button mice.
    Button4,
    /// Usually "forward" on five-button mice.
    Button5,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum MouseAction {
    Press,
    Release,
    #[default]
    Move,
}

/// Mouse event in logical points.
///
/// For `MouseAction::Move` the `button` field carries no information.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    pub x: f64,
    pub y: f64,
    pub modifiers: KeyModifiers,
}

/// Scroll event.
///
/// `x_offset`/`y_offset` are deltas; `x`/`y` is the cursor position at the time
/// of the scroll.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ScrollEvent {
    pub x_offset: f64,
    pub y_offset: f64,
    pub x: f64,
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_an_idle_pointer() {
        let ev = MouseEvent::default();
        assert_eq!(ev.action, MouseAction::Move);
        assert_eq!(ev.button, MouseButton::Left);
        assert_eq!((ev.x, ev.y), (0.0, 0.0));
        assert!(!ev.modifiers.any());
    }

    #[test]
    fn key_event_default_is_unknown_press() {
        let ev = KeyEvent::default();
        assert_eq!(ev.key, KeyCode::Unknown);
        assert_eq!(ev.action, KeyAction::Press);
        assert_eq!(ev.scancode, 0);
    }

    #[test]
    fn is_press_ignores_release_and_repeat() {
        assert!(KeyEvent::new(KeyCode::Escape, KeyAction::Press).is_press(KeyCode::Escape));
        assert!(!KeyEvent::new(KeyCode::Escape, KeyAction::Release).is_press(KeyCode::Escape));
        assert!(!KeyEvent::new(KeyCode::Escape, KeyAction::Repeat).is_press(KeyCode::Escape));
        assert!(!KeyEvent::new(KeyCode::Q, KeyAction::Press).is_press(KeyCode::Escape));
    }

    #[test]
    fn modifiers_any() {
        assert!(!KeyModifiers::NONE.any());
        assert!(KeyModifiers::new(false, false, false, true).any());
        assert_eq!(KeyModifiers::default(), KeyModifiers::NONE);
    }

    #[test]
    fn modifier_keys() {
        assert!(KeyCode::Command.is_modifier());
        assert!(KeyCode::Shift.is_modifier());
        assert!(!KeyCode::CapsLock.is_modifier());
        assert!(!KeyCode::A.is_modifier());
    }
}
