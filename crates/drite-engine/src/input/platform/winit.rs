use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey};
use winit::platform::scancode::PhysicalKeyExtScancode;

use crate::input::{KeyAction, KeyCode, KeyEvent, KeyModifiers, MouseAction, MouseButton};

/// Translates a winit keyboard event into a `KeyEvent`.
///
/// winit does not carry modifiers on key events; the caller passes the state
/// tracked from `ModifiersChanged`.
pub(crate) fn key_event(event: &winit::event::KeyEvent, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        key: map_key(event.physical_key),
        action: key_action(event.state, event.repeat),
        modifiers,
        scancode: event.physical_key.to_scancode().unwrap_or(0),
    }
}

pub(crate) fn key_action(state: ElementState, repeat: bool) -> KeyAction {
    match state {
        ElementState::Pressed if repeat => KeyAction::Repeat,
        ElementState::Pressed => KeyAction::Press,
        ElementState::Released => KeyAction::Release,
    }
}

pub(crate) fn mouse_action(state: ElementState) -> MouseAction {
    match state {
        ElementState::Pressed => MouseAction::Press,
        ElementState::Released => MouseAction::Release,
    }
}

/// Converts a physical pointer position to logical points.
pub(crate) fn to_logical(pos: PhysicalPosition<f64>, scale: f64) -> (f64, f64) {
    let logical = pos.to_logical::<f64>(scale);
    (logical.x, logical.y)
}

/// Scroll deltas: line units for wheels, logical points for precise devices.
pub(crate) fn scroll_offsets(delta: MouseScrollDelta, scale: f64) -> (f64, f64) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
        MouseScrollDelta::PixelDelta(p) => to_logical(p, scale),
    }
}

pub(crate) fn map_modifiers(m: ModifiersState) -> KeyModifiers {
    KeyModifiers {
        shift: m.shift_key(),
        control: m.control_key(),
        alt: m.alt_key(),
        command: m.super_key(),
    }
}

/// Returns `None` for buttons outside the five the input model names.
pub(crate) fn map_mouse_button(b: WinitMouseButton) -> Option<MouseButton> {
    match b {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Button4),
        WinitMouseButton::Forward => Some(MouseButton::Button5),
        WinitMouseButton::Other(_) => None,
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> KeyCode {
    let PhysicalKey::Code(code) = pk else {
        return KeyCode::Unknown;
    };

    match code {
        WinitKeyCode::KeyA => KeyCode::A,
        WinitKeyCode::KeyB => KeyCode::B,
        WinitKeyCode::KeyC => KeyCode::C,
        WinitKeyCode::KeyD => KeyCode::D,
        WinitKeyCode::KeyE => KeyCode::E,
        WinitKeyCode::KeyF => KeyCode::F,
        WinitKeyCode::KeyG => KeyCode::G,
        WinitKeyCode::KeyH => KeyCode::H,
        WinitKeyCode::KeyI => KeyCode::I,
        WinitKeyCode::KeyJ => KeyCode::J,
        WinitKeyCode::KeyK => KeyCode::K,
        WinitKeyCode::KeyL => KeyCode::L,
        WinitKeyCode::KeyM => KeyCode::M,
        WinitKeyCode::KeyN => KeyCode::N,
        WinitKeyCode::KeyO => KeyCode::O,
        WinitKeyCode::KeyP => KeyCode::P,
        WinitKeyCode::KeyQ => KeyCode::Q,
        WinitKeyCode::KeyR => KeyCode::R,
        WinitKeyCode::KeyS => KeyCode::S,
        WinitKeyCode::KeyT => KeyCode::T,
        WinitKeyCode::KeyU => KeyCode::U,
        WinitKeyCode::KeyV => KeyCode::V,
        WinitKeyCode::KeyW => KeyCode::W,
        WinitKeyCode::KeyX => KeyCode::X,
        WinitKeyCode::KeyY => KeyCode::Y,
        WinitKeyCode::KeyZ => KeyCode::Z,

        WinitKeyCode::Digit0 => KeyCode::Digit0,
        WinitKeyCode::Digit1 => KeyCode::Digit1,
        WinitKeyCode::Digit2 => KeyCode::Digit2,
        WinitKeyCode::Digit3 => KeyCode::Digit3,
        WinitKeyCode::Digit4 => KeyCode::Digit4,
        WinitKeyCode::Digit5 => KeyCode::Digit5,
        WinitKeyCode::Digit6 => KeyCode::Digit6,
        WinitKeyCode::Digit7 => KeyCode::Digit7,
        WinitKeyCode::Digit8 => KeyCode::Digit8,
        WinitKeyCode::Digit9 => KeyCode::Digit9,

        WinitKeyCode::F1 => KeyCode::F1,
        WinitKeyCode::F2 => KeyCode::F2,
        WinitKeyCode::F3 => KeyCode::F3,
        WinitKeyCode::F4 => KeyCode::F4,
        WinitKeyCode::F5 => KeyCode::F5,
        WinitKeyCode::F6 => KeyCode::F6,
        WinitKeyCode::F7 => KeyCode::F7,
        WinitKeyCode::F8 => KeyCode::F8,
        WinitKeyCode::F9 => KeyCode::F9,
        WinitKeyCode::F10 => KeyCode::F10,
        WinitKeyCode::F11 => KeyCode::F11,
        WinitKeyCode::F12 => KeyCode::F12,

        WinitKeyCode::Escape => KeyCode::Escape,
        WinitKeyCode::Tab => KeyCode::Tab,
        WinitKeyCode::CapsLock => KeyCode::CapsLock,
        WinitKeyCode::ShiftLeft | WinitKeyCode::ShiftRight => KeyCode::Shift,
        WinitKeyCode::ControlLeft | WinitKeyCode::ControlRight => KeyCode::Control,
        WinitKeyCode::AltLeft | WinitKeyCode::AltRight => KeyCode::Alt,
        WinitKeyCode::SuperLeft | WinitKeyCode::SuperRight => KeyCode::Command,
        WinitKeyCode::Space => KeyCode::Space,
        WinitKeyCode::Enter | WinitKeyCode::NumpadEnter => KeyCode::Enter,
        WinitKeyCode::Backspace => KeyCode::Backspace,
        WinitKeyCode::Delete => KeyCode::Delete,

        WinitKeyCode::ArrowLeft => KeyCode::ArrowLeft,
        WinitKeyCode::ArrowRight => KeyCode::ArrowRight,
        WinitKeyCode::ArrowUp => KeyCode::ArrowUp,
        WinitKeyCode::ArrowDown => KeyCode::ArrowDown,
        WinitKeyCode::Home => KeyCode::Home,
        WinitKeyCode::End => KeyCode::End,
        WinitKeyCode::PageUp => KeyCode::PageUp,
        WinitKeyCode::PageDown => KeyCode::PageDown,

        WinitKeyCode::Minus => KeyCode::Minus,
        WinitKeyCode::Equal => KeyCode::Equal,
        WinitKeyCode::BracketLeft => KeyCode::LeftBracket,
        WinitKeyCode::BracketRight => KeyCode::RightBracket,
        WinitKeyCode::Semicolon => KeyCode::Semicolon,
        WinitKeyCode::Quote => KeyCode::Quote,
        WinitKeyCode::Comma => KeyCode::Comma,
        WinitKeyCode::Period => KeyCode::Period,
        WinitKeyCode::Slash => KeyCode::Slash,
        WinitKeyCode::Backslash => KeyCode::Backslash,
        WinitKeyCode::Backquote => KeyCode::Grave,

        _ => KeyCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn left_and_right_modifier_keys_collapse() {
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::ShiftLeft)), KeyCode::Shift);
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::ShiftRight)), KeyCode::Shift);
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::SuperRight)), KeyCode::Command);
    }

    #[test]
    fn punctuation_uses_us_layout_names() {
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::Backquote)), KeyCode::Grave);
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::BracketLeft)), KeyCode::LeftBracket);
    }

    #[test]
    fn unmapped_keys_are_unknown() {
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::F24)), KeyCode::Unknown);
        assert_eq!(
            map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            KeyCode::Unknown
        );
    }

    #[test]
    fn repeat_only_applies_to_presses() {
        assert_eq!(key_action(ElementState::Pressed, false), KeyAction::Press);
        assert_eq!(key_action(ElementState::Pressed, true), KeyAction::Repeat);
        assert_eq!(key_action(ElementState::Released, true), KeyAction::Release);
    }

    #[test]
    fn extra_buttons_map_to_button4_and_button5() {
        assert_eq!(map_mouse_button(WinitMouseButton::Back), Some(MouseButton::Button4));
        assert_eq!(map_mouse_button(WinitMouseButton::Forward), Some(MouseButton::Button5));
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), None);
    }

    #[test]
    fn modifiers_map_super_to_command() {
        let m = map_modifiers(ModifiersState::SHIFT | ModifiersState::SUPER);
        assert_eq!(m, KeyModifiers::new(true, false, false, true));
        assert_eq!(map_modifiers(ModifiersState::empty()), KeyModifiers::NONE);
    }

    #[test]
    fn pixel_scroll_is_converted_to_points() {
        let (x, y) = scroll_offsets(MouseScrollDelta::PixelDelta(PhysicalPosition::new(4.0, -8.0)), 2.0);
        assert_eq!((x, y), (2.0, -4.0));

        let (x, y) = scroll_offsets(MouseScrollDelta::LineDelta(0.0, 3.0), 2.0);
        assert_eq!((x, y), (0.0, 3.0));
    }
}
