//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Backends translate native events into these values before handing them to
//! window callbacks.
//!
//! Pointer coordinates follow one convention on every backend: origin at the
//! top-left of the window content area, y grows downward, logical points.

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
pub(crate) mod platform;
mod types;

pub use types::{
    KeyAction,
    KeyCode,
    KeyEvent,
    KeyModifiers,
    MouseAction,
    MouseButton,
    MouseEvent,
    ScrollEvent,
};
