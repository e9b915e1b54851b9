//! Window abstraction.
//!
//! A `Window` is created and fully initialized by `Platform::create_window`.
//! It owns its `GraphicsContext` and holds one callback per event kind.

mod callbacks;
mod config;

pub use callbacks::{
    CloseCallback,
    KeyCallback,
    MouseCallback,
    ResizeCallback,
    ScrollCallback,
    WindowCallbacks,
};
pub use config::WindowConfig;

use std::cell::RefMut;

use anyhow::Result;

use crate::graphics::GraphicsContext;

/// Per-OS window contract.
///
/// Every method except `initialize` takes `&self` so that callbacks running
/// inside `Platform::poll_events` can call back into the window (`close`,
/// `set_title`, re-registering a callback) while the backend is dispatching.
pub trait Window {
    /// Applies `config` to the native window and creates the owned graphics
    /// context. On error the window stays hidden.
    fn initialize(&mut self, config: &WindowConfig) -> Result<()>;

    /// Makes the window visible.
    fn show(&self);

    /// Hides the native window, raises the should-close flag and releases the
    /// registered callbacks. A callback may close its own window.
    fn close(&self);

    /// True once the user or code requested closure.
    fn should_close(&self) -> bool;

    /// Content size in logical points.
    fn size(&self) -> (u32, u32);

    /// Drawable size in physical pixels. `framebuffer_size / size` is the
    /// display scale factor.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Outer position on screen, in logical points.
    fn position(&self) -> (i32, i32);

    fn set_title(&self, title: &str);

    /// Requests a new content size in logical points.
    ///
    /// Ignored for windows created with `resizable = false`.
    fn set_size(&self, width: u32, height: u32);

    fn is_focused(&self) -> bool;

    fn is_minimized(&self) -> bool;

    /// Borrows the window's graphics context.
    ///
    /// `None` before `initialize` or while the context is already borrowed.
    fn graphics_context(&self) -> Option<RefMut<'_, dyn GraphicsContext>>;

    fn set_key_callback(&self, callback: KeyCallback);
    fn set_mouse_callback(&self, callback: MouseCallback);
    fn set_scroll_callback(&self, callback: ScrollCallback);
    fn set_resize_callback(&self, callback: ResizeCallback);
    fn set_close_callback(&self, callback: CloseCallback);
}
