use std::any::Any;

use anyhow::Result;

/// Color used to clear the color target.
///
/// Straight (non-premultiplied) RGBA, components conventionally in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

/// High-level response after a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error (or nothing to draw into); skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Device, frame and clear interface implemented by each backend.
///
/// Frame bracketing is the caller's job: `clear` is only meaningful between
/// `begin_frame` and `end_frame`, and `begin_frame` must not be nested.
/// Implementations ignore out-of-bracket calls instead of guarding them.
pub trait GraphicsContext {
    /// Binds to the native surface and acquires the device.
    fn initialize(&mut self) -> Result<()>;

    /// Acquires the next drawable.
    fn begin_frame(&mut self) -> std::result::Result<(), SurfaceErrorAction>;

    /// Submits recorded work and presents the frame.
    fn end_frame(&mut self);

    /// Clears the color target of the current frame.
    fn clear(&mut self, color: ClearColor);

    /// Toggles presentation synchronization. Applied no later than the next
    /// `end_frame`.
    fn set_vsync(&mut self, enabled: bool);

    /// Current drawable size in physical pixels.
    fn viewport_size(&self) -> (u32, u32);

    /// Native device handle for backend-specific interop.
    ///
    /// `None` until `initialize` succeeded. The context keeps ownership.
    fn native_device(&self) -> Option<&dyn Any>;

    /// Native command queue handle for backend-specific interop.
    fn native_command_queue(&self) -> Option<&dyn Any>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clear_color_is_opaque_black() {
        assert_eq!(ClearColor::default(), ClearColor::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn converts_to_wgpu_color() {
        let c: wgpu::Color = ClearColor::new(0.5, 0.25, 0.0, 1.0).into();
        assert_eq!(c, wgpu::Color { r: 0.5, g: 0.25, b: 0.0, a: 1.0 });
    }
}
