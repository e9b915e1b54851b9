//! Backend-neutral graphics contract.
//!
//! A `GraphicsContext` is owned by its window and reached through
//! `Window::graphics_context`. Concrete contexts live with their backend
//! (`device` for wgpu, `platform::headless` for tests).

mod context;

pub use context::{ClearColor, GraphicsContext, SurfaceErrorAction};
