//! winit-backed platform for Windows, macOS and Linux.
//!
//! The event loop is never handed over with `run_app`; it is pumped from
//! `poll_events`/`wait_events` so the application keeps ownership of its loop.

mod platform;
mod window;

pub use platform::DesktopPlatform;
pub use window::DesktopWindow;
