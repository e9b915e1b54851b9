//! Platform abstraction.
//!
//! A `Platform` owns the OS integration for the process: event pump, time
//! source and window factory. Exactly one is live per process, obtained from
//! `PlatformFactory::instance`.

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
pub mod desktop;
mod factory;
pub mod headless;

pub use factory::PlatformFactory;

use std::time::Duration;

use anyhow::Result;

use crate::window::{Window, WindowConfig};

/// Per-OS service object.
///
/// Methods take `&self`: the platform is shared as `&'static dyn Platform` and
/// may be reached again from inside its own event dispatch. Implementations
/// keep their mutable state behind `Cell`/`RefCell`.
pub trait Platform {
    /// One-time OS setup. Calling it again after success is a no-op.
    ///
    /// Windows must not be created when this fails.
    fn initialize(&self) -> Result<()>;

    /// Releases OS-level resources.
    ///
    /// Idempotent and safe without a prior successful `initialize`.
    fn shutdown(&self);

    /// Creates a fully initialized window; never returns a half-built one.
    fn create_window(&self, config: &WindowConfig) -> Result<Box<dyn Window>>;

    /// Dispatches every queued event to window callbacks, then returns.
    /// Never blocks.
    fn poll_events(&self);

    /// Blocks until at least one event is available, then behaves like
    /// `poll_events`.
    fn wait_events(&self);

    /// Monotonic seconds since `initialize`.
    fn time(&self) -> f64;

    /// Blocks the calling thread for at least `duration`.
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Stable human-readable backend identifier.
    fn name(&self) -> &'static str;
}
