use std::cell::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};

use super::Platform;

thread_local! {
    static INSTANCE: OnceCell<&'static dyn Platform> = const { OnceCell::new() };
}

/// Set once any thread has created the platform.
static CREATED: AtomicBool = AtomicBool::new(false);

/// Selects and lazily constructs the process-wide `Platform`.
///
/// The instance is leaked on creation and never dropped: it outlives every
/// consumer, and `Platform::shutdown` is the last thing to call on it before the
/// process exits. It is bound to the thread that created it (native event loops
/// are single-threaded), so calls from any other thread fail.
pub struct PlatformFactory;

impl PlatformFactory {
    /// Returns the platform instance, creating it on first use.
    ///
    /// Repeated calls on the owning thread return the identical reference.
    pub fn instance() -> Result<&'static dyn Platform> {
        INSTANCE.with(|cell| {
            if let Some(platform) = cell.get() {
                return Ok(*platform);
            }

            if CREATED.swap(true, Ordering::AcqRel) {
                bail!("platform already created on another thread");
            }

            let platform: &'static dyn Platform = Box::leak(Self::create());
            log::debug!("platform instance created: {}", platform.name());
            Ok(*cell.get_or_init(|| platform))
        })
    }

    /// Constructs the backend for the compile target.
    ///
    /// Does not initialize it and does not register it as the singleton.
    #[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
    pub fn create() -> Box<dyn Platform> {
        Box::new(super::desktop::DesktopPlatform::new())
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    pub fn create() -> Box<dyn Platform> {
        compile_error!("drite-engine has no platform backend for this target");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test allowed to touch the singleton: it binds it to this test's thread.
    #[test]
    fn instance_is_created_once_and_shared() {
        let a = PlatformFactory::instance().unwrap();
        let b = PlatformFactory::instance().unwrap();
        let c = PlatformFactory::instance().unwrap();

        assert!(std::ptr::addr_eq(a, b));
        assert!(std::ptr::addr_eq(b, c));
        assert_eq!(a.name(), b.name());

        let other = std::thread::spawn(|| PlatformFactory::instance().is_err())
            .join()
            .unwrap();
        assert!(other);
    }

    #[test]
    fn create_builds_independent_uninitialized_backends() {
        let a = PlatformFactory::create();
        let b = PlatformFactory::create();
        assert!(!std::ptr::addr_eq(&*a, &*b));
        assert_eq!(a.name(), b.name());

        // Never initialized: shutdown is still safe, any number of times.
        a.shutdown();
        a.shutdown();
    }
}
