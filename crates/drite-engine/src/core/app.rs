use std::cell::Cell;
use std::rc::Rc;

use anyhow::{ensure, Context, Result};

use crate::graphics::{ClearColor, SurfaceErrorAction};
use crate::input::{KeyAction, KeyCode, KeyEvent, MouseAction, MouseEvent, ScrollEvent};
use crate::platform::{Platform, PlatformFactory};
use crate::time::FrameClock;
use crate::window::{Window, WindowConfig};

/// Clear color used by `Application::render` unless overridden.
const DEFAULT_CLEAR: ClearColor = ClearColor::new(0.1, 0.1, 0.2, 1.0);

/// Lifecycle of an `Application`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum AppPhase {
    #[default]
    Uninitialized,
    Running,
    Stopped,
}

/// Part of the application reachable from window callbacks.
#[derive(Default)]
struct AppState {
    phase: Cell<AppPhase>,
}

impl AppState {
    /// Leaves `Running`; logs only the first transition.
    fn stop(&self, reason: &str) {
        if self.phase.get() == AppPhase::Running {
            self.phase.set(AppPhase::Stopped);
            log::info!("stopping: {reason}");
        }
    }

    fn on_key(&self, event: &KeyEvent) {
        if event.is_press(KeyCode::Escape) {
            self.stop("escape pressed");
            return;
        }
        // Bare modifier presses only show up as flags on the next key.
        if event.action != KeyAction::Press || event.key.is_modifier() {
            return;
        }
        if event.modifiers.any() {
            log::debug!(
                "key pressed: {} (scancode {}, {:?})",
                event.key,
                event.scancode,
                event.modifiers
            );
        } else {
            log::debug!("key pressed: {} (scancode {})", event.key, event.scancode);
        }
    }

    fn on_mouse(&self, event: &MouseEvent) {
        if event.action == MouseAction::Press {
            log::debug!(
                "mouse {:?} pressed at ({:.1}, {:.1})",
                event.button,
                event.x,
                event.y
            );
        }
    }

    fn on_scroll(&self, event: &ScrollEvent) {
        log::debug!(
            "scroll ({:.2}, {:.2}) at ({:.1}, {:.1})",
            event.x_offset,
            event.y_offset,
            event.x,
            event.y
        );
    }

    fn on_resize(&self, window: Option<&dyn Window>, width: u32, height: u32) {
        match window.map(|w| w.framebuffer_size()) {
            Some((fw, fh)) => log::debug!("resized to {width}x{height} points ({fw}x{fh} pixels)"),
            None => log::debug!("resized to {width}x{height} points"),
        }
    }

    fn on_close(&self) {
        self.stop("window close requested");
    }
}

/// Owns the platform handle and the main window and runs the frame loop.
///
/// ```no_run
/// use drite_engine::core::Application;
/// use drite_engine::window::WindowConfig;
///
/// let mut app = Application::new();
/// app.initialize(WindowConfig::default())?;
/// app.run();
/// app.shutdown();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Application {
    state: Rc<AppState>,
    // Sole strong reference; callbacks hold `Weak` ones.
    window: Option<Rc<dyn Window>>,
    platform: Option<&'static dyn Platform>,
    clock: FrameClock,
    clear_color: ClearColor,
    frames: u64,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        Self {
            state: Rc::new(AppState::default()),
            window: None,
            platform: None,
            clock: FrameClock::default(),
            clear_color: DEFAULT_CLEAR,
            frames: 0,
        }
    }

    /// Initializes against the process-wide platform.
    pub fn initialize(&mut self, config: WindowConfig) -> Result<()> {
        let platform = PlatformFactory::instance().context("failed to acquire platform")?;
        self.initialize_with(platform, config)
    }

    /// Initializes against an explicit platform.
    ///
    /// Fails at the first failing step. Whatever was acquired up to that point
    /// is released by `shutdown`, or by a retry against another platform.
    pub fn initialize_with(
        &mut self,
        platform: &'static dyn Platform,
        config: WindowConfig,
    ) -> Result<()> {
        ensure!(
            self.phase() == AppPhase::Uninitialized,
            "application already initialized (phase {:?})",
            self.phase()
        );

        if let Some(previous) = self.platform.replace(platform) {
            if !std::ptr::addr_eq(previous, platform) {
                log::debug!("releasing platform {} from a failed initialization", previous.name());
                previous.shutdown();
            }
        }
        platform
            .initialize()
            .with_context(|| format!("failed to initialize platform {}", platform.name()))?;

        let window: Rc<dyn Window> = Rc::from(
            platform
                .create_window(&config)
                .with_context(|| format!("failed to create window \"{}\"", config.title))?,
        );

        self.register_callbacks(&window);
        window.show();
        log::info!("{}", startup_report(platform, &config, &*window));

        self.window = Some(window);
        self.clock.reset(platform.time());
        self.state.phase.set(AppPhase::Running);
        log::info!("application initialized");
        Ok(())
    }

    fn register_callbacks(&self, window: &Rc<dyn Window>) {
        let state = self.state.clone();
        window.set_key_callback(Box::new(move |e: &KeyEvent| state.on_key(e)));

        let state = self.state.clone();
        window.set_mouse_callback(Box::new(move |e: &MouseEvent| state.on_mouse(e)));

        let state = self.state.clone();
        window.set_scroll_callback(Box::new(move |e: &ScrollEvent| state.on_scroll(e)));

        let state = self.state.clone();
        let weak = Rc::downgrade(window);
        window.set_resize_callback(Box::new(move |w: u32, h: u32| {
            state.on_resize(weak.upgrade().as_deref(), w, h)
        }));

        let state = self.state.clone();
        window.set_close_callback(Box::new(move || state.on_close()));
    }

    /// Runs until a handler stops the application or the window asks to close.
    pub fn run(&mut self) {
        let (Some(platform), Some(window)) = (self.platform, self.window.clone()) else {
            log::warn!("run called on an uninitialized application");
            return;
        };

        log::info!("entering main loop");
        while self.is_running() && !window.should_close() {
            platform.poll_events();

            let ft = self.clock.tick(platform.time());
            self.update(ft.dt);
            self.render();
        }

        log::info!(
            "main loop exited after {} iterations, {} frames presented",
            self.clock.frame_count(),
            self.frames
        );
    }

    /// Per-iteration simulation step; `dt` in seconds, unclamped.
    pub fn update(&mut self, dt: f64) {
        log::trace!("update dt={dt:.6}");
    }

    /// Draws one frame: clear to `clear_color` and present.
    pub fn render(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(mut ctx) = window.graphics_context() else {
            log::trace!("render skipped: graphics context unavailable");
            return;
        };

        match ctx.begin_frame() {
            Ok(()) => {}
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("graphics surface failed irrecoverably");
                self.state.stop("fatal surface error");
                return;
            }
            Err(action) => {
                log::trace!("frame skipped: {action:?}");
                return;
            }
        }

        ctx.clear(self.clear_color);
        ctx.end_frame();
        self.frames += 1;
    }

    /// Releases the window, then the platform. Safe to call any number of times.
    pub fn shutdown(&mut self) {
        let had_window = self.window.take().is_some();
        if let Some(platform) = self.platform.take() {
            platform.shutdown();
        }

        let previous = self.state.phase.replace(AppPhase::Stopped);
        if had_window || previous == AppPhase::Running {
            log::info!("application shut down");
        }
    }

    pub fn on_key(&self, event: &KeyEvent) {
        self.state.on_key(event);
    }

    pub fn on_mouse(&self, event: &MouseEvent) {
        self.state.on_mouse(event);
    }

    pub fn on_scroll(&self, event: &ScrollEvent) {
        self.state.on_scroll(event);
    }

    pub fn on_resize(&self, width: u32, height: u32) {
        self.state.on_resize(self.window(), width, height);
    }

    pub fn on_close(&self) {
        self.state.on_close();
    }

    pub fn window(&self) -> Option<&dyn Window> {
        self.window.as_deref()
    }

    pub fn platform(&self) -> Option<&'static dyn Platform> {
        self.platform
    }

    pub fn phase(&self) -> AppPhase {
        self.state.phase.get()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == AppPhase::Running
    }

    /// Frames presented by `render`.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn clear_color(&self) -> ClearColor {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: ClearColor) {
        self.clear_color = color;
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn startup_report(platform: &dyn Platform, config: &WindowConfig, window: &dyn Window) -> String {
    let (w, h) = window.size();
    let (fw, fh) = window.framebuffer_size();

    if (w, h) == (fw, fh) || w == 0 {
        format!("{}: window \"{}\" {w}x{h}", platform.name(), config.title)
    } else {
        format!(
            "{}: window \"{}\" {w}x{h} points, {fw}x{fh} pixels (scale {:.2})",
            platform.name(),
            config.title,
            f64::from(fw) / f64::from(w)
        )
    }
}
