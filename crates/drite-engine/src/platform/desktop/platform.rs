use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Weak;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, ensure, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

use crate::platform::Platform;
use crate::window::{Window, WindowConfig};

use super::window::{DesktopWindow, WindowState};

const NAME: &str = if cfg!(target_os = "windows") {
    "winit-windows"
} else if cfg!(target_os = "macos") {
    "winit-macos"
} else {
    "winit-linux"
};

type Registry = RefCell<HashMap<WindowId, Weak<WindowState>>>;

/// Desktop `Platform` over a pumped winit event loop.
pub struct DesktopPlatform {
    /// Mutably borrowed for the duration of a pump.
    event_loop: RefCell<Option<EventLoop<()>>>,
    windows: Registry,
    start: Cell<Instant>,
    initialized: Cell<bool>,
}

impl Default for DesktopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopPlatform {
    /// Does not touch the OS; see `Platform::initialize`.
    pub fn new() -> Self {
        Self {
            event_loop: RefCell::new(None),
            windows: RefCell::new(HashMap::new()),
            start: Cell::new(Instant::now()),
            initialized: Cell::new(false),
        }
    }

    fn pump(&self, timeout: Option<Duration>) {
        let Ok(mut slot) = self.event_loop.try_borrow_mut() else {
            log::warn!("nested event pump ignored");
            return;
        };
        let Some(event_loop) = slot.as_mut() else {
            log::trace!("event pump skipped: platform not initialized");
            return;
        };

        let mut dispatcher = Dispatcher {
            windows: &self.windows,
        };

        if let PumpStatus::Exit(code) = event_loop.pump_app_events(timeout, &mut dispatcher) {
            log::warn!("winit event loop exited with code {code}");
        }
    }
}

impl Platform for DesktopPlatform {
    fn initialize(&self) -> Result<()> {
        if self.initialized.get() {
            return Ok(());
        }

        let mut slot = self
            .event_loop
            .try_borrow_mut()
            .map_err(|_| anyhow!("cannot initialize the platform from inside its event pump"))?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        *slot = Some(event_loop);

        self.start.set(Instant::now());
        self.initialized.set(true);
        log::info!("platform initialized: {NAME}");
        Ok(())
    }

    fn shutdown(&self) {
        if !self.initialized.get() {
            return;
        }

        let Ok(mut slot) = self.event_loop.try_borrow_mut() else {
            log::warn!("shutdown requested during event dispatch; ignored");
            return;
        };

        let live = self
            .windows
            .borrow()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count();
        if live > 0 {
            log::warn!("platform shutting down with {live} live window(s)");
        }

        self.windows.borrow_mut().clear();
        slot.take();
        self.initialized.set(false);
        log::info!("platform shut down");
    }

    fn create_window(&self, config: &WindowConfig) -> Result<Box<dyn Window>> {
        ensure!(self.initialized.get(), "platform is not initialized");

        let slot = self
            .event_loop
            .try_borrow()
            .map_err(|_| anyhow!("cannot create a window while events are being dispatched"))?;
        let event_loop = slot.as_ref().context("platform event loop is gone")?;

        // Hidden until `Window::show`, so a failed initialization never flashes.
        let attrs = winit::window::Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(
                f64::from(config.width),
                f64::from(config.height),
            ))
            .with_resizable(config.resizable)
            .with_visible(false);

        #[allow(deprecated)]
        let native = event_loop
            .create_window(attrs)
            .context("failed to create native window")?;
        drop(slot);

        let mut window = DesktopWindow::new(Arc::new(native));
        window.initialize(config)?;

        let mut windows = self.windows.borrow_mut();
        windows.retain(|_, w| w.strong_count() > 0);
        windows.insert(window.id(), window.downgrade());

        log::debug!("window created: {:?} \"{}\"", window.id(), config.title);
        Ok(Box::new(window))
    }

    fn poll_events(&self) {
        self.pump(Some(Duration::ZERO));
    }

    fn wait_events(&self) {
        self.pump(None);
    }

    fn time(&self) -> f64 {
        self.start.get().elapsed().as_secs_f64()
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// Routes winit callbacks to the registered windows.
struct Dispatcher<'a> {
    windows: &'a Registry,
}

impl ApplicationHandler for Dispatcher<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if matches!(event, WindowEvent::Destroyed) {
            self.windows.borrow_mut().remove(&id);
            return;
        }

        // The registry borrow ends here; callbacks may reach the platform again.
        let state = self.windows.borrow().get(&id).and_then(Weak::upgrade);
        if let Some(state) = state {
            state.handle(event);
        }
    }
}
