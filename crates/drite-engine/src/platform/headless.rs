//! In-process backend without OS windows or a GPU.
//!
//! Never selected by `PlatformFactory`; pass it explicitly to
//! `Application::initialize_with`. Events are scripted: `push_event` queues for
//! the next poll, `schedule` targets a specific poll. Every live window receives
//! every event, in queue order.

use std::any::Any;
use std::cell::{Cell, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Instant;

use anyhow::{bail, Result};

use crate::graphics::{ClearColor, GraphicsContext, SurfaceErrorAction};
use crate::input::{KeyEvent, MouseEvent, ScrollEvent};
use crate::window::{
    CloseCallback, KeyCallback, MouseCallback, ResizeCallback, ScrollCallback, Window,
    WindowCallbacks, WindowConfig,
};

use super::Platform;

/// Scripted event delivered to headless windows.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Scroll(ScrollEvent),
    /// New content size in logical points.
    Resize { width: u32, height: u32 },
    Focus(bool),
    Minimize(bool),
    /// The user asked to close the window.
    CloseRequested,
}

pub struct HeadlessPlatform {
    scale_factor: f64,
    fail_initialize: bool,
    fail_window_creation: bool,

    initialized: Cell<bool>,
    start: Cell<Instant>,
    polls: Cell<u64>,
    pumping: Cell<bool>,

    queue: RefCell<VecDeque<HeadlessEvent>>,
    scheduled: RefCell<Vec<(u64, HeadlessEvent)>>,
    windows: RefCell<Vec<Weak<WindowState>>>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            scale_factor: 1.0,
            fail_initialize: false,
            fail_window_creation: false,
            initialized: Cell::new(false),
            start: Cell::new(Instant::now()),
            polls: Cell::new(0),
            pumping: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
            scheduled: RefCell::new(Vec::new()),
            windows: RefCell::new(Vec::new()),
        }
    }

    /// Pixels per point reported by windows created afterwards.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Makes `initialize` fail, as if the OS integration were unavailable.
    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Makes `create_window` fail.
    pub fn failing_window_creation(mut self) -> Self {
        self.fail_window_creation = true;
        self
    }

    /// Queues an event for the next poll.
    pub fn push_event(&self, event: HeadlessEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Queues an event for the `poll`-th call (1-based) to `poll_events` or
    /// `wait_events`. Events due at an already-passed poll fire on the next one.
    pub fn schedule(&self, poll: u64, event: HeadlessEvent) {
        self.scheduled.borrow_mut().push((poll, event));
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Number of event pumps performed so far.
    pub fn poll_count(&self) -> u64 {
        self.polls.get()
    }

    /// Windows created by this platform that are still alive.
    pub fn live_windows(&self) -> usize {
        self.windows
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Frames presented across all live windows.
    pub fn presented_frames(&self) -> u64 {
        self.each_context(|ctx| ctx.frames_presented())
            .into_iter()
            .sum()
    }

    /// Color of the most recent clear on the first live window.
    pub fn last_clear_color(&self) -> Option<ClearColor> {
        self.each_context(|ctx| ctx.last_clear())
            .into_iter()
            .flatten()
            .next()
    }

    fn each_context<T>(&self, f: impl Fn(&HeadlessContext) -> T) -> Vec<T> {
        self.live_states()
            .iter()
            .filter_map(|state| {
                let ctx = state.context.try_borrow().ok()?;
                ctx.as_ref().map(&f)
            })
            .collect()
    }

    fn live_states(&self) -> Vec<Rc<WindowState>> {
        let mut windows = self.windows.borrow_mut();
        windows.retain(|w| w.strong_count() > 0);
        windows.iter().filter_map(Weak::upgrade).collect()
    }

    fn pump(&self) {
        if self.pumping.replace(true) {
            log::warn!("nested headless event pump ignored");
            return;
        }

        let poll = self.polls.get() + 1;
        self.polls.set(poll);

        {
            let mut scheduled = self.scheduled.borrow_mut();
            let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut *scheduled)
                .into_iter()
                .partition(|(at, _)| *at <= poll);
            *scheduled = later;
            self.queue
                .borrow_mut()
                .extend(due.into_iter().map(|(_, event)| event));
        }

        // Events queued by callbacks during this pump wait for the next one.
        let batch: Vec<HeadlessEvent> = self.queue.borrow_mut().drain(..).collect();
        if !batch.is_empty() {
            let windows = self.live_states();
            for event in &batch {
                for window in &windows {
                    window.handle(event);
                }
            }
        }

        self.pumping.set(false);
    }
}

impl Platform for HeadlessPlatform {
    fn initialize(&self) -> Result<()> {
        if self.initialized.get() {
            return Ok(());
        }
        if self.fail_initialize {
            bail!("headless platform configured to fail initialization");
        }

        self.start.set(Instant::now());
        self.initialized.set(true);
        log::debug!("headless platform initialized");
        Ok(())
    }

    fn shutdown(&self) {
        if !self.initialized.replace(false) {
            return;
        }

        self.queue.borrow_mut().clear();
        self.scheduled.borrow_mut().clear();
        self.windows.borrow_mut().clear();
        log::debug!("headless platform shut down after {} polls", self.polls.get());
    }

    fn create_window(&self, config: &WindowConfig) -> Result<Box<dyn Window>> {
        if !self.initialized.get() {
            bail!("headless platform is not initialized");
        }
        if self.fail_window_creation {
            bail!("headless platform configured to fail window creation");
        }

        let mut window = HeadlessWindow::new(self.scale_factor);
        window.initialize(config)?;

        self.windows.borrow_mut().push(Rc::downgrade(&window.state));
        Ok(Box::new(window))
    }

    fn poll_events(&self) {
        self.pump();
    }

    fn wait_events(&self) {
        // Nothing can arrive from outside this thread; waiting would never end.
        self.pump();
    }

    fn time(&self) -> f64 {
        self.start.get().elapsed().as_secs_f64()
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

struct WindowState {
    scale_factor: f64,

    initialized: Cell<bool>,
    resizable: Cell<bool>,
    visible: Cell<bool>,
    should_close: Cell<bool>,
    focused: Cell<bool>,
    minimized: Cell<bool>,

    title: RefCell<String>,
    size: Cell<(u32, u32)>,
    position: Cell<(i32, i32)>,

    callbacks: WindowCallbacks,
    context: RefCell<Option<HeadlessContext>>,
}

impl WindowState {
    fn framebuffer_size(&self) -> (u32, u32) {
        let (w, h) = self.size.get();
        (
            (w as f64 * self.scale_factor).round() as u32,
            (h as f64 * self.scale_factor).round() as u32,
        )
    }

    fn apply_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
        let viewport = self.framebuffer_size();
        if let Ok(mut ctx) = self.context.try_borrow_mut() {
            if let Some(ctx) = ctx.as_mut() {
                ctx.viewport = viewport;
            }
        }
    }

    fn handle(&self, event: &HeadlessEvent) {
        match event {
            HeadlessEvent::Key(e) => {
                self.callbacks.emit_key(e);
            }
            HeadlessEvent::Mouse(e) => {
                self.callbacks.emit_mouse(e);
            }
            HeadlessEvent::Scroll(e) => {
                self.callbacks.emit_scroll(e);
            }
            HeadlessEvent::Resize { width, height } => {
                self.apply_size(*width, *height);
                self.callbacks.emit_resize(*width, *height);
            }
            HeadlessEvent::Focus(focused) => self.focused.set(*focused),
            HeadlessEvent::Minimize(minimized) => self.minimized.set(*minimized),
            HeadlessEvent::CloseRequested => {
                self.should_close.set(true);
                self.callbacks.emit_close();
            }
        }
    }
}

/// Window of the headless backend.
pub struct HeadlessWindow {
    state: Rc<WindowState>,
}

impl HeadlessWindow {
    fn new(scale_factor: f64) -> Self {
        Self {
            state: Rc::new(WindowState {
                scale_factor,
                initialized: Cell::new(false),
                resizable: Cell::new(true),
                visible: Cell::new(false),
                should_close: Cell::new(false),
                focused: Cell::new(false),
                minimized: Cell::new(false),
                title: RefCell::new(String::new()),
                size: Cell::new((0, 0)),
                position: Cell::new((0, 0)),
                callbacks: WindowCallbacks::default(),
                context: RefCell::new(None),
            }),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn title(&self) -> String {
        self.state.title.borrow().clone()
    }
}

impl Window for HeadlessWindow {
    fn initialize(&mut self, config: &WindowConfig) -> Result<()> {
        let state = &self.state;
        if state.initialized.get() {
            return Ok(());
        }

        *state.title.borrow_mut() = config.title.clone();
        state.resizable.set(config.resizable);
        state.size.set((config.width, config.height));

        let mut ctx = HeadlessContext::new(state.framebuffer_size(), config.vsync);
        ctx.initialize()?;
        *state.context.borrow_mut() = Some(ctx);

        state.initialized.set(true);
        Ok(())
    }

    fn show(&self) {
        self.state.visible.set(true);
        self.state.focused.set(true);
    }

    fn close(&self) {
        self.state.visible.set(false);
        self.state.focused.set(false);
        self.state.should_close.set(true);

        let released = self.state.callbacks.registered();
        self.state.callbacks.clear();
        log::debug!("headless window \"{}\" closed, {released} callback(s) released", self.title());
    }

    fn should_close(&self) -> bool {
        self.state.should_close.get()
    }

    fn size(&self) -> (u32, u32) {
        self.state.size.get()
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.state.framebuffer_size()
    }

    fn position(&self) -> (i32, i32) {
        self.state.position.get()
    }

    fn set_title(&self, title: &str) {
        *self.state.title.borrow_mut() = title.to_string();
    }

    fn set_size(&self, width: u32, height: u32) {
        if !self.state.resizable.get() {
            log::warn!("set_size({width}x{height}) ignored: window is not resizable");
            return;
        }
        self.state.apply_size(width, height);
    }

    fn is_focused(&self) -> bool {
        self.state.focused.get()
    }

    fn is_minimized(&self) -> bool {
        self.state.minimized.get()
    }

    fn graphics_context(&self) -> Option<RefMut<'_, dyn GraphicsContext>> {
        let ctx = self.state.context.try_borrow_mut().ok()?;
        RefMut::filter_map(ctx, |c| c.as_mut().map(|c| c as &mut dyn GraphicsContext)).ok()
    }

    fn set_key_callback(&self, callback: KeyCallback) {
        self.state.callbacks.set_key(callback);
    }

    fn set_mouse_callback(&self, callback: MouseCallback) {
        self.state.callbacks.set_mouse(callback);
    }

    fn set_scroll_callback(&self, callback: ScrollCallback) {
        self.state.callbacks.set_scroll(callback);
    }

    fn set_resize_callback(&self, callback: ResizeCallback) {
        self.state.callbacks.set_resize(callback);
    }

    fn set_close_callback(&self, callback: CloseCallback) {
        self.state.callbacks.set_close(callback);
    }
}

/// Opaque native device handle of the headless backend.
#[derive(Debug, Default)]
pub struct HeadlessDevice;

/// Opaque native queue handle of the headless backend.
#[derive(Debug, Default)]
pub struct HeadlessQueue;

/// Graphics context that records frames instead of drawing them.
#[derive(Debug)]
pub struct HeadlessContext {
    initialized: bool,
    in_frame: bool,
    vsync: bool,
    viewport: (u32, u32),
    frame_clear: Option<ClearColor>,
    last_clear: Option<ClearColor>,
    frames_presented: u64,
    device: HeadlessDevice,
    queue: HeadlessQueue,
}

impl HeadlessContext {
    pub fn new(viewport: (u32, u32), vsync: bool) -> Self {
        Self {
            initialized: false,
            in_frame: false,
            vsync,
            viewport,
            frame_clear: None,
            last_clear: None,
            frames_presented: 0,
            device: HeadlessDevice,
            queue: HeadlessQueue,
        }
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Clear color of the last presented frame.
    pub fn last_clear(&self) -> Option<ClearColor> {
        self.last_clear
    }
}

impl GraphicsContext for HeadlessContext {
    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn begin_frame(&mut self) -> std::result::Result<(), SurfaceErrorAction> {
        if !self.initialized || self.viewport.0 == 0 || self.viewport.1 == 0 {
            return Err(SurfaceErrorAction::SkipFrame);
        }
        if self.in_frame {
            log::warn!("begin_frame called while a frame is already open");
        }
        self.in_frame = true;
        Ok(())
    }

    fn end_frame(&mut self) {
        if !self.in_frame {
            log::warn!("end_frame called without an open frame");
            return;
        }
        self.in_frame = false;
        self.frames_presented += 1;
        if let Some(color) = self.frame_clear.take() {
            self.last_clear = Some(color);
        }
    }

    fn clear(&mut self, color: ClearColor) {
        if !self.in_frame {
            log::warn!("clear called outside of a frame");
            return;
        }
        self.frame_clear = Some(color);
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn native_device(&self) -> Option<&dyn Any> {
        self.initialized.then_some(&self.device as &dyn Any)
    }

    fn native_command_queue(&self) -> Option<&dyn Any> {
        self.initialized.then_some(&self.queue as &dyn Any)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::input::{KeyAction, KeyCode};

    fn platform() -> HeadlessPlatform {
        let p = HeadlessPlatform::new();
        p.initialize().unwrap();
        p
    }

    #[test]
    fn shutdown_is_idempotent_with_or_without_initialize() {
        let never = HeadlessPlatform::new();
        never.shutdown();
        never.shutdown();
        assert!(!never.is_initialized());

        let p = platform();
        p.shutdown();
        p.shutdown();
        assert!(!p.is_initialized());
    }

    #[test]
    fn create_window_requires_initialize() {
        let p = HeadlessPlatform::new();
        assert!(p.create_window(&WindowConfig::default()).is_err());
    }

    #[test]
    fn forced_failures() {
        assert!(HeadlessPlatform::new().failing_initialize().initialize().is_err());

        let p = HeadlessPlatform::new().failing_window_creation();
        p.initialize().unwrap();
        assert!(p.create_window(&WindowConfig::default()).is_err());
        assert_eq!(p.live_windows(), 0);
    }

    #[test]
    fn window_reports_configured_size_and_stays_hidden_until_shown() {
        let p = platform();
        let window = p.create_window(&WindowConfig::new("T", 800, 600)).unwrap();
        assert_eq!(window.size(), (800, 600));
        assert_eq!(window.framebuffer_size(), (800, 600));
        assert!(!window.is_focused());

        window.show();
        assert!(window.is_focused());
    }

    #[test]
    fn initialize_applies_config_but_not_visibility() {
        let mut window = HeadlessWindow::new(1.0);
        assert!(window.graphics_context().is_none());

        window.initialize(&WindowConfig::new("configured", 320, 240)).unwrap();
        assert_eq!(window.title(), "configured");
        assert!(!window.is_visible());
        assert_eq!(window.graphics_context().unwrap().viewport_size(), (320, 240));

        window.set_title("renamed");
        window.show();
        assert_eq!(window.title(), "renamed");
        assert!(window.is_visible());

        window.close();
        assert!(!window.is_visible());
        assert!(window.should_close());
    }

    #[test]
    fn graphics_context_is_exclusive() {
        let p = platform();
        let window = p.create_window(&WindowConfig::default()).unwrap();

        let held = window.graphics_context();
        assert!(held.is_some());
        assert!(window.graphics_context().is_none());
        drop(held);
        assert!(window.graphics_context().is_some());
    }

    #[test]
    fn non_resizable_window_ignores_set_size() {
        let p = platform();
        let window = p
            .create_window(&WindowConfig::new("fixed", 640, 480).resizable(false))
            .unwrap();

        window.set_size(1024, 768);
        assert_eq!(window.size(), (640, 480));
    }

    #[test]
    fn resizable_window_applies_set_size_to_viewport() {
        let p = HeadlessPlatform::new().with_scale_factor(2.0);
        p.initialize().unwrap();
        let window = p.create_window(&WindowConfig::new("r", 640, 480)).unwrap();

        window.set_size(300, 200);
        assert_eq!(window.size(), (300, 200));
        assert_eq!(window.framebuffer_size(), (600, 400));
        assert_eq!(window.graphics_context().unwrap().viewport_size(), (600, 400));
    }

    #[test]
    fn events_dispatch_in_queue_order() {
        let p = platform();
        let window = p.create_window(&WindowConfig::default()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        window.set_key_callback(Box::new(move |e: &KeyEvent| l.borrow_mut().push(format!("key {}", e.key))));
        let l = log.clone();
        window.set_resize_callback(Box::new(move |w: u32, h: u32| l.borrow_mut().push(format!("resize {w}x{h}"))));

        p.push_event(HeadlessEvent::Key(KeyEvent::new(KeyCode::A, KeyAction::Press)));
        p.push_event(HeadlessEvent::Resize { width: 10, height: 20 });
        p.push_event(HeadlessEvent::Key(KeyEvent::new(KeyCode::B, KeyAction::Press)));
        p.poll_events();

        assert_eq!(*log.borrow(), ["key A", "resize 10x20", "key B"]);
        assert_eq!(window.size(), (10, 20));
    }

    #[test]
    fn scheduled_events_fire_on_their_poll() {
        let p = platform();
        let window = p.create_window(&WindowConfig::default()).unwrap();
        p.schedule(2, HeadlessEvent::CloseRequested);

        p.poll_events();
        assert!(!window.should_close());
        p.wait_events();
        assert!(window.should_close());
        assert_eq!(p.poll_count(), 2);
    }

    #[test]
    fn callback_may_close_its_window_during_dispatch() {
        let p = platform();
        let window: Rc<dyn Window> = Rc::from(p.create_window(&WindowConfig::default()).unwrap());

        let presses = Rc::new(Cell::new(0));
        let weak = Rc::downgrade(&window);
        let n = presses.clone();
        window.set_key_callback(Box::new(move |_: &KeyEvent| {
            n.set(n.get() + 1);
            if let Some(w) = weak.upgrade() {
                w.close();
                w.set_title("closing");
            }
        }));

        p.push_event(HeadlessEvent::Key(KeyEvent::new(KeyCode::Q, KeyAction::Press)));
        p.poll_events();
        assert!(window.should_close());

        // Closing released the callback that did it.
        p.push_event(HeadlessEvent::Key(KeyEvent::new(KeyCode::Q, KeyAction::Press)));
        p.poll_events();
        assert_eq!(presses.get(), 1);
    }

    #[test]
    fn events_pushed_during_dispatch_wait_for_next_poll() {
        let p: &'static HeadlessPlatform = Box::leak(Box::new(platform()));
        let window = p.create_window(&WindowConfig::default()).unwrap();
        let closes = Rc::new(Cell::new(0));

        window.set_key_callback(Box::new(move |_: &KeyEvent| p.push_event(HeadlessEvent::CloseRequested)));
        let c = closes.clone();
        window.set_close_callback(Box::new(move || c.set(c.get() + 1)));

        p.push_event(HeadlessEvent::Key(KeyEvent::default()));
        p.poll_events();
        assert_eq!(closes.get(), 0);
        p.poll_events();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn time_is_non_decreasing() {
        let p = platform();
        let mut last = p.time();
        for _ in 0..100 {
            let now = p.time();
            assert!(now >= last);
            last = now;
        }
        assert!(last >= 0.0);

        p.sleep(std::time::Duration::from_millis(5));
        assert!(p.time() - last >= 0.005);
    }

    #[test]
    fn context_records_bracketed_clears_only() {
        let mut ctx = HeadlessContext::new((4, 4), true);
        assert!(ctx.native_device().is_none());
        assert_eq!(ctx.begin_frame(), Err(SurfaceErrorAction::SkipFrame));

        ctx.initialize().unwrap();
        assert!(ctx.native_device().unwrap().is::<HeadlessDevice>());
        assert!(ctx.native_command_queue().unwrap().is::<HeadlessQueue>());

        ctx.clear(ClearColor::new(1.0, 0.0, 0.0, 1.0));
        ctx.end_frame();
        assert_eq!(ctx.frames_presented(), 0);
        assert_eq!(ctx.last_clear(), None);

        ctx.begin_frame().unwrap();
        ctx.clear(ClearColor::new(0.1, 0.1, 0.2, 1.0));
        ctx.end_frame();
        assert_eq!(ctx.frames_presented(), 1);
        assert_eq!(ctx.last_clear(), Some(ClearColor::new(0.1, 0.1, 0.2, 1.0)));

        ctx.set_vsync(false);
        assert!(!ctx.vsync());
    }

    #[test]
    fn zero_sized_viewport_skips_frames() {
        let mut ctx = HeadlessContext::new((0, 0), true);
        ctx.initialize().unwrap();
        assert_eq!(ctx.begin_frame(), Err(SurfaceErrorAction::SkipFrame));
    }

    #[test]
    fn dropped_windows_stop_receiving_events() {
        let p = platform();
        let window = p.create_window(&WindowConfig::default()).unwrap();
        assert_eq!(p.live_windows(), 1);

        drop(window);
        assert_eq!(p.live_windows(), 0);

        p.push_event(HeadlessEvent::CloseRequested);
        p.poll_events();
        assert_eq!(p.presented_frames(), 0);
    }
}
