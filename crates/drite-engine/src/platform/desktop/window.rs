use std::cell::{Cell, RefCell, RefMut};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::{GpuInit, WgpuContext};
use crate::graphics::GraphicsContext;
use crate::input::platform::winit as translate;
use crate::input::{KeyModifiers, MouseAction, MouseEvent, ScrollEvent};
use crate::window::{
    CloseCallback, KeyCallback, MouseCallback, ResizeCallback, ScrollCallback, Window,
    WindowCallbacks, WindowConfig,
};

/// State shared between a `DesktopWindow` and the platform's event dispatcher.
pub(super) struct WindowState {
    context: RefCell<Option<WgpuContext>>,
    native: Arc<winit::window::Window>,
    callbacks: WindowCallbacks,

    initialized: Cell<bool>,
    resizable: Cell<bool>,
    should_close: Cell<bool>,

    /// winit reports modifiers separately from key events.
    modifiers: Cell<KeyModifiers>,
    /// Last pointer position, logical points.
    cursor: Cell<(f64, f64)>,
}

impl WindowState {
    fn scale(&self) -> f64 {
        self.native.scale_factor()
    }

    pub(super) fn handle(&self, event: WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                if let Ok(mut ctx) = self.context.try_borrow_mut() {
                    if let Some(ctx) = ctx.as_mut() {
                        ctx.resize(size);
                    }
                }

                let logical = size.to_logical::<f64>(self.scale());
                self.callbacks
                    .emit_resize(logical.width.round() as u32, logical.height.round() as u32);
            }

            WindowEvent::CloseRequested => {
                self.should_close.set(true);
                self.callbacks.emit_close();
            }

            WindowEvent::ModifiersChanged(m) => {
                self.modifiers.set(translate::map_modifiers(m.state()));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let ev = translate::key_event(&event, self.modifiers.get());
                self.callbacks.emit_key(&ev);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = translate::to_logical(position, self.scale());
                self.cursor.set((x, y));
                self.callbacks.emit_mouse(&MouseEvent {
                    action: MouseAction::Move,
                    x,
                    y,
                    modifiers: self.modifiers.get(),
                    ..MouseEvent::default()
                });
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = translate::map_mouse_button(button) else {
                    return;
                };
                let (x, y) = self.cursor.get();
                self.callbacks.emit_mouse(&MouseEvent {
                    action: translate::mouse_action(state),
                    button,
                    x,
                    y,
                    modifiers: self.modifiers.get(),
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (x_offset, y_offset) = translate::scroll_offsets(delta, self.scale());
                let (x, y) = self.cursor.get();
                self.callbacks.emit_scroll(&ScrollEvent {
                    x_offset,
                    y_offset,
                    x,
                    y,
                });
            }

            _ => {}
        }
    }
}

/// Desktop `Window` wrapping a winit window and its `WgpuContext`.
pub struct DesktopWindow {
    state: Rc<WindowState>,
}

impl DesktopWindow {
    pub(super) fn new(native: Arc<winit::window::Window>) -> Self {
        Self {
            state: Rc::new(WindowState {
                context: RefCell::new(None),
                native,
                callbacks: WindowCallbacks::default(),
                initialized: Cell::new(false),
                resizable: Cell::new(true),
                should_close: Cell::new(false),
                modifiers: Cell::new(KeyModifiers::NONE),
                cursor: Cell::new((0.0, 0.0)),
            }),
        }
    }

    pub fn id(&self) -> WindowId {
        self.state.native.id()
    }

    pub(super) fn downgrade(&self) -> Weak<WindowState> {
        Rc::downgrade(&self.state)
    }
}

impl Window for DesktopWindow {
    fn initialize(&mut self, config: &WindowConfig) -> Result<()> {
        let state = &self.state;
        if state.initialized.get() {
            return Ok(());
        }

        state.native.set_title(&config.title);
        state.native.set_resizable(config.resizable);
        state.resizable.set(config.resizable);

        let mut ctx = WgpuContext::new(state.native.clone(), GpuInit::for_vsync(config.vsync));
        ctx.initialize()
            .context("failed to initialize graphics context")?;
        *state.context.borrow_mut() = Some(ctx);

        state.initialized.set(true);
        Ok(())
    }

    fn show(&self) {
        self.state.native.set_visible(true);
        self.state.native.focus_window();
    }

    fn close(&self) {
        self.state.native.set_visible(false);
        self.state.should_close.set(true);

        let released = self.state.callbacks.registered();
        self.state.callbacks.clear();
        log::debug!("window {:?} closed, {released} callback(s) released", self.id());
    }

    fn should_close(&self) -> bool {
        self.state.should_close.get()
    }

    fn size(&self) -> (u32, u32) {
        let native = &self.state.native;
        let logical = native.inner_size().to_logical::<f64>(native.scale_factor());
        (logical.width.round() as u32, logical.height.round() as u32)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let physical = self.state.native.inner_size();
        (physical.width, physical.height)
    }

    fn position(&self) -> (i32, i32) {
        let native = &self.state.native;
        match native.outer_position() {
            Ok(pos) => {
                let logical = pos.to_logical::<f64>(native.scale_factor());
                (logical.x.round() as i32, logical.y.round() as i32)
            }
            // Wayland does not expose window positions.
            Err(_) => (0, 0),
        }
    }

    fn set_title(&self, title: &str) {
        self.state.native.set_title(title);
    }

    fn set_size(&self, width: u32, height: u32) {
        if !self.state.resizable.get() {
            log::warn!("set_size({width}x{height}) ignored: window is not resizable");
            return;
        }

        // Some backends apply the size synchronously; the rest report it
        // later through `WindowEvent::Resized`.
        let requested = LogicalSize::new(f64::from(width), f64::from(height));
        if let Some(applied) = self.state.native.request_inner_size(requested) {
            log::trace!("set_size applied immediately: {}x{} pixels", applied.width, applied.height);
        }
    }

    fn is_focused(&self) -> bool {
        self.state.native.has_focus()
    }

    fn is_minimized(&self) -> bool {
        self.state.native.is_minimized().unwrap_or(false)
    }

    fn graphics_context(&self) -> Option<RefMut<'_, dyn GraphicsContext>> {
        let mut ctx = self.state.context.try_borrow_mut().ok()?;

        // Catch up on resizes that arrived while the context was borrowed.
        if let Some(ctx) = ctx.as_mut() {
            let size = self.state.native.inner_size();
            if ctx.viewport_size() != (size.width, size.height) {
                ctx.resize(size);
            }
        }

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
