use std::cell::{Cell, RefCell};

use crate::input::{KeyEvent, MouseEvent, ScrollEvent};

pub type KeyCallback = Box<dyn FnMut(&KeyEvent)>;
pub type MouseCallback = Box<dyn FnMut(&MouseEvent)>;
pub type ScrollCallback = Box<dyn FnMut(&ScrollEvent)>;
/// Receives the new content size in logical points.
pub type ResizeCallback = Box<dyn FnMut(u32, u32)>;
pub type CloseCallback = Box<dyn FnMut()>;

/// Single-subscriber callback slot.
///
/// The callback is taken out of the slot while it runs, so it may re-register
/// or clear the slot (or any other) from inside its own invocation. Any `set` or
/// `clear` issued during dispatch wins over the callback being dispatched.
struct Slot<F: ?Sized> {
    inner: RefCell<Option<Box<F>>>,
    /// Bumped by every `set` and `clear`.
    generation: Cell<u64>,
}

impl<F: ?Sized> Default for Slot<F> {
    fn default() -> Self {
        Self {
            inner: RefCell::new(None),
            generation: Cell::new(0),
        }
    }
}

impl<F: ?Sized> Slot<F> {
    fn set(&self, callback: Box<F>) {
        self.bump();
        *self.inner.borrow_mut() = Some(callback);
    }

    fn is_set(&self) -> bool {
        self.inner.borrow().is_some()
    }

    fn clear(&self) {
        self.bump();
        self.inner.borrow_mut().take();
    }

    fn bump(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    /// Returns false when the slot was empty (or already dispatching).
    fn dispatch(&self, call: impl FnOnce(&mut F)) -> bool {
        let taken = self.inner.borrow_mut().take();
        let Some(mut callback) = taken else {
            return false;
        };

        let generation = self.generation.get();
        call(&mut *callback);

        // Restore only if the slot was left alone during the call.
        if self.generation.get() == generation {
            *self.inner.borrow_mut() = Some(callback);
        }
        true
    }
}

/// The five event callbacks of a window.
///
/// Shared by every backend; the backend decides when to emit, this type only
/// guarantees reentrancy-safe single-slot storage.
#[derive(Default)]
pub struct WindowCallbacks {
    key: Slot<dyn FnMut(&KeyEvent)>,
    mouse: Slot<dyn FnMut(&MouseEvent)>,
    scroll: Slot<dyn FnMut(&ScrollEvent)>,
    resize: Slot<dyn FnMut(u32, u32)>,
    close: Slot<dyn FnMut()>,
}

impl WindowCallbacks {
    pub fn set_key(&self, callback: KeyCallback) {
        self.key.set(callback);
    }

    pub fn set_mouse(&self, callback: MouseCallback) {
        self.mouse.set(callback);
    }

    pub fn set_scroll(&self, callback: ScrollCallback) {
        self.scroll.set(callback);
    }

    pub fn set_resize(&self, callback: ResizeCallback) {
        self.resize.set(callback);
    }

    pub fn set_close(&self, callback: CloseCallback) {
        self.close.set(callback);
    }

    pub fn emit_key(&self, event: &KeyEvent) -> bool {
        self.key.dispatch(|cb| cb(event))
    }

    pub fn emit_mouse(&self, event: &MouseEvent) -> bool {
        self.mouse.dispatch(|cb| cb(event))
    }

    pub fn emit_scroll(&self, event: &ScrollEvent) -> bool {
        self.scroll.dispatch(|cb| cb(event))
    }

    pub fn emit_resize(&self, width: u32, height: u32) -> bool {
        self.resize.dispatch(|cb| cb(width, height))
    }

    pub fn emit_close(&self) -> bool {
        self.close.dispatch(|cb| cb())
    }

    /// Number of occupied slots.
    pub fn registered(&self) -> usize {
        [
            self.key.is_set(),
            self.mouse.is_set(),
            self.scroll.is_set(),
            self.resize.is_set(),
            self.close.is_set(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Drops every registered callback. Takes effect even for the callback
    /// currently being dispatched.
    pub fn clear(&self) {
        self.key.clear();
        self.mouse.clear();
        self.scroll.clear();
        self.resize.clear();
        self.close.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::input::{KeyAction, KeyCode};

    #[test]
    fn emit_without_callback_reports_nothing_dispatched() {
        let callbacks = WindowCallbacks::default();
        assert!(!callbacks.emit_close());
        assert_eq!(callbacks.registered(), 0);
    }

    #[test]
    fn last_registration_wins() {
        let callbacks = WindowCallbacks::default();
        let hits = Rc::new(Cell::new((0, 0)));

        let h = hits.clone();
        callbacks.set_resize(Box::new(move |_: u32, _: u32| h.set((h.get().0 + 1, h.get().1))));
        let h = hits.clone();
        callbacks.set_resize(Box::new(move |_: u32, _: u32| h.set((h.get().0, h.get().1 + 1))));

        assert!(callbacks.emit_resize(10, 10));
        assert_eq!(hits.get(), (0, 1));
        assert_eq!(callbacks.registered(), 1);
    }

    #[test]
    fn callback_receives_event() {
        let callbacks = WindowCallbacks::default();
        let seen = Rc::new(Cell::new(KeyCode::Unknown));

        let s = seen.clone();
        callbacks.set_key(Box::new(move |e: &KeyEvent| s.set(e.key)));
        callbacks.emit_key(&KeyEvent::new(KeyCode::F5, KeyAction::Press));

        assert_eq!(seen.get(), KeyCode::F5);
    }

    #[test]
    fn callback_may_replace_itself_during_dispatch() {
        let callbacks = Rc::new(WindowCallbacks::default());
        let generation = Rc::new(Cell::new(0));

        let cbs = Rc::downgrade(&callbacks);
        let g = generation.clone();
        callbacks.set_close(Box::new(move || {
            g.set(1);
            if let Some(cbs) = cbs.upgrade() {
                let g2 = g.clone();
                cbs.set_close(Box::new(move || g2.set(2)));
            }
        }));

        callbacks.emit_close();
        assert_eq!(generation.get(), 1);

        callbacks.emit_close();
        assert_eq!(generation.get(), 2);
    }

    #[test]
    fn callback_may_clear_its_own_slot_during_dispatch() {
        let callbacks = Rc::new(WindowCallbacks::default());
        let hits = Rc::new(Cell::new(0));

        let cbs = Rc::downgrade(&callbacks);
        let h = hits.clone();
        callbacks.set_close(Box::new(move || {
            h.set(h.get() + 1);
            if let Some(cbs) = cbs.upgrade() {
                cbs.clear();
            }
        }));
        callbacks.set_key(Box::new(|_: &KeyEvent| {}));

        assert!(callbacks.emit_close());
        assert_eq!(callbacks.registered(), 0);

        assert!(!callbacks.emit_close());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn nested_emit_of_the_same_slot_is_skipped() {
        let callbacks = Rc::new(WindowCallbacks::default());
        let nested = Rc::new(Cell::new(None));

        let cbs = Rc::downgrade(&callbacks);
        let n = nested.clone();
        callbacks.set_close(Box::new(move || {
            if let Some(cbs) = cbs.upgrade() {
                n.set(Some(cbs.emit_close()));
            }
        }));

        assert!(callbacks.emit_close());
        assert_eq!(nested.get(), Some(false));
        // Slot restored after dispatch.
        assert_eq!(callbacks.registered(), 1);
    }

    #[test]
    fn clear_empties_every_slot() {
        let callbacks = WindowCallbacks::default();
        callbacks.set_key(Box::new(|_: &KeyEvent| {}));
        callbacks.set_mouse(Box::new(|_: &MouseEvent| {}));
        callbacks.set_scroll(Box::new(|_: &ScrollEvent| {}));
        callbacks.set_resize(Box::new(|_: u32, _: u32| {}));
        callbacks.set_close(Box::new(|| {}));
        assert_eq!(callbacks.registered(), 5);

        callbacks.clear();
        assert_eq!(callbacks.registered(), 0);
    }
}
