//! Minimal signal emitters for the app and map, so subsystems can react to
//! changes without knowing who causes them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// The camera moved, rotated, tilted or zoomed.
    Change,
    /// The viewport changed size.
    Resize,
    /// New geometry finished loading.
    FeatureLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Rc<dyn Fn()>;

#[derive(Default)]
pub struct Emitter {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Signal, Callback)>>,
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter::default()
    }

    pub fn on(&self, signal: Signal, callback: impl Fn() + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .push((id, signal, Rc::new(callback)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _, _)| *listener != id);
        listeners.len() != before
    }

    /// Calls every listener of `signal`, in registration order. Listeners may
    /// add or remove listeners while being called.
    pub fn emit(&self, signal: Signal) {
        let callbacks: Vec<Callback> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, s, _)| *s == signal)
            .map(|(_, _, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_only_matching_listeners() {
        let emitter = Emitter::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        emitter.on(Signal::Resize, move || counter.set(counter.get() + 1));
        emitter.emit(Signal::Change);
        assert_eq!(hits.get(), 0);
        emitter.emit(Signal::Resize);
        emitter.emit(Signal::Resize);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn off_removes_by_id() {
        let emitter = Emitter::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = emitter.on(Signal::Change, move || counter.set(counter.get() + 1));
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(Signal::Change);
        assert_eq!(hits.get(), 0);
        assert_eq!(emitter.listener_count(), 0);
    }
}
