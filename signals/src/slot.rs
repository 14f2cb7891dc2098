//! Slot - a reactive cell whose content is a literal, a signal, or a getter.
//!
//! Slots are the binding layer between component props and the layout/render
//! pipeline: a prop may be a static value, a `Signal<T>`, or a closure, and
//! consumers read through `.get()` without caring which. Reading inside a
//! tracking scope subscribes to both the slot (rebinds) and the underlying
//! source (value changes).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::runtime::{self, DependentList, NodeId, ReactiveNode, Source};
use crate::signal::Signal;

enum Binding<T: 'static> {
    Value(T),
    Signal(Signal<T>),
    Getter(Rc<dyn Fn() -> T>),
}

pub(crate) struct SlotInner<T: 'static> {
    binding: RefCell<Binding<T>>,
    version: Cell<u64>,
    dependents: DependentList,
}

impl<T: 'static> Source for SlotInner<T> {
    fn version(&self) -> u64 {
        self.version.get()
    }

    fn sync(&self) {}

    fn add_dependent(&self, id: NodeId, dep: Weak<dyn ReactiveNode>) {
        self.dependents.add(id, dep);
    }

    fn remove_dependent(&self, id: NodeId) {
        self.dependents.remove(id);
    }
}

/// A reactive cell that can hold a literal, a signal, or a getter closure.
pub struct Slot<T: 'static> {
    inner: Rc<SlotInner<T>>,
}

impl<T: 'static> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Create a slot holding `initial` (or `T::default()` when `None`).
pub fn slot<T: Default + 'static>(initial: Option<T>) -> Slot<T> {
    Slot {
        inner: Rc::new(SlotInner {
            binding: RefCell::new(Binding::Value(initial.unwrap_or_default())),
            version: Cell::new(runtime::next_version()),
            dependents: DependentList::new(),
        }),
    }
}

impl<T: Clone + 'static> Slot<T> {
    /// Read the current value, tracking the slot and its underlying source.
    pub fn get(&self) -> T {
        let source: Rc<dyn Source> = self.inner.clone();
        runtime::track_read(&source, self.inner.version.get());
        // Clone the binding handle out so user getters may touch this slot.
        let value = match &*self.inner.binding.borrow() {
            Binding::Value(v) => return v.clone(),
            Binding::Signal(s) => return s.get(),
            Binding::Getter(f) => f.clone(),
        };
        value()
    }

    /// Read without tracking.
    pub fn peek(&self) -> T {
        runtime::untracked(|| self.get())
    }
}

impl<T: 'static> Slot<T> {
    fn rebind(&self, binding: Binding<T>) {
        *self.inner.binding.borrow_mut() = binding;
        self.inner.version.set(runtime::next_version());
        self.inner.dependents.notify_all();
        runtime::flush_if_idle();
    }

    /// Bind to a signal; the slot follows the signal's value.
    pub fn set_signal(&self, signal: Signal<T>) {
        self.rebind(Binding::Signal(signal));
    }

    /// Bind to a getter closure evaluated on every read.
    pub fn set_getter(&self, getter: impl Fn() -> T + 'static) {
        self.rebind(Binding::Getter(Rc::new(getter)));
    }
}

impl<T: PartialEq + 'static> Slot<T> {
    /// Install a literal value. Writing an equal literal over an existing
    /// literal is a no-op; anything else rebinds and notifies.
    pub fn set_value(&self, value: T) {
        {
            let binding = self.inner.binding.borrow();
            if let Binding::Value(current) = &*binding {
                if *current == value {
                    return;
                }
            }
        }
        self.rebind(Binding::Value(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::derived;
    use crate::signal::signal;

    #[test]
    fn literal_roundtrip() {
        let s: Slot<u16> = slot(Some(3));
        assert_eq!(s.get(), 3);
        s.set_value(7);
        assert_eq!(s.get(), 7);
    }

    #[test]
    fn follows_signal() {
        let width = signal(10u16);
        let s: Slot<u16> = slot(None);
        s.set_signal(width.clone());
        assert_eq!(s.get(), 10);
        width.set(20);
        assert_eq!(s.get(), 20);
    }

    #[test]
    fn getter_binding_tracks_through() {
        let base = signal(2u16);
        let s: Slot<u16> = slot(None);
        let b = base.clone();
        s.set_getter(move || b.get() * 2);

        let s2 = s.clone();
        let d = derived(move || s2.get());
        assert_eq!(d.get(), 4);
        base.set(5);
        assert_eq!(d.get(), 10);
    }

    #[test]
    fn equal_literal_write_keeps_version() {
        let s: Slot<u16> = slot(Some(4));
        let v = s.inner.version.get();
        s.set_value(4);
        assert_eq!(s.inner.version.get(), v);
    }
}
