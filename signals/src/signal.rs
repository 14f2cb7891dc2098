//! Signal - the writable reactive cell.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::runtime::{self, DependentList, NodeId, ReactiveNode, Source};

pub(crate) struct SignalInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    dependents: DependentList,
}

impl<T: 'static> Source for SignalInner<T> {
    fn version(&self) -> u64 {
        self.version.get()
    }

    fn sync(&self) {
        // Signals are always up to date.
    }

    fn add_dependent(&self, id: NodeId, dep: Weak<dyn ReactiveNode>) {
        self.dependents.add(id, dep);
    }

    fn remove_dependent(&self, id: NodeId) {
        self.dependents.remove(id);
    }
}

/// A reactive cell holding a value plus a monotonic write-version.
///
/// Reads performed inside a derived or effect record the signal as a
/// dependency. Writes bump the version and mark dependents stale; writing a
/// value equal to the current one is a no-op.
///
/// `Signal` is a cheap handle (`Rc` inside) - clone it freely into closures.
///
/// # Example
///
/// ```
/// use weft_signals::{signal, effect};
///
/// let count = signal(0);
/// let count_in_effect = count.clone();
/// let _stop = effect(move || {
///     let _ = count_in_effect.get();
/// });
/// count.set(1);
/// ```
pub struct Signal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Create a new signal holding `initial`.
pub fn signal<T: 'static>(initial: T) -> Signal<T> {
    Signal {
        inner: Rc::new(SignalInner {
            value: RefCell::new(initial),
            version: Cell::new(runtime::next_version()),
            dependents: DependentList::new(),
        }),
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Read the value, recording a dependency in the current tracking scope.
    pub fn get(&self) -> T {
        let source: Rc<dyn Source> = self.inner.clone();
        runtime::track_read(&source, self.inner.version.get());
        self.inner.value.borrow().clone()
    }

    /// Read the value without tracking.
    pub fn peek(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: PartialEq + 'static> Signal<T> {
    /// Write a new value. Equal writes are no-ops; unequal writes bump the
    /// version, mark dependents stale and flush pending effects (unless a
    /// batch is active).
    pub fn set(&self, value: T) {
        {
            let current = self.inner.value.borrow();
            if *current == value {
                return;
            }
        }
        *self.inner.value.borrow_mut() = value;
        self.inner.version.set(runtime::next_version());
        self.inner.dependents.notify_all();
        runtime::flush_if_idle();
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Transform the current value in place.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.value.borrow());
        self.set(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_roundtrip() {
        let s = signal(5);
        assert_eq!(s.get(), 5);
        s.set(7);
        assert_eq!(s.get(), 7);
    }

    #[test]
    fn equal_write_is_noop() {
        let s = signal("hi".to_string());
        let v1 = s.inner.version.get();
        s.set("hi".to_string());
        assert_eq!(s.inner.version.get(), v1);
        s.set("bye".to_string());
        assert!(s.inner.version.get() > v1);
    }

    #[test]
    fn clone_shares_state() {
        let a = signal(1);
        let b = a.clone();
        b.set(2);
        assert_eq!(a.get(), 2);
    }

    #[test]
    fn update_applies_transform() {
        let s = signal(10);
        s.update(|v| v + 5);
        assert_eq!(s.get(), 15);
    }
}
