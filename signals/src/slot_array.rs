//! TrackedSlotArray - a reactive sparse array with per-index tracking.
//!
//! Each index is backed by its own [`Slot`], so a derived that reads index 5
//! only re-runs when index 5 (or its bound source) changes. A dirty set
//! records indices touched since the last [`take_dirty`](TrackedSlotArray::take_dirty)
//! for consumers that want to skip untouched indices.

use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::signal::Signal;
use crate::slot::{slot, Slot};

/// Reactive sparse array of `T`. Grows on demand; absent cells read as the
/// default value.
pub struct TrackedSlotArray<T: 'static> {
    default: T,
    slots: RefCell<Vec<Slot<T>>>,
    dirty: RefCell<BTreeSet<usize>>,
}

impl<T: Default + Clone + PartialEq + 'static> TrackedSlotArray<T> {
    /// Create an array whose absent cells read as `default`
    /// (or `T::default()` when `None`).
    pub fn new(default: Option<T>) -> Self {
        Self {
            default: default.unwrap_or_default(),
            slots: RefCell::new(Vec::new()),
            dirty: RefCell::new(BTreeSet::new()),
        }
    }

    fn slot_at(&self, index: usize) -> Slot<T> {
        let mut slots = self.slots.borrow_mut();
        while slots.len() <= index {
            slots.push(slot(Some(self.default.clone())));
        }
        slots[index].clone()
    }

    /// Read index `index`, tracking it in the current scope. Grows the array.
    pub fn get(&self, index: usize) -> T {
        self.slot_at(index).get()
    }

    /// Read without tracking. Grows the array (used for capacity ensurance).
    pub fn peek(&self, index: usize) -> T {
        self.slot_at(index).peek()
    }

    /// Install a literal value at `index`.
    pub fn set_value(&self, index: usize, value: T) {
        self.dirty.borrow_mut().insert(index);
        self.slot_at(index).set_value(value);
    }

    /// Install a getter source at `index`.
    pub fn set_getter(&self, index: usize, getter: impl Fn() -> T + 'static) {
        self.dirty.borrow_mut().insert(index);
        self.slot_at(index).set_getter(getter);
    }

    /// Bind `index` to a signal.
    pub fn set_signal(&self, index: usize, signal: Signal<T>) {
        self.dirty.borrow_mut().insert(index);
        self.slot_at(index).set_signal(signal);
    }

    /// Drop any source at `index` and reset the cell to the default value.
    pub fn clear(&self, index: usize) {
        let existing = {
            let slots = self.slots.borrow();
            slots.get(index).cloned()
        };
        if let Some(cell) = existing {
            self.dirty.borrow_mut().insert(index);
            // A signal/getter binding always rebinds here, dropping the
            // subscription even when the source value equals the default.
            cell.set_value(self.default.clone());
        }
    }

    /// Reset every cell and release storage. Dependents of touched cells are
    /// notified; subsequent reads re-grow from an empty array.
    pub fn clear_all(&self) {
        let len = self.slots.borrow().len();
        for index in 0..len {
            self.clear(index);
        }
        self.slots.borrow_mut().clear();
        self.dirty.borrow_mut().clear();
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Whether no cell has been materialized.
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Drain the set of indices written since the last call, ascending.
    pub fn take_dirty(&self) -> Vec<usize> {
        let mut dirty = self.dirty.borrow_mut();
        let out: Vec<usize> = dirty.iter().copied().collect();
        dirty.clear();
        out
    }
}
