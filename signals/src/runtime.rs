//! Reactive runtime: tracking context, versions, and the effect queue.
//!
//! Thread-local by design. The observer stack, the pending-effect queue and
//! the global version counter all live here; the node types in the sibling
//! modules only talk to the graph through [`Source`] and [`ReactiveNode`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::effect::EffectInner;

/// Stable identity for a node: the address of its inner allocation.
pub(crate) type NodeId = usize;

/// Dependent side of the graph: something that observes sources.
///
/// Deriveds implement both roles; effects only this one.
pub(crate) trait ReactiveNode {
    /// A source this node read may have changed. Called at write time.
    fn notify(&self);
    /// Record a `(source, version-at-read)` pair during a tracked run.
    fn record(&self, source: Rc<dyn Source>, seen: u64);
}

/// Source side of the graph: something that can be observed.
pub(crate) trait Source {
    /// Current write/compute version.
    fn version(&self) -> u64;
    /// Bring the node up to date (deriveds recompute if actually stale).
    fn sync(&self);
    fn add_dependent(&self, id: NodeId, dep: Weak<dyn ReactiveNode>);
    fn remove_dependent(&self, id: NodeId);
}

// =============================================================================
// Dependent list (shared by every source type)
// =============================================================================

/// Weak, deduplicated list of dependents.
#[derive(Default)]
pub(crate) struct DependentList {
    entries: RefCell<Vec<(NodeId, Weak<dyn ReactiveNode>)>>,
}

impl DependentList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, id: NodeId, dep: Weak<dyn ReactiveNode>) {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|(existing, _)| *existing == id) {
            return;
        }
        entries.push((id, dep));
    }

    pub(crate) fn remove(&self, id: NodeId) {
        self.entries
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    /// Notify every live dependent, pruning dead weak entries.
    pub(crate) fn notify_all(&self) {
        // Upgrade first so handlers may re-borrow the list (e.g. resubscribe).
        let live: Vec<Rc<dyn ReactiveNode>> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|(_, weak)| weak.strong_count() > 0);
            entries
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };
        for dep in live {
            dep.notify();
        }
    }
}

// =============================================================================
// Thread-local runtime state
// =============================================================================

struct Runtime {
    observer: RefCell<Option<Rc<dyn ReactiveNode>>>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
    queue: RefCell<VecDeque<Rc<EffectInner>>>,
    next_version: Cell<u64>,
}

thread_local! {
    static RUNTIME: Runtime = Runtime {
        observer: RefCell::new(None),
        batch_depth: Cell::new(0),
        flushing: Cell::new(false),
        queue: RefCell::new(VecDeque::new()),
        // Version 0 is reserved for "never written/computed".
        next_version: Cell::new(1),
    };
}

/// Allocate the next global version stamp.
pub(crate) fn next_version() -> u64 {
    RUNTIME.with(|rt| {
        let v = rt.next_version.get();
        rt.next_version.set(v + 1);
        v
    })
}

/// Swap the current observer, returning the previous one.
pub(crate) fn set_observer(observer: Option<Rc<dyn ReactiveNode>>) -> Option<Rc<dyn ReactiveNode>> {
    RUNTIME.with(|rt| rt.observer.replace(observer))
}

/// Record a read of `source` in the current tracking scope, if any.
pub(crate) fn track_read(source: &Rc<dyn Source>, seen: u64) {
    RUNTIME.with(|rt| {
        let observer = rt.observer.borrow().clone();
        if let Some(obs) = observer {
            let id = Rc::as_ptr(&obs) as *const () as NodeId;
            source.add_dependent(id, Rc::downgrade(&obs));
            obs.record(source.clone(), seen);
        }
    });
}

/// Run `f` with tracking suspended.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let prev = set_observer(None);
    let result = f();
    set_observer(prev);
    result
}

// =============================================================================
// Effect queue
// =============================================================================

pub(crate) fn enqueue_effect(effect: Rc<EffectInner>) {
    RUNTIME.with(|rt| rt.queue.borrow_mut().push_back(effect));
}

/// Drain the pending-effect queue unless a batch or flush is in progress.
pub(crate) fn flush_if_idle() {
    let idle = RUNTIME.with(|rt| rt.batch_depth.get() == 0 && !rt.flushing.get());
    if idle {
        drain_queue();
    }
}

fn drain_queue() {
    RUNTIME.with(|rt| rt.flushing.set(true));
    loop {
        let next = RUNTIME.with(|rt| rt.queue.borrow_mut().pop_front());
        match next {
            Some(effect) => EffectInner::flush_run(&effect),
            None => break,
        }
    }
    RUNTIME.with(|rt| rt.flushing.set(false));
}

/// Coalesce writes: dependents are marked during `f` but effects only run
/// once the outermost batch returns.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
    let result = f();
    let depth = RUNTIME.with(|rt| {
        let d = rt.batch_depth.get() - 1;
        rt.batch_depth.set(d);
        d
    });
    if depth == 0 {
        flush_if_idle();
    }
    result
}

/// Drain pending effect re-runs immediately, even inside a batch.
pub fn flush_sync() {
    let flushing = RUNTIME.with(|rt| rt.flushing.get());
    if !flushing {
        drain_queue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_monotonic() {
        let a = next_version();
        let b = next_version();
        assert!(b > a);
    }

    #[test]
    fn untracked_restores_observer() {
        // No observer active: untracked is a plain call.
        let out = untracked(|| 42);
        assert_eq!(out, 42);
    }
}
