//! Effect - side-effect closures, and EffectScope for batched disposal.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::runtime::{self, NodeId, ReactiveNode, Source};

pub(crate) struct EffectInner {
    body: RefCell<Box<dyn FnMut()>>,
    sources: RefCell<Vec<(Rc<dyn Source>, u64)>>,
    scheduled: Cell<bool>,
    disposed: Cell<bool>,
    running: Cell<bool>,
    self_weak: Weak<EffectInner>,
}

impl EffectInner {
    fn id(&self) -> NodeId {
        self as *const Self as *const () as NodeId
    }

    fn run(this: &Rc<Self>) {
        if this.disposed.get() || this.running.get() {
            return;
        }
        let id = this.id();
        for (source, _) in this.sources.borrow_mut().drain(..) {
            source.remove_dependent(id);
        }

        this.running.set(true);
        let observer: Rc<dyn ReactiveNode> = this.clone();
        let prev = runtime::set_observer(Some(observer));
        (this.body.borrow_mut())();
        runtime::set_observer(prev);
        this.running.set(false);
    }

    /// Run from the flush queue: skip when no recorded source actually
    /// changed (an equality-suppressed derived notifies without advancing).
    pub(crate) fn flush_run(this: &Rc<Self>) {
        this.scheduled.set(false);
        if this.disposed.get() {
            return;
        }
        let sources = this.sources.borrow().clone();
        let mut changed = sources.is_empty();
        for (source, seen) in sources {
            source.sync();
            if source.version() != seen {
                changed = true;
                break;
            }
        }
        if changed {
            Self::run(this);
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let id = self.id();
        for (source, _) in self.sources.borrow_mut().drain(..) {
            source.remove_dependent(id);
        }
    }
}

impl ReactiveNode for EffectInner {
    fn notify(&self) {
        if self.disposed.get() || self.scheduled.replace(true) {
            return;
        }
        if let Some(rc) = self.self_weak.upgrade() {
            runtime::enqueue_effect(rc);
        }
    }

    fn record(&self, source: Rc<dyn Source>, seen: u64) {
        self.sources.borrow_mut().push((source, seen));
    }
}

/// Create an effect: `body` runs immediately under tracking and re-runs once
/// per flush after any dependency write. The returned disposer stops the
/// effect and detaches it from the dependency graph.
pub fn effect(body: impl FnMut() + 'static) -> impl FnOnce() {
    let inner = Rc::new_cyclic(|weak| EffectInner {
        body: RefCell::new(Box::new(body)),
        sources: RefCell::new(Vec::new()),
        scheduled: Cell::new(false),
        disposed: Cell::new(false),
        running: Cell::new(false),
        self_weak: weak.clone(),
    });

    EffectInner::run(&inner);

    // Keep the effect alive through the scope (if any) and the disposer.
    let for_scope = inner.clone();
    register_with_scope(Box::new(move || for_scope.dispose()));

    move || inner.dispose()
}

// =============================================================================
// EffectScope
// =============================================================================

struct ScopeInner {
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    stopped: Cell<bool>,
}

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Rc<ScopeInner>>> = RefCell::new(Vec::new());
}

fn register_with_scope(cleanup: Box<dyn FnOnce()>) {
    SCOPE_STACK.with(|stack| {
        if let Some(scope) = stack.borrow().last() {
            scope.cleanups.borrow_mut().push(cleanup);
        }
    });
}

/// A container collecting effect disposers and [`on_scope_dispose`] callbacks
/// registered during [`EffectScope::run`]. Stopping the scope disposes them
/// all in LIFO order. Scopes nest: a child scope created inside `run` is
/// stopped with its parent.
pub struct EffectScope {
    inner: Rc<ScopeInner>,
}

/// Create a new effect scope. If another scope is active, the new scope is
/// registered with it so parent disposal cascades.
pub fn effect_scope() -> EffectScope {
    let inner = Rc::new(ScopeInner {
        cleanups: RefCell::new(Vec::new()),
        stopped: Cell::new(false),
    });
    let child = inner.clone();
    register_with_scope(Box::new(move || stop_inner(&child)));
    EffectScope { inner }
}

fn stop_inner(inner: &Rc<ScopeInner>) {
    if inner.stopped.replace(true) {
        return;
    }
    // LIFO: most recently registered cleanup first.
    loop {
        let cleanup = inner.cleanups.borrow_mut().pop();
        match cleanup {
            Some(f) => f(),
            None => break,
        }
    }
}

impl EffectScope {
    /// Run `f` with this scope active; effects and dispose callbacks created
    /// inside are collected for later [`stop`](Self::stop).
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        SCOPE_STACK.with(|stack| stack.borrow_mut().push(self.inner.clone()));
        let result = f();
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
        result
    }

    /// Dispose every collected effect and cleanup, LIFO. Idempotent.
    pub fn stop(&self) {
        stop_inner(&self.inner);
    }

    /// Whether the scope has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }
}

/// Register a cleanup to run when the active scope stops. Outside any scope
/// this logs a warning and does nothing.
pub fn on_scope_dispose(cleanup: impl FnOnce() + 'static) {
    let registered = SCOPE_STACK.with(|stack| {
        if let Some(scope) = stack.borrow().last() {
            scope.cleanups.borrow_mut().push(Box::new(cleanup));
            true
        } else {
            false
        }
    });
    if !registered {
        log::warn!("on_scope_dispose called outside an effect scope; ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::signal;
    use std::cell::Cell as StdCell;
    use std::rc::Rc as StdRc;

    #[test]
    fn effect_runs_immediately_and_on_write() {
        let count = signal(0);
        let runs = StdRc::new(StdCell::new(0));

        let c = count.clone();
        let r = runs.clone();
        let _stop = effect(move || {
            let _ = c.get();
            r.set(r.get() + 1);
        });

        assert_eq!(runs.get(), 1);
        count.set(1);
        assert_eq!(runs.get(), 2);
        count.set(1); // equal write: no rerun
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn disposer_stops_reruns() {
        let count = signal(0);
        let runs = StdRc::new(StdCell::new(0));

        let c = count.clone();
        let r = runs.clone();
        let stop = effect(move || {
            let _ = c.get();
            r.set(r.get() + 1);
        });

        stop();
        count.set(5);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn batch_coalesces_writes() {
        let a = signal(0);
        let b = signal(0);
        let runs = StdRc::new(StdCell::new(0));

        let (ea, eb) = (a.clone(), b.clone());
        let r = runs.clone();
        let _stop = effect(move || {
            let _ = ea.get();
            let _ = eb.get();
            r.set(r.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        crate::runtime::batch(|| {
            a.set(1);
            b.set(2);
        });
        assert_eq!(runs.get(), 2, "one rerun for the whole batch");
    }

    #[test]
    fn effect_writing_signal_enqueues_followups() {
        let first = signal(0);
        let second = signal(0);
        let observed = StdRc::new(StdCell::new(0));

        let (f, s) = (first.clone(), second.clone());
        let _forward = effect(move || {
            let v = f.get();
            s.set(v * 10);
        });

        let s2 = second.clone();
        let o = observed.clone();
        let _watch = effect(move || {
            o.set(s2.get());
        });

        first.set(3);
        assert_eq!(observed.get(), 30);
    }

    #[test]
    fn scope_stop_disposes_lifo() {
        let order = StdRc::new(RefCell::new(Vec::new()));
        let scope = effect_scope();

        let (o1, o2) = (order.clone(), order.clone());
        scope.run(|| {
            on_scope_dispose(move || o1.borrow_mut().push("first"));
            on_scope_dispose(move || o2.borrow_mut().push("second"));
        });

        scope.stop();
        assert_eq!(*order.borrow(), vec!["second", "first"]);
        // Idempotent.
        scope.stop();
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn nested_scope_stops_with_parent() {
        let stopped = StdRc::new(StdCell::new(false));
        let parent = effect_scope();

        let flag = stopped.clone();
        parent.run(|| {
            let child = effect_scope();
            child.run(|| {
                on_scope_dispose(move || flag.set(true));
            });
        });

        parent.stop();
        assert!(stopped.get());
    }

    #[test]
    fn scope_disposes_contained_effects() {
        let count = signal(0);
        let runs = StdRc::new(StdCell::new(0));
        let scope = effect_scope();

        let c = count.clone();
        let r = runs.clone();
        scope.run(|| {
            let _stop = effect(move || {
                let _ = c.get();
                r.set(r.get() + 1);
            });
        });

        assert_eq!(runs.get(), 1);
        scope.stop();
        count.set(9);
        assert_eq!(runs.get(), 1, "effect must not rerun after scope stop");
    }
}
