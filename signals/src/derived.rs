//! Derived - memoized computation with lazy, version-checked validation.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::runtime::{self, DependentList, NodeId, ReactiveNode, Source};

type EqFn<T> = Box<dyn Fn(&T, &T) -> bool>;

pub(crate) struct DerivedInner<T, F> {
    compute: F,
    /// Optional equality predicate: when a recompute yields an equal value
    /// the version does not advance, so dependents stay cached.
    eq: Option<EqFn<T>>,
    value: RefCell<Option<T>>,
    version: Cell<u64>,
    /// Set by `notify`, cleared once sources have been verified.
    stale: Cell<bool>,
    computing: Cell<bool>,
    sources: RefCell<Vec<(Rc<dyn Source>, u64)>>,
    dependents: DependentList,
    self_weak: Weak<DerivedInner<T, F>>,
}

impl<T: Clone + 'static, F: Fn() -> T + 'static> DerivedInner<T, F> {
    fn id(&self) -> NodeId {
        self as *const Self as *const () as NodeId
    }

    /// Validate the cache: recompute only if never computed or a recorded
    /// source version has actually advanced.
    fn validate(this: &Rc<Self>) {
        if this.computing.get() {
            panic!("derived cycle detected: a derived computation read its own value");
        }
        if this.value.borrow().is_none() {
            Self::recompute(this);
            return;
        }
        if !this.stale.get() {
            return;
        }

        let sources = this.sources.borrow().clone();
        let mut changed = false;
        for (source, seen) in sources {
            source.sync();
            if source.version() != seen {
                changed = true;
                break;
            }
        }
        if changed {
            Self::recompute(this);
        } else {
            this.stale.set(false);
        }
    }

    fn recompute(this: &Rc<Self>) {
        // Detach from previous sources before re-tracking.
        let id = this.id();
        for (source, _) in this.sources.borrow_mut().drain(..) {
            source.remove_dependent(id);
        }

        this.computing.set(true);
        let observer: Rc<dyn ReactiveNode> = this.clone();
        let prev = runtime::set_observer(Some(observer));
        let next = (this.compute)();
        runtime::set_observer(prev);
        this.computing.set(false);
        this.stale.set(false);

        let advanced = {
            let current = this.value.borrow();
            match (current.as_ref(), this.eq.as_ref()) {
                (Some(old), Some(eq)) => !eq(old, &next),
                _ => true,
            }
        };
        *this.value.borrow_mut() = Some(next);
        if advanced {
            this.version.set(runtime::next_version());
        }
    }
}

impl<T: Clone + 'static, F: Fn() -> T + 'static> ReactiveNode for DerivedInner<T, F> {
    fn notify(&self) {
        if !self.stale.get() && !self.computing.get() {
            self.stale.set(true);
            // Forward once; dependents verify versions on their next read.
            self.dependents.notify_all();
        }
    }

    fn record(&self, source: Rc<dyn Source>, seen: u64) {
        self.sources.borrow_mut().push((source, seen));
    }
}

impl<T: Clone + 'static, F: Fn() -> T + 'static> Source for DerivedInner<T, F> {
    fn version(&self) -> u64 {
        self.version.get()
    }

    fn sync(&self) {
        if let Some(rc) = self.self_weak.upgrade() {
            Self::validate(&rc);
        }
    }

    fn add_dependent(&self, id: NodeId, dep: Weak<dyn ReactiveNode>) {
        self.dependents.add(id, dep);
    }

    fn remove_dependent(&self, id: NodeId) {
        self.dependents.remove(id);
    }
}

/// A memoized reactive computation.
///
/// `get()` returns the cached value when no recorded dependency has changed
/// since the last compute; otherwise it recomputes inside a tracking scope.
/// Deriveds are first-class sources for other deriveds and effects.
pub struct Derived<T: 'static, F: 'static> {
    inner: Rc<DerivedInner<T, F>>,
}

impl<T: 'static, F: 'static> Clone for Derived<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Create a derived computation.
pub fn derived<T, F>(compute: F) -> Derived<T, F>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    make(compute, None)
}

/// Create a derived with an equality predicate. When a recompute yields an
/// equal value, dependents of this derived are not invalidated.
pub fn derived_eq<T, F>(compute: F, eq: impl Fn(&T, &T) -> bool + 'static) -> Derived<T, F>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    make(compute, Some(Box::new(eq)))
}

fn make<T, F>(compute: F, eq: Option<EqFn<T>>) -> Derived<T, F>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    let inner = Rc::new_cyclic(|weak| DerivedInner {
        compute,
        eq,
        value: RefCell::new(None),
        version: Cell::new(0),
        stale: Cell::new(false),
        computing: Cell::new(false),
        sources: RefCell::new(Vec::new()),
        dependents: DependentList::new(),
        self_weak: weak.clone(),
    });
    Derived { inner }
}

impl<T: Clone + 'static, F: Fn() -> T + 'static> Derived<T, F> {
    /// Read the (validated) value, recording a dependency in the current
    /// tracking scope.
    pub fn get(&self) -> T {
        DerivedInner::validate(&self.inner);
        let source: Rc<dyn Source> = self.inner.clone();
        runtime::track_read(&source, self.inner.version.get());
        self.inner
            .value
            .borrow()
            .as_ref()
            .expect("derived value present after validate")
            .clone()
    }

    /// Read without tracking.
    pub fn peek(&self) -> T {
        runtime::untracked(|| self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::signal;
    use std::cell::Cell as StdCell;
    use std::rc::Rc as StdRc;

    #[test]
    fn caches_until_dependency_changes() {
        let source = signal(1);
        let runs = StdRc::new(StdCell::new(0));

        let s = source.clone();
        let r = runs.clone();
        let double = derived(move || {
            r.set(r.get() + 1);
            s.get() * 2
        });

        assert_eq!(double.get(), 2);
        assert_eq!(double.get(), 2);
        assert_eq!(runs.get(), 1, "second read must hit the cache");

        source.set(3);
        assert_eq!(double.get(), 6);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn equal_write_does_not_recompute() {
        let source = signal(1);
        let runs = StdRc::new(StdCell::new(0));

        let s = source.clone();
        let r = runs.clone();
        let d = derived(move || {
            r.set(r.get() + 1);
            s.get()
        });

        let _ = d.get();
        source.set(1); // equal write: no-op
        let _ = d.get();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn chains_through_deriveds() {
        let source = signal(2);
        let s = source.clone();
        let a = derived(move || s.get() + 1);
        let a2 = a.clone();
        let b = derived(move || a2.get() * 10);

        assert_eq!(b.get(), 30);
        source.set(4);
        assert_eq!(b.get(), 50);
    }

    #[test]
    fn equality_suppresses_downstream() {
        let source = signal(1);
        let downstream_runs = StdRc::new(StdCell::new(0));

        let s = source.clone();
        // Parity only changes when the value's evenness flips.
        let parity = derived_eq(move || s.get() % 2, |a, b| a == b);
        let p = parity.clone();
        let r = downstream_runs.clone();
        let label = derived(move || {
            r.set(r.get() + 1);
            if p.get() == 0 { "even" } else { "odd" }
        });

        assert_eq!(label.get(), "odd");
        source.set(3); // parity unchanged
        assert_eq!(label.get(), "odd");
        assert_eq!(downstream_runs.get(), 1, "downstream stays cached");

        source.set(4);
        assert_eq!(label.get(), "even");
        assert_eq!(downstream_runs.get(), 2);
    }

    #[test]
    #[should_panic(expected = "cycle detected")]
    fn self_read_panics() {
        let holder: StdRc<RefCell<Option<Box<dyn Fn() -> i32>>>> =
            StdRc::new(RefCell::new(None));
        let h = holder.clone();
        let d = derived(move || {
            if let Some(read) = h.borrow().as_ref() {
                return read();
            }
            0
        });
        let d2 = d.clone();
        *holder.borrow_mut() = Some(Box::new(move || d2.get()));
        // The compute now reads its own value: recomputing must fail fast.
        DerivedInner::recompute(&d.inner);
    }
}
