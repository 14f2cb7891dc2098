//! Reactive collections: sets and maps that invalidate iterating deriveds.
//!
//! Both carry a single version: any membership change notifies every
//! dependent that iterated, counted, or probed the collection. That is the
//! right granularity for the component registry's live set, where consumers
//! (layout, frame buffer) walk the whole collection anyway.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::runtime::{self, DependentList, NodeId, ReactiveNode, Source};

struct CollectionCore {
    version: Cell<u64>,
    dependents: DependentList,
}

impl CollectionCore {
    fn new() -> Self {
        Self {
            version: Cell::new(runtime::next_version()),
            dependents: DependentList::new(),
        }
    }

    fn changed(&self) {
        self.version.set(runtime::next_version());
        self.dependents.notify_all();
        runtime::flush_if_idle();
    }
}

impl Source for CollectionCore {
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

// =============================================================================
// ReactiveSet
// =============================================================================

struct SetInner<T> {
    items: RefCell<HashSet<T>>,
    core: CollectionCore,
}

/// A `HashSet` whose readers (iteration, length, membership) become reactive
/// dependents; insert/remove notify only on actual membership change.
pub struct ReactiveSet<T: 'static> {
    inner: Rc<SetInner<T>>,
}

impl<T: 'static> Clone for ReactiveSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Eq + Hash + Clone + 'static> ReactiveSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SetInner {
                items: RefCell::new(HashSet::new()),
                core: CollectionCore::new(),
            }),
        }
    }

    fn track(&self) {
        let source: Rc<dyn Source> = self.inner.clone();
        runtime::track_read(&source, self.inner.core.version.get());
    }

    /// Insert; returns true when the element was not present.
    pub fn insert(&self, value: T) -> bool {
        let added = self.inner.items.borrow_mut().insert(value);
        if added {
            self.inner.core.changed();
        }
        added
    }

    /// Remove; returns true when the element was present.
    pub fn remove(&self, value: &T) -> bool {
        let removed = self.inner.items.borrow_mut().remove(value);
        if removed {
            self.inner.core.changed();
        }
        removed
    }

    /// Membership probe (tracks).
    pub fn contains(&self, value: &T) -> bool {
        self.track();
        self.inner.items.borrow().contains(value)
    }

    /// Snapshot of the elements (tracks). Order is unspecified.
    pub fn iter(&self) -> Vec<T> {
        self.track();
        self.inner.items.borrow().iter().cloned().collect()
    }

    /// Element count (tracks).
    pub fn len(&self) -> usize {
        self.track();
        self.inner.items.borrow().len()
    }

    /// Emptiness probe (tracks).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every element (single notification).
    pub fn clear(&self) {
        let was_empty = self.inner.items.borrow().is_empty();
        self.inner.items.borrow_mut().clear();
        if !was_empty {
            self.inner.core.changed();
        }
    }
}

impl<T: Eq + Hash + Clone + 'static> Default for ReactiveSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Source for SetInner<T> {
    fn version(&self) -> u64 {
        self.core.version()
    }

    fn sync(&self) {}

    fn add_dependent(&self, id: NodeId, dep: Weak<dyn ReactiveNode>) {
        self.core.add_dependent(id, dep);
    }

    fn remove_dependent(&self, id: NodeId) {
        self.core.remove_dependent(id);
    }
}

// =============================================================================
// ReactiveMap
// =============================================================================

struct MapInner<K, V> {
    items: RefCell<HashMap<K, V>>,
    core: CollectionCore,
}

impl<K: 'static, V: 'static> Source for MapInner<K, V> {
    fn version(&self) -> u64 {
        self.core.version()
    }

    fn sync(&self) {}

    fn add_dependent(&self, id: NodeId, dep: Weak<dyn ReactiveNode>) {
        self.core.add_dependent(id, dep);
    }

    fn remove_dependent(&self, id: NodeId) {
        self.core.remove_dependent(id);
    }
}

/// A `HashMap` with the same one-version reactivity as [`ReactiveSet`].
pub struct ReactiveMap<K: 'static, V: 'static> {
    inner: Rc<MapInner<K, V>>,
}

impl<K: 'static, V: 'static> Clone for ReactiveMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Eq + Hash + Clone + 'static, V: Clone + PartialEq + 'static> ReactiveMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(MapInner {
                items: RefCell::new(HashMap::new()),
                core: CollectionCore::new(),
            }),
        }
    }

    fn track(&self) {
        let source: Rc<dyn Source> = self.inner.clone();
        runtime::track_read(&source, self.inner.core.version.get());
    }

    /// Insert or replace. Replacing with an equal value is a no-op.
    pub fn insert(&self, key: K, value: V) {
        {
            let items = self.inner.items.borrow();
            if items.get(&key) == Some(&value) {
                return;
            }
        }
        self.inner.items.borrow_mut().insert(key, value);
        self.inner.core.changed();
    }

    /// Remove a key, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.inner.items.borrow_mut().remove(key);
        if removed.is_some() {
            self.inner.core.changed();
        }
        removed
    }

    /// Lookup (tracks).
    pub fn get(&self, key: &K) -> Option<V> {
        self.track();
        self.inner.items.borrow().get(key).cloned()
    }

    /// Membership probe (tracks).
    pub fn contains_key(&self, key: &K) -> bool {
        self.track();
        self.inner.items.borrow().contains_key(key)
    }

    /// Snapshot of entries (tracks). Order is unspecified.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.track();
        self.inner
            .items
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Entry count (tracks).
    pub fn len(&self) -> usize {
        self.track();
        self.inner.items.borrow().len()
    }

    /// Emptiness probe (tracks).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry (single notification).
    pub fn clear(&self) {
        let was_empty = self.inner.items.borrow().is_empty();
        self.inner.items.borrow_mut().clear();
        if !was_empty {
            self.inner.core.changed();
        }
    }
}

impl<K: Eq + Hash + Clone + 'static, V: Clone + PartialEq + 'static> Default for ReactiveMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::derived;
    use std::cell::Cell as StdCell;
    use std::rc::Rc as StdRc;

    #[test]
    fn set_invalidates_iterating_derived() {
        let set: ReactiveSet<usize> = ReactiveSet::new();
        let runs = StdRc::new(StdCell::new(0));

        let s = set.clone();
        let r = runs.clone();
        let count = derived(move || {
            r.set(r.get() + 1);
            s.len()
        });

        assert_eq!(count.get(), 0);
        set.insert(1);
        assert_eq!(count.get(), 1);
        set.insert(1); // already present: no invalidation
        assert_eq!(count.get(), 1);
        assert_eq!(runs.get(), 2);

        set.remove(&1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn map_equal_insert_is_noop() {
        let map: ReactiveMap<String, u16> = ReactiveMap::new();
        map.insert("w".into(), 80);
        let v = map.inner.core.version.get();
        map.insert("w".into(), 80);
        assert_eq!(map.inner.core.version.get(), v);
        map.insert("w".into(), 100);
        assert!(map.inner.core.version.get() > v);
    }

    #[test]
    fn map_get_and_remove() {
        let map: ReactiveMap<&'static str, i32> = ReactiveMap::new();
        map.insert("a", 1);
        assert_eq!(map.get(&"a"), Some(1));
        assert_eq!(map.remove(&"a"), Some(1));
        assert_eq!(map.get(&"a"), None);
        assert!(map.is_empty());
    }
}
