//! Component registry - dense index allocation for the parallel arrays.
//!
//! Owns the index lifecycle:
//! - id ↔ index bidirectional mapping (idempotent allocation by id)
//! - free-index pool for O(1) reuse
//! - reactive live set (deriveds that iterate it react to add/remove)
//! - parent-context and current-component stacks
//! - destroy callbacks and the empty-reset

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use weft_signals::{untracked, ReactiveSet};

use super::arrays;
use super::node_registry;
use crate::error::{self, EngineError};

thread_local! {
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Reactive set of allocated indices; layout and frame buffer iterate it.
    static ALLOCATED: ReactiveSet<usize> = ReactiveSet::new();

    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Parents for nested primitive creation.
    static PARENT_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Component whose children closure is currently executing; drives
    /// on_mount/on_destroy/use_context resolution.
    static CURRENT_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> =
        RefCell::new(HashMap::new());
}

// =============================================================================
// Parent / current context stacks
// =============================================================================

pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

pub fn current_component() -> Option<usize> {
    CURRENT_STACK.with(|stack| stack.borrow().last().copied())
}

pub fn push_current_component(index: usize) {
    CURRENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

pub fn pop_current_component() {
    CURRENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

// =============================================================================
// Allocation
// =============================================================================

/// Allocate an index. With an explicit `id`, allocation is idempotent: a
/// second call with the same id returns the existing index.
pub fn allocate_index(id: Option<&str>) -> usize {
    let component_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let generated = format!("c{}", *counter);
            *counter += 1;
            generated
        }),
    };

    if let Some(existing) = ID_TO_INDEX.with(|map| map.borrow().get(&component_id).copied()) {
        return existing;
    }

    let index = FREE_INDICES.with(|free| free.borrow_mut().pop()).unwrap_or_else(|| {
        NEXT_INDEX.with(|next| {
            let mut next = next.borrow_mut();
            let index = *next;
            *next += 1;
            index
        })
    });

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().insert(component_id.clone(), index);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().insert(index, component_id);
    });
    ALLOCATED.with(|set| {
        set.insert(index);
    });

    arrays::ensure_all_capacity(index);
    index
}

// =============================================================================
// Release
// =============================================================================

/// Release `index` and every descendant, leaf-first.
///
/// Descendants are collected with an iterative BFS over `parent_index` (a
/// recursive walk would overflow the call stack on very deep trees). The
/// whole traversal is untracked so cleanup running inside an effect does not
/// subscribe that effect to the live set. Unknown indices are a no-op.
pub fn release_index(index: usize) {
    let known = INDEX_TO_ID.with(|map| map.borrow().contains_key(&index));
    if !known {
        return;
    }

    // BFS: `order` ends up parents-before-children; free in reverse.
    let order = untracked(|| {
        let live = ALLOCATED.with(|set| set.iter());
        let mut order = vec![index];
        let mut head = 0;
        while head < order.len() {
            let parent = order[head];
            head += 1;
            for &candidate in &live {
                if arrays::core::peek_parent_index(candidate) == Some(parent)
                    && !order.contains(&candidate)
                {
                    order.push(candidate);
                }
            }
        }
        order
    });

    for &victim in order.iter().rev() {
        release_single(victim);
    }

    let empty = untracked(|| ALLOCATED.with(|set| set.is_empty()));
    if empty {
        arrays::reset_all_arrays();
        node_registry::reset_layout_nodes();
        crate::layout::reset_layout_scratch();
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

fn release_single(index: usize) {
    let Some(id) = INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned()) else {
        return;
    };

    run_destroy_callbacks(index);
    node_registry::destroy_layout_node(index);
    crate::primitives::context::clear_index(index);

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&id);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().remove(&index);
    });
    ALLOCATED.with(|set| {
        set.remove(&index);
    });

    arrays::clear_all_at_index(index);
    FREE_INDICES.with(|free| free.borrow_mut().push(index));
}

// =============================================================================
// Destroy callbacks
// =============================================================================

/// Register a callback to run when `index` is released.
pub fn add_destroy_callback(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    let Some(callbacks) = callbacks else { return };
    for callback in callbacks {
        // A panicking callback must not prevent the remaining ones.
        if catch_unwind(AssertUnwindSafe(callback)).is_err() {
            error::report(&EngineError::CleanupPanicked { index });
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

pub fn get_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// Snapshot of the live set. Reactive when read from a derived or effect.
pub fn get_allocated_indices() -> Vec<usize> {
    ALLOCATED.with(|set| set.iter())
}

pub fn is_allocated(index: usize) -> bool {
    ALLOCATED.with(|set| set.contains(&index))
}

pub fn get_allocated_count() -> usize {
    untracked(|| ALLOCATED.with(|set| set.len()))
}

// =============================================================================
// Reset (test isolation)
// =============================================================================

pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    ALLOCATED.with(|set| set.clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    CURRENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
    node_registry::reset_layout_nodes();
    arrays::reset_all_arrays();
    crate::layout::reset_layout_scratch();
    crate::primitives::context::reset_context_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn allocate_and_reuse() {
        reset_registry();

        let a = allocate_index(None);
        let b = allocate_index(None);
        assert_eq!((a, b), (0, 1));
        assert_eq!(get_allocated_count(), 2);

        release_index(a);
        assert!(!is_allocated(a));
        let c = allocate_index(None);
        assert_eq!(c, a, "freed index is reused");
    }

    #[test]
    fn id_allocation_is_idempotent() {
        reset_registry();
        let first = allocate_index(Some("sidebar"));
        let second = allocate_index(Some("sidebar"));
        assert_eq!(first, second);
        assert_eq!(get_index("sidebar"), Some(first));
        assert_eq!(get_id(first).as_deref(), Some("sidebar"));
    }

    #[test]
    fn release_is_recursive_and_leaf_first() {
        reset_registry();

        let root = allocate_index(None);
        let child = allocate_index(None);
        let grandchild = allocate_index(None);
        arrays::core::set_parent_index(child, Some(root));
        arrays::core::set_parent_index(grandchild, Some(child));

        let order: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        for &i in &[root, child, grandchild] {
            let o = order.clone();
            add_destroy_callback(i, move || o.borrow_mut().push(i));
        }

        release_index(root);
        assert_eq!(get_allocated_count(), 0);
        assert_eq!(*order.borrow(), vec![grandchild, child, root]);
    }

    #[test]
    fn empty_reset_restarts_from_zero() {
        reset_registry();
        let a = allocate_index(None);
        let b = allocate_index(None);
        release_index(b);
        release_index(a);

        // Live set emptied: counter and pool reset.
        let fresh = allocate_index(None);
        assert_eq!(fresh, 0);
    }

    #[test]
    fn release_unknown_is_noop() {
        reset_registry();
        release_index(42);
        assert_eq!(get_allocated_count(), 0);
    }

    #[test]
    fn panicking_destroy_callback_does_not_stop_others() {
        reset_registry();
        let ran = Rc::new(Cell::new(false));

        let index = allocate_index(None);
        add_destroy_callback(index, || panic!("boom"));
        let r = ran.clone();
        add_destroy_callback(index, move || r.set(true));

        release_index(index);
        assert!(ran.get());
    }

    #[test]
    fn context_stacks() {
        reset_registry();
        assert_eq!(get_current_parent_index(), None);
        push_parent_context(5);
        push_parent_context(9);
        assert_eq!(get_current_parent_index(), Some(9));
        pop_parent_context();
        assert_eq!(get_current_parent_index(), Some(5));
        pop_parent_context();
        assert_eq!(get_current_parent_index(), None);

        assert_eq!(current_component(), None);
        push_current_component(3);
        assert_eq!(current_component(), Some(3));
        pop_current_component();
        assert_eq!(current_component(), None);
    }
}
