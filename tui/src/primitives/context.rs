//! Context: lexically scoped values resolved through the component tree.
//!
//! `provide` attaches a value to the component whose children closure is
//! executing; `use_context` walks the parent chain from the current
//! component at creation time. When the provided value is a signal, reads
//! through it stay reactive.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::engine::{current_component, get_current_parent_index};

thread_local! {
    static NEXT_CONTEXT_ID: Cell<usize> = const { Cell::new(0) };

    /// (component index, context id) → provided value.
    static VALUES: RefCell<HashMap<(usize, usize), Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// A typed context handle. Clone it into any closure that provides or
/// consumes the value.
pub struct Context<T: Clone + 'static> {
    id: usize,
    default: T,
    _marker: PhantomData<T>,
}

impl<T: Clone + 'static> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            default: self.default.clone(),
            _marker: PhantomData,
        }
    }
}

/// Create a context with a fallback value for consumers without a provider.
pub fn create_context<T: Clone + 'static>(default: T) -> Context<T> {
    let id = NEXT_CONTEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    });
    Context {
        id,
        default,
        _marker: PhantomData,
    }
}

/// Provide `value` for the current component's subtree. Outside a
/// primitive's children closure this warns and does nothing.
pub fn provide<T: Clone + 'static>(context: &Context<T>, value: T) {
    let Some(index) = current_component() else {
        log::warn!("provide() called outside a component; ignored");
        return;
    };
    VALUES.with(|values| {
        values
            .borrow_mut()
            .insert((index, context.id), Rc::new(value));
    });
}

/// Resolve the context at creation time: current component first, then its
/// ancestors, then the default.
pub fn use_context<T: Clone + 'static>(context: &Context<T>) -> T {
    let mut cursor = current_component().or_else(get_current_parent_index);
    while let Some(index) = cursor {
        let found = VALUES.with(|values| {
            values
                .borrow()
                .get(&(index, context.id))
                .and_then(|any| any.downcast_ref::<T>().cloned())
        });
        if let Some(value) = found {
            return value;
        }
        cursor = crate::engine::arrays::core::peek_parent_index(index);
    }
    context.default.clone()
}

/// Drop every value a released component provided.
pub(crate) fn clear_index(index: usize) {
    VALUES.with(|values| {
        values.borrow_mut().retain(|(owner, _), _| *owner != index);
    });
}

pub fn reset_context_state() {
    VALUES.with(|values| values.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::core;
    use crate::engine::{
        allocate_index, pop_current_component, push_current_component, release_index,
        reset_registry,
    };

    #[test]
    fn falls_back_to_default() {
        reset_registry();
        let theme = create_context("dark");
        assert_eq!(use_context(&theme), "dark");
    }

    #[test]
    fn resolves_through_parent_chain() {
        reset_registry();
        let depth = create_context(0usize);

        let parent = allocate_index(None);
        let child = allocate_index(None);
        core::set_parent_index(child, Some(parent));

        push_current_component(parent);
        provide(&depth, 5);
        pop_current_component();

        // From inside the child's children closure the parent's value wins.
        push_current_component(child);
        assert_eq!(use_context(&depth), 5);
        pop_current_component();
    }

    #[test]
    fn nearest_provider_wins() {
        reset_registry();
        let label = create_context("root");

        let outer = allocate_index(None);
        let inner = allocate_index(None);
        core::set_parent_index(inner, Some(outer));

        push_current_component(outer);
        provide(&label, "outer");
        pop_current_component();
        push_current_component(inner);
        provide(&label, "inner");
        assert_eq!(use_context(&label), "inner");
        pop_current_component();
    }

    #[test]
    fn release_clears_provided_values() {
        reset_registry();
        let flag = create_context(false);

        let index = allocate_index(None);
        push_current_component(index);
        provide(&flag, true);
        assert_eq!(use_context(&flag), true);
        pop_current_component();

        release_index(index);
        push_current_component(index);
        assert_eq!(use_context(&flag), false, "value gone after release");
        pop_current_component();
    }
}
