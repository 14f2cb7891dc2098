//! Lifecycle hooks: on_mount and on_destroy.
//!
//! Both resolve against the component whose children closure is currently
//! running. Mount callbacks fire synchronously when the primitive finishes
//! setting up its arrays, before the first frame is painted.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::engine::{add_destroy_callback, current_component};
use crate::error::{self, EngineError};

thread_local! {
    static MOUNT_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> =
        RefCell::new(HashMap::new());
}

/// Run `callback` once the current component is fully set up. Outside a
/// primitive's children closure this warns and does nothing.
pub fn on_mount(callback: impl FnOnce() + 'static) {
    match current_component() {
        Some(index) => {
            MOUNT_CALLBACKS.with(|callbacks| {
                callbacks
                    .borrow_mut()
                    .entry(index)
                    .or_default()
                    .push(Box::new(callback));
            });
        }
        None => {
            error::report(&EngineError::LifecycleOutOfContext { api: "on_mount" });
        }
    }
}

/// Run `callback` when the current component is released. Outside a
/// primitive's children closure this warns and does nothing.
pub fn on_destroy(callback: impl FnOnce() + 'static) {
    match current_component() {
        Some(index) => add_destroy_callback(index, callback),
        None => {
            error::report(&EngineError::LifecycleOutOfContext { api: "on_destroy" });
        }
    }
}

/// Fire pending mount callbacks for `index`. Called by primitives after
/// their children closure returns.
pub(crate) fn run_mount_callbacks(index: usize) {
    let callbacks = MOUNT_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            callback();
        }
    }
}

/// Drop unfired mount callbacks (test isolation).
pub fn reset_lifecycle_state() {
    MOUNT_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, pop_current_component, push_current_component, release_index, reset_registry};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn mount_fires_after_setup() {
        reset_registry();
        reset_lifecycle_state();
        let index = allocate_index(None);
        let fired = Rc::new(Cell::new(false));

        push_current_component(index);
        let f = fired.clone();
        on_mount(move || f.set(true));
        pop_current_component();

        assert!(!fired.get(), "not yet: primitive still setting up");
        run_mount_callbacks(index);
        assert!(fired.get());
    }

    #[test]
    fn destroy_fires_on_release() {
        reset_registry();
        let index = allocate_index(None);
        let fired = Rc::new(Cell::new(false));

        push_current_component(index);
        let f = fired.clone();
        on_destroy(move || f.set(true));
        pop_current_component();

        release_index(index);
        assert!(fired.get());
    }

    #[test]
    fn outside_component_is_noop() {
        reset_registry();
        reset_lifecycle_state();
        // Must not panic, must not register anything.
        on_mount(|| {});
        on_destroy(|| {});
    }
}
