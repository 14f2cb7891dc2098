//! Keyboard state and handler registries.
//!
//! Dispatch priority for a press event: focused component handlers, then
//! key-specific handlers, then global handlers. The first handler returning
//! `true` consumes the event. Repeat/release events update reactive state
//! but do not invoke handlers.

use std::cell::RefCell;
use std::collections::HashMap;

use weft_signals::{signal, Signal};

use crate::state::focus;

// =============================================================================
// Event types
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A normalized keyboard event. Key names follow the usual conventions:
/// `"a"`, `"Enter"`, `"Escape"`, `"ArrowUp"`, `"Tab"`, `"F1"`...
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
    /// Raw bytes the event decoded from, when available.
    pub raw: Option<Vec<u8>>,
}

impl KeyboardEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
            raw: None,
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::new(key)
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }
}

pub type KeyHandler = Box<dyn Fn(&KeyboardEvent) -> bool>;
pub type KeySpecificHandler = Box<dyn Fn() -> bool>;

// =============================================================================
// Reactive state
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

// =============================================================================
// Handler registry
// =============================================================================

#[derive(Default)]
struct Registry {
    global: Vec<(usize, KeyHandler)>,
    by_key: HashMap<String, Vec<(usize, KeySpecificHandler)>>,
    focused: HashMap<usize, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

fn next_id() -> usize {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        id
    })
}

/// Subscribe to every keyboard event. Returns a cleanup closure.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = next_id();
    REGISTRY.with(|reg| reg.borrow_mut().global.push((id, Box::new(handler))));
    move || {
        REGISTRY.with(|reg| reg.borrow_mut().global.retain(|(h, _)| *h != id));
    }
}

/// Subscribe to one key by name. Returns a cleanup closure.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + 'static,
{
    let id = next_id();
    let key = key.to_string();
    REGISTRY.with(|reg| {
        reg.borrow_mut()
            .by_key
            .entry(key.clone())
            .or_default()
            .push((id, Box::new(handler)));
    });
    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.by_key.get_mut(&key) {
                handlers.retain(|(h, _)| *h != id);
                if handlers.is_empty() {
                    reg.by_key.remove(&key);
                }
            }
        });
    }
}

/// Subscribe the same handler to several keys. Returns a cleanup closure.
pub fn on_keys<F>(keys: &[&str], handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + Clone + 'static,
{
    let entries: Vec<(String, usize)> = keys
        .iter()
        .map(|key| {
            let id = next_id();
            REGISTRY.with(|reg| {
                reg.borrow_mut()
                    .by_key
                    .entry(key.to_string())
                    .or_default()
                    .push((id, Box::new(handler.clone())));
            });
            (key.to_string(), id)
        })
        .collect();
    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            for (key, id) in &entries {
                if let Some(handlers) = reg.by_key.get_mut(key) {
                    handlers.retain(|(h, _)| h != id);
                    if handlers.is_empty() {
                        reg.by_key.remove(key);
                    }
                }
            }
        });
    }
}

/// Subscribe to events delivered while component `index` holds focus.
pub fn on_focused<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = next_id();
    REGISTRY.with(|reg| {
        reg.borrow_mut()
            .focused
            .entry(index)
            .or_default()
            .push((id, Box::new(handler)));
    });
    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.focused.get_mut(&index) {
                handlers.retain(|(h, _)| *h != id);
                if handlers.is_empty() {
                    reg.focused.remove(&index);
                }
            }
        });
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Route an event through the priority chain. Returns true when consumed.
///
/// Order: focused component handlers → key-specific → global. Only press
/// events reach handlers.
pub fn route_event(event: KeyboardEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));
    if event.state != KeyState::Press {
        return false;
    }

    let focused_index = focus::get_focused_index();
    if focused_index >= 0 && dispatch_focused(focused_index, &event) {
        return true;
    }
    dispatch_unfocused(&event)
}

/// Focused-component handlers only.
pub fn dispatch_focused(focused_index: i32, event: &KeyboardEvent) -> bool {
    if focused_index < 0 || event.state != KeyState::Press {
        return false;
    }
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        if let Some(handlers) = reg.focused.get(&(focused_index as usize)) {
            for (_, handler) in handlers {
                if handler(event) {
                    return true;
                }
            }
        }
        false
    })
}

/// Key-specific then global handlers.
fn dispatch_unfocused(event: &KeyboardEvent) -> bool {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        if let Some(handlers) = reg.by_key.get(&event.key) {
            for (_, handler) in handlers {
                if handler() {
                    return true;
                }
            }
        }
        for (_, handler) in &reg.global {
            if handler(event) {
                return true;
            }
        }
        false
    })
}

/// Drop all focused handlers registered for a released component.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().focused.remove(&index);
    });
}

/// Clear every handler and the reactive state (test isolation).
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = Registry::default());
    LAST_EVENT.with(|s| s.set(None));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() {
        reset_keyboard_state();
        focus::reset_focus_state();
    }

    #[test]
    fn last_event_tracks_dispatch() {
        setup();
        assert_eq!(last_key(), "");
        route_event(KeyboardEvent::new("a"));
        assert_eq!(last_key(), "a");
    }

    #[test]
    fn global_handler_runs_and_cleans_up() {
        setup();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let cleanup = on(move |_| {
            c.set(c.get() + 1);
            false
        });

        route_event(KeyboardEvent::new("a"));
        route_event(KeyboardEvent::new("b"));
        assert_eq!(count.get(), 2);

        cleanup();
        route_event(KeyboardEvent::new("c"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn key_specific_before_global_and_consumption() {
        setup();
        let reached_global = Rc::new(Cell::new(false));

        let _specific = on_key("Enter", || true);
        let g = reached_global.clone();
        let _global = on(move |_| {
            g.set(true);
            false
        });

        assert!(route_event(KeyboardEvent::new("Enter")));
        assert!(!reached_global.get(), "consumed before global handlers");

        assert!(!route_event(KeyboardEvent::new("x")));
        assert!(reached_global.get());
    }

    #[test]
    fn focused_handlers_run_first() {
        setup();
        use crate::engine::{allocate_index, reset_registry};
        use crate::engine::arrays::interaction;
        reset_registry();

        let index = allocate_index(None);
        interaction::set_focusable(index, true);
        focus::focus(index);

        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let o1 = order.clone();
        let _focused = on_focused(index, move |_| {
            o1.borrow_mut().push("focused");
            true
        });
        let o2 = order.clone();
        let _global = on(move |_| {
            o2.borrow_mut().push("global");
            false
        });

        route_event(KeyboardEvent::new("x"));
        assert_eq!(*order.borrow(), vec!["focused"]);
    }

    #[test]
    fn only_press_reaches_handlers() {
        setup();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _cleanup = on(move |_| {
            c.set(c.get() + 1);
            false
        });

        route_event(KeyboardEvent {
            state: KeyState::Repeat,
            ..KeyboardEvent::new("a")
        });
        route_event(KeyboardEvent {
            state: KeyState::Release,
            ..KeyboardEvent::new("a")
        });
        assert_eq!(count.get(), 0);
        assert_eq!(last_key(), "a", "state still updates");

        route_event(KeyboardEvent::new("a"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn on_keys_binds_all() {
        setup();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let cleanup = on_keys(&["j", "ArrowDown"], move || {
            c.set(c.get() + 1);
            true
        });

        route_event(KeyboardEvent::new("j"));
        route_event(KeyboardEvent::new("ArrowDown"));
        assert_eq!(count.get(), 2);

        cleanup();
        route_event(KeyboardEvent::new("j"));
        assert_eq!(count.get(), 2);
    }
}
