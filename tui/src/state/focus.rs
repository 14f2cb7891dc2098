//! Focus state: the `focused_index` signal and keyboard navigation.

use std::cell::RefCell;
use std::collections::HashMap;

use weft_signals::{signal, untracked, Signal};

use crate::engine::arrays::{core, interaction};
use crate::engine::get_allocated_indices;

thread_local! {
    /// Currently focused component index; -1 when nothing is focused.
    static FOCUSED_INDEX: Signal<i32> = signal(-1);

    static CALLBACKS: RefCell<HashMap<usize, Vec<FocusCallbacks>>> = RefCell::new(HashMap::new());
}

/// on_focus/on_blur hooks registered per component.
#[derive(Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Box<dyn Fn()>>,
    pub on_blur: Option<Box<dyn Fn()>>,
}

pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

pub fn focused_index_signal() -> Signal<i32> {
    FOCUSED_INDEX.with(|s| s.clone())
}

pub fn has_focus() -> bool {
    get_focused_index() >= 0
}

pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

/// Register focus callbacks for `index`. Returns a cleanup closure.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let slot = CALLBACKS.with(|reg| {
        let mut reg = reg.borrow_mut();
        let list = reg.entry(index).or_default();
        list.push(callbacks);
        list.len() - 1
    });
    move || {
        CALLBACKS.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.get_mut(&index) {
                if slot < list.len() {
                    list[slot] = FocusCallbacks::default();
                }
                if list
                    .iter()
                    .all(|cb| cb.on_focus.is_none() && cb.on_blur.is_none())
                {
                    reg.remove(&index);
                }
            }
        });
    }
}

fn set_focus(new_index: i32) {
    let old_index = untracked(get_focused_index);
    if old_index == new_index {
        return;
    }

    if old_index >= 0 {
        fire(old_index as usize, |cb| cb.on_blur.as_deref());
    }
    FOCUSED_INDEX.with(|s| s.set(new_index));
    if new_index >= 0 {
        fire(new_index as usize, |cb| cb.on_focus.as_deref());
    }
}

fn fire(index: usize, pick: impl Fn(&FocusCallbacks) -> Option<&dyn Fn()>) {
    // Collect nothing: call under a short borrow, tolerating re-entrancy by
    // taking the list out and putting it back.
    let list = CALLBACKS.with(|reg| reg.borrow_mut().remove(&index));
    if let Some(list) = list {
        for cb in &list {
            if let Some(f) = pick(cb) {
                f();
            }
        }
        CALLBACKS.with(|reg| {
            let mut reg = reg.borrow_mut();
            match reg.get_mut(&index) {
                // Callbacks registered during the calls: keep both.
                Some(existing) => {
                    let mut merged = list;
                    merged.append(existing);
                    *existing = merged;
                }
                None => {
                    reg.insert(index, list);
                }
            }
        });
    }
}

/// Focus a specific component.
pub fn focus(index: usize) {
    set_focus(index as i32);
}

/// Clear focus.
pub fn blur() {
    set_focus(-1);
}

/// Focusable components ordered by tab index, then allocation order.
pub fn get_focusable_indices() -> Vec<usize> {
    let mut focusables: Vec<usize> = untracked(get_allocated_indices)
        .into_iter()
        .filter(|&i| {
            untracked(|| interaction::get_focusable(i) && core::get_visible(i))
        })
        .collect();
    focusables.sort_by(|&a, &b| {
        let (ta, tb) = untracked(|| (interaction::get_tab_index(a), interaction::get_tab_index(b)));
        ta.cmp(&tb).then(a.cmp(&b))
    });
    focusables
}

fn step(direction: i32) -> bool {
    let focusables = get_focusable_indices();
    if focusables.is_empty() {
        return false;
    }
    let current = untracked(get_focused_index);
    let position = if current >= 0 {
        focusables.iter().position(|&i| i == current as usize)
    } else {
        None
    };
    let next = match position {
        None => {
            if direction > 0 {
                focusables[0]
            } else {
                focusables[focusables.len() - 1]
            }
        }
        Some(pos) => {
            let len = focusables.len() as i32;
            let next_pos = ((pos as i32 + direction) % len + len) % len;
            focusables[next_pos as usize]
        }
    };
    if next as i32 != current {
        set_focus(next as i32);
        true
    } else {
        false
    }
}

/// Move focus forward in tab order (wraps).
pub fn focus_next() -> bool {
    step(1)
}

/// Move focus backward in tab order (wraps).
pub fn focus_previous() -> bool {
    step(-1)
}

/// Clear focus if the released component held it, and drop its callbacks.
pub fn cleanup_index(index: usize) {
    if untracked(get_focused_index) == index as i32 {
        set_focus(-1);
    }
    CALLBACKS.with(|reg| {
        reg.borrow_mut().remove(&index);
    });
}

pub fn reset_focus_state() {
    FOCUSED_INDEX.with(|s| s.set(-1));
    CALLBACKS.with(|reg| reg.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, reset_registry};
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> (usize, usize, usize) {
        reset_registry();
        reset_focus_state();
        let a = allocate_index(None);
        let b = allocate_index(None);
        let c = allocate_index(None);
        for &i in &[a, b, c] {
            interaction::set_focusable(i, true);
        }
        (a, b, c)
    }

    #[test]
    fn focus_and_blur() {
        let (a, ..) = setup();
        assert!(!has_focus());
        focus(a);
        assert!(is_focused(a));
        blur();
        assert!(!has_focus());
    }

    #[test]
    fn tab_order_respects_tab_index() {
        let (a, b, c) = setup();
        interaction::set_tab_index(a, 2);
        interaction::set_tab_index(b, 1);
        interaction::set_tab_index(c, 3);
        assert_eq!(get_focusable_indices(), vec![b, a, c]);
    }

    #[test]
    fn next_and_previous_wrap() {
        let (a, b, c) = setup();
        focus_next();
        assert!(is_focused(a));
        focus_next();
        assert!(is_focused(b));
        focus_next();
        assert!(is_focused(c));
        focus_next();
        assert!(is_focused(a), "wraps to the first");
        focus_previous();
        assert!(is_focused(c), "wraps backwards");
    }

    #[test]
    fn callbacks_fire_on_change() {
        let (a, b, _) = setup();
        let focused = Rc::new(Cell::new(0));
        let blurred = Rc::new(Cell::new(0));

        let (f, bl) = (focused.clone(), blurred.clone());
        let _cleanup = register_callbacks(
            a,
            FocusCallbacks {
                on_focus: Some(Box::new(move || f.set(f.get() + 1))),
                on_blur: Some(Box::new(move || bl.set(bl.get() + 1))),
            },
        );

        focus(a);
        assert_eq!((focused.get(), blurred.get()), (1, 0));
        focus(a); // no change, no callbacks
        assert_eq!(focused.get(), 1);
        focus(b);
        assert_eq!((focused.get(), blurred.get()), (1, 1));
    }

    #[test]
    fn invisible_components_are_skipped() {
        let (a, b, _) = setup();
        core::set_visible(a, false);
        let order = get_focusable_indices();
        assert!(!order.contains(&a));
        assert!(order.contains(&b));
    }

    #[test]
    fn releasing_focused_component_blurs() {
        let (a, ..) = setup();
        focus(a);
        cleanup_index(a);
        assert!(!has_focus());
    }
}
