//! Core arrays: component type, parent link, visibility.
//!
//! The parent link is an index back-reference, never an owning pointer;
//! `-1` means "root".

use weft_signals::TrackedSlotArray;

use crate::types::ComponentType;

thread_local! {
    /// Component type discriminant (ComponentType as u8).
    static COMPONENT_TYPE: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(0));

    /// Parent component index, -1 for roots.
    static PARENT_INDEX: TrackedSlotArray<i32> = TrackedSlotArray::new(Some(-1));

    /// Visibility flag.
    static VISIBLE: TrackedSlotArray<bool> = TrackedSlotArray::new(Some(true));
}

pub fn ensure_capacity(index: usize) {
    COMPONENT_TYPE.with(|arr| {
        let _ = arr.peek(index);
    });
    PARENT_INDEX.with(|arr| {
        let _ = arr.peek(index);
    });
    VISIBLE.with(|arr| {
        let _ = arr.peek(index);
    });
}

pub fn clear_at_index(index: usize) {
    COMPONENT_TYPE.with(|arr| arr.clear(index));
    PARENT_INDEX.with(|arr| arr.clear(index));
    VISIBLE.with(|arr| arr.clear(index));
}

pub fn reset() {
    COMPONENT_TYPE.with(|arr| arr.clear_all());
    PARENT_INDEX.with(|arr| arr.clear_all());
    VISIBLE.with(|arr| arr.clear_all());
}

// -----------------------------------------------------------------------------
// Component type
// -----------------------------------------------------------------------------

pub fn get_component_type(index: usize) -> ComponentType {
    let raw = COMPONENT_TYPE.with(|arr| arr.get(index));
    match raw {
        1 => ComponentType::Box,
        2 => ComponentType::Text,
        3 => ComponentType::Input,
        4 => ComponentType::Progress,
        5 => ComponentType::Select,
        _ => ComponentType::None,
    }
}

pub fn set_component_type(index: usize, ty: ComponentType) {
    COMPONENT_TYPE.with(|arr| arr.set_value(index, ty as u8));
}

// -----------------------------------------------------------------------------
// Parent index
// -----------------------------------------------------------------------------

pub fn get_parent_index(index: usize) -> Option<usize> {
    let raw = PARENT_INDEX.with(|arr| arr.get(index));
    if raw < 0 {
        None
    } else {
        Some(raw as usize)
    }
}

/// Non-tracking parent read, for traversals outside the reactive graph.
pub fn peek_parent_index(index: usize) -> Option<usize> {
    let raw = PARENT_INDEX.with(|arr| arr.peek(index));
    if raw < 0 {
        None
    } else {
        Some(raw as usize)
    }
}

pub fn set_parent_index(index: usize, parent: Option<usize>) {
    PARENT_INDEX.with(|arr| arr.set_value(index, parent.map_or(-1, |p| p as i32)));
}

// -----------------------------------------------------------------------------
// Visibility
// -----------------------------------------------------------------------------

pub fn get_visible(index: usize) -> bool {
    VISIBLE.with(|arr| arr.get(index))
}

pub fn set_visible(index: usize, visible: bool) {
    VISIBLE.with(|arr| arr.set_value(index, visible));
}

pub fn set_visible_getter(index: usize, getter: impl Fn() -> bool + 'static) {
    VISIBLE.with(|arr| arr.set_getter(index, getter));
}

pub fn set_visible_signal(index: usize, signal: weft_signals::Signal<bool>) {
    VISIBLE.with(|arr| arr.set_signal(index, signal));
}
