//! Interaction arrays: focus, cursor, scroll and pointer state.

use weft_signals::TrackedSlotArray;

thread_local! {
    static FOCUSABLE: TrackedSlotArray<bool> = TrackedSlotArray::new(Some(false));
    static TAB_INDEX: TrackedSlotArray<i32> = TrackedSlotArray::new(Some(0));

    /// Cursor column within an input's value (grapheme offset).
    static CURSOR_POSITION: TrackedSlotArray<u32> = TrackedSlotArray::new(Some(0));

    /// Custom cursor glyph; 0 uses the inverse-block default.
    static CURSOR_CHAR: TrackedSlotArray<u32> = TrackedSlotArray::new(Some(0));

    /// Glyph drawn on the blink off-phase; 0 skips drawing.
    static CURSOR_ALT_CHAR: TrackedSlotArray<u32> = TrackedSlotArray::new(Some(0));

    static CURSOR_VISIBLE: TrackedSlotArray<bool> = TrackedSlotArray::new(Some(true));

    static SCROLL_OFFSET_X: TrackedSlotArray<u16> = TrackedSlotArray::new(Some(0));
    static SCROLL_OFFSET_Y: TrackedSlotArray<u16> = TrackedSlotArray::new(Some(0));

    /// Follow content growth while the user is at the bottom.
    static STICK_TO_BOTTOM: TrackedSlotArray<bool> = TrackedSlotArray::new(Some(false));

    static HOVERED: TrackedSlotArray<bool> = TrackedSlotArray::new(Some(false));
    static PRESSED: TrackedSlotArray<bool> = TrackedSlotArray::new(Some(false));
}

pub fn ensure_capacity(index: usize) {
    FOCUSABLE.with(|arr| {
        let _ = arr.peek(index);
    });
    TAB_INDEX.with(|arr| {
        let _ = arr.peek(index);
    });
    CURSOR_POSITION.with(|arr| {
        let _ = arr.peek(index);
    });
    SCROLL_OFFSET_X.with(|arr| {
        let _ = arr.peek(index);
    });
    SCROLL_OFFSET_Y.with(|arr| {
        let _ = arr.peek(index);
    });
}

pub fn clear_at_index(index: usize) {
    FOCUSABLE.with(|arr| arr.clear(index));
    TAB_INDEX.with(|arr| arr.clear(index));
    CURSOR_POSITION.with(|arr| arr.clear(index));
    CURSOR_CHAR.with(|arr| arr.clear(index));
    CURSOR_ALT_CHAR.with(|arr| arr.clear(index));
    CURSOR_VISIBLE.with(|arr| arr.clear(index));
    SCROLL_OFFSET_X.with(|arr| arr.clear(index));
    SCROLL_OFFSET_Y.with(|arr| arr.clear(index));
    STICK_TO_BOTTOM.with(|arr| arr.clear(index));
    HOVERED.with(|arr| arr.clear(index));
    PRESSED.with(|arr| arr.clear(index));
}

pub fn reset() {
    FOCUSABLE.with(|arr| arr.clear_all());
    TAB_INDEX.with(|arr| arr.clear_all());
    CURSOR_POSITION.with(|arr| arr.clear_all());
    CURSOR_CHAR.with(|arr| arr.clear_all());
    CURSOR_ALT_CHAR.with(|arr| arr.clear_all());
    CURSOR_VISIBLE.with(|arr| arr.clear_all());
    SCROLL_OFFSET_X.with(|arr| arr.clear_all());
    SCROLL_OFFSET_Y.with(|arr| arr.clear_all());
    STICK_TO_BOTTOM.with(|arr| arr.clear_all());
    HOVERED.with(|arr| arr.clear_all());
    PRESSED.with(|arr| arr.clear_all());
}

pub fn get_focusable(index: usize) -> bool {
    FOCUSABLE.with(|arr| arr.get(index))
}

pub fn set_focusable(index: usize, focusable: bool) {
    FOCUSABLE.with(|arr| arr.set_value(index, focusable));
}

pub fn get_tab_index(index: usize) -> i32 {
    TAB_INDEX.with(|arr| arr.get(index))
}

pub fn set_tab_index(index: usize, tab: i32) {
    TAB_INDEX.with(|arr| arr.set_value(index, tab));
}

pub fn get_cursor_position(index: usize) -> u32 {
    CURSOR_POSITION.with(|arr| arr.get(index))
}

pub fn set_cursor_position(index: usize, pos: u32) {
    CURSOR_POSITION.with(|arr| arr.set_value(index, pos));
}

pub fn get_cursor_char(index: usize) -> Option<char> {
    char::from_u32(CURSOR_CHAR.with(|arr| arr.get(index))).filter(|c| *c != '\0')
}

pub fn set_cursor_char(index: usize, ch: char) {
    CURSOR_CHAR.with(|arr| arr.set_value(index, ch as u32));
}

pub fn get_cursor_alt_char(index: usize) -> Option<char> {
    char::from_u32(CURSOR_ALT_CHAR.with(|arr| arr.get(index))).filter(|c| *c != '\0')
}

pub fn set_cursor_alt_char(index: usize, ch: char) {
    CURSOR_ALT_CHAR.with(|arr| arr.set_value(index, ch as u32));
}

pub fn get_cursor_visible(index: usize) -> bool {
    CURSOR_VISIBLE.with(|arr| arr.get(index))
}

pub fn set_cursor_visible(index: usize, visible: bool) {
    CURSOR_VISIBLE.with(|arr| arr.set_value(index, visible));
}

pub fn get_scroll_offset_x(index: usize) -> u16 {
    SCROLL_OFFSET_X.with(|arr| arr.get(index))
}

pub fn set_scroll_offset_x(index: usize, offset: u16) {
    SCROLL_OFFSET_X.with(|arr| arr.set_value(index, offset));
}

pub fn get_scroll_offset_y(index: usize) -> u16 {
    SCROLL_OFFSET_Y.with(|arr| arr.get(index))
}

pub fn set_scroll_offset_y(index: usize, offset: u16) {
    SCROLL_OFFSET_Y.with(|arr| arr.set_value(index, offset));
}

pub fn get_stick_to_bottom(index: usize) -> bool {
    STICK_TO_BOTTOM.with(|arr| arr.get(index))
}

pub fn set_stick_to_bottom(index: usize, stick: bool) {
    STICK_TO_BOTTOM.with(|arr| arr.set_value(index, stick));
}

pub fn get_hovered(index: usize) -> bool {
    HOVERED.with(|arr| arr.get(index))
}

pub fn set_hovered(index: usize, hovered: bool) {
    HOVERED.with(|arr| arr.set_value(index, hovered));
}

pub fn get_pressed(index: usize) -> bool {
    PRESSED.with(|arr| arr.get(index))
}

pub fn set_pressed(index: usize, pressed: bool) {
    PRESSED.with(|arr| arr.set_value(index, pressed));
}
