//! Visual arrays: colors, opacity, borders, stacking.

use weft_signals::TrackedSlotArray;

use crate::types::{BorderStyle, Rgba};

/// Per-side border style override sentinel: inherit the component style.
const SIDE_INHERIT: u8 = u8::MAX;

thread_local! {
    static FG_COLOR: TrackedSlotArray<Rgba> = TrackedSlotArray::new(Some(Rgba::TERMINAL_DEFAULT));
    static BG_COLOR: TrackedSlotArray<Rgba> = TrackedSlotArray::new(Some(Rgba::TERMINAL_DEFAULT));
    static BORDER_COLOR: TrackedSlotArray<Rgba> = TrackedSlotArray::new(Some(Rgba::TERMINAL_DEFAULT));

    /// 0-255; 255 = fully opaque.
    static OPACITY: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(255));

    static Z_INDEX: TrackedSlotArray<i32> = TrackedSlotArray::new(Some(0));

    /// BorderStyle as u8 for the whole component.
    static BORDER_STYLE: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(0));

    // Per-side style overrides; SIDE_INHERIT falls back to BORDER_STYLE.
    static BORDER_STYLE_TOP: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(SIDE_INHERIT));
    static BORDER_STYLE_RIGHT: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(SIDE_INHERIT));
    static BORDER_STYLE_BOTTOM: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(SIDE_INHERIT));
    static BORDER_STYLE_LEFT: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(SIDE_INHERIT));
}

pub fn ensure_capacity(index: usize) {
    FG_COLOR.with(|arr| {
        let _ = arr.peek(index);
    });
    BG_COLOR.with(|arr| {
        let _ = arr.peek(index);
    });
    BORDER_COLOR.with(|arr| {
        let _ = arr.peek(index);
    });
    OPACITY.with(|arr| {
        let _ = arr.peek(index);
    });
    Z_INDEX.with(|arr| {
        let _ = arr.peek(index);
    });
    BORDER_STYLE.with(|arr| {
        let _ = arr.peek(index);
    });
}

pub fn clear_at_index(index: usize) {
    FG_COLOR.with(|arr| arr.clear(index));
    BG_COLOR.with(|arr| arr.clear(index));
    BORDER_COLOR.with(|arr| arr.clear(index));
    OPACITY.with(|arr| arr.clear(index));
    Z_INDEX.with(|arr| arr.clear(index));
    BORDER_STYLE.with(|arr| arr.clear(index));
    BORDER_STYLE_TOP.with(|arr| arr.clear(index));
    BORDER_STYLE_RIGHT.with(|arr| arr.clear(index));
    BORDER_STYLE_BOTTOM.with(|arr| arr.clear(index));
    BORDER_STYLE_LEFT.with(|arr| arr.clear(index));
}

pub fn reset() {
    FG_COLOR.with(|arr| arr.clear_all());
    BG_COLOR.with(|arr| arr.clear_all());
    BORDER_COLOR.with(|arr| arr.clear_all());
    OPACITY.with(|arr| arr.clear_all());
    Z_INDEX.with(|arr| arr.clear_all());
    BORDER_STYLE.with(|arr| arr.clear_all());
    BORDER_STYLE_TOP.with(|arr| arr.clear_all());
    BORDER_STYLE_RIGHT.with(|arr| arr.clear_all());
    BORDER_STYLE_BOTTOM.with(|arr| arr.clear_all());
    BORDER_STYLE_LEFT.with(|arr| arr.clear_all());
}

// -----------------------------------------------------------------------------
// Colors
// -----------------------------------------------------------------------------

pub fn get_fg_color(index: usize) -> Rgba {
    FG_COLOR.with(|arr| arr.get(index))
}

pub fn set_fg_color(index: usize, color: Rgba) {
    FG_COLOR.with(|arr| arr.set_value(index, color));
}

pub fn set_fg_color_getter(index: usize, getter: impl Fn() -> Rgba + 'static) {
    FG_COLOR.with(|arr| arr.set_getter(index, getter));
}

pub fn get_bg_color(index: usize) -> Rgba {
    BG_COLOR.with(|arr| arr.get(index))
}

pub fn set_bg_color(index: usize, color: Rgba) {
    BG_COLOR.with(|arr| arr.set_value(index, color));
}

pub fn set_bg_color_getter(index: usize, getter: impl Fn() -> Rgba + 'static) {
    BG_COLOR.with(|arr| arr.set_getter(index, getter));
}

pub fn get_border_color(index: usize) -> Rgba {
    BORDER_COLOR.with(|arr| arr.get(index))
}

pub fn set_border_color(index: usize, color: Rgba) {
    BORDER_COLOR.with(|arr| arr.set_value(index, color));
}

pub fn set_border_color_getter(index: usize, getter: impl Fn() -> Rgba + 'static) {
    BORDER_COLOR.with(|arr| arr.set_getter(index, getter));
}

// -----------------------------------------------------------------------------
// Opacity / z-index
// -----------------------------------------------------------------------------

pub fn get_opacity(index: usize) -> u8 {
    OPACITY.with(|arr| arr.get(index))
}

pub fn set_opacity(index: usize, opacity: u8) {
    OPACITY.with(|arr| arr.set_value(index, opacity));
}

pub fn set_opacity_getter(index: usize, getter: impl Fn() -> u8 + 'static) {
    OPACITY.with(|arr| arr.set_getter(index, getter));
}

pub fn get_z_index(index: usize) -> i32 {
    Z_INDEX.with(|arr| arr.get(index))
}

pub fn set_z_index(index: usize, z: i32) {
    Z_INDEX.with(|arr| arr.set_value(index, z));
}

pub fn set_z_index_getter(index: usize, getter: impl Fn() -> i32 + 'static) {
    Z_INDEX.with(|arr| arr.set_getter(index, getter));
}

// -----------------------------------------------------------------------------
// Border styles
// -----------------------------------------------------------------------------

pub fn get_border_style(index: usize) -> BorderStyle {
    BorderStyle::from(BORDER_STYLE.with(|arr| arr.get(index)))
}

pub fn set_border_style(index: usize, style: BorderStyle) {
    BORDER_STYLE.with(|arr| arr.set_value(index, style as u8));
}

pub fn set_border_style_getter(index: usize, getter: impl Fn() -> BorderStyle + 'static) {
    BORDER_STYLE.with(|arr| arr.set_getter(index, move || getter() as u8));
}

/// Effective per-side styles, falling back to the component style.
pub fn get_border_sides(index: usize) -> (BorderStyle, BorderStyle, BorderStyle, BorderStyle) {
    let base = BORDER_STYLE.with(|arr| arr.get(index));
    let side = |arr: &TrackedSlotArray<u8>| {
        let raw = arr.get(index);
        BorderStyle::from(if raw == SIDE_INHERIT { base } else { raw })
    };
    (
        BORDER_STYLE_TOP.with(side),
        BORDER_STYLE_RIGHT.with(side),
        BORDER_STYLE_BOTTOM.with(side),
        BORDER_STYLE_LEFT.with(side),
    )
}

pub fn set_border_style_top(index: usize, style: BorderStyle) {
    BORDER_STYLE_TOP.with(|arr| arr.set_value(index, style as u8));
}

pub fn set_border_style_right(index: usize, style: BorderStyle) {
    BORDER_STYLE_RIGHT.with(|arr| arr.set_value(index, style as u8));
}

pub fn set_border_style_bottom(index: usize, style: BorderStyle) {
    BORDER_STYLE_BOTTOM.with(|arr| arr.set_value(index, style as u8));
}

pub fn set_border_style_left(index: usize, style: BorderStyle) {
    BORDER_STYLE_LEFT.with(|arr| arr.set_value(index, style as u8));
}
