//! The single-line input primitive.
//!
//! Two-way binds a `Signal<String>`: keystrokes edit the signal, external
//! writes show up on the next frame. The cursor lives in the interaction
//! arrays as a char offset into the value; word jumps use Unicode word
//! boundaries.

use unicode_segmentation::UnicodeSegmentation;

use super::box_primitive::bind_slot;
use super::lifecycle;
use super::types::{Cleanup, InputProps, PropValue};
use crate::engine::arrays::{core, interaction, text as text_arrays, visual};
use crate::engine::{
    allocate_index, create_layout_node, get_current_parent_index, release_index,
};
use crate::state::{focus, keyboard, mouse};
use crate::types::{BorderStyle, ComponentType};

const DEFAULT_MASK: char = '•';

/// Create an input field. Returns its cleanup closure.
pub fn input(props: InputProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_layout_node(index);

    core::set_component_type(index, ComponentType::Input);
    if let Some(parent) = get_current_parent_index() {
        core::set_parent_index(index, Some(parent));
    }
    if let Some(visible) = props.visible {
        match visible {
            PropValue::Static(v) => core::set_visible(index, v),
            PropValue::Signal(s) => core::set_visible_signal(index, s),
            PropValue::Getter(g) => core::set_visible_getter(index, move || g()),
        }
    }

    // Displayed content: the value (masked in password mode), or the
    // placeholder while empty.
    {
        let value = props.value.clone();
        let placeholder = props.placeholder.clone().unwrap_or_default();
        let password = props.password;
        let mask = props.mask_char.unwrap_or(DEFAULT_MASK);
        text_arrays::set_text_content_getter(index, move || {
            let current = value.get();
            if current.is_empty() {
                placeholder.clone()
            } else if password {
                mask.to_string().repeat(current.chars().count())
            } else {
                current
            }
        });
    }

    if let Some(attrs) = props.attrs {
        match attrs {
            PropValue::Static(v) => text_arrays::set_text_attrs(index, v),
            PropValue::Signal(s) => text_arrays::set_text_attrs_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_text_attrs_getter(index, move || g()),
        }
    }

    if let Some(v) = props.width {
        bind_slot(&node.width, v);
    }
    if let Some(v) = props.height {
        bind_slot(&node.height, v);
    }
    if let Some(p) = props.padding {
        bind_slot(&node.padding_top, p.clone());
        bind_slot(&node.padding_right, p.clone());
        bind_slot(&node.padding_bottom, p.clone());
        bind_slot(&node.padding_left, p);
    }
    if let Some(border) = &props.border {
        let widths = |style: BorderStyle| if style != BorderStyle::None { 1u16 } else { 0 };
        match border.clone() {
            PropValue::Static(style) => {
                for slot in [&node.border_top, &node.border_right, &node.border_bottom, &node.border_left] {
                    slot.set_value(widths(style));
                }
                visual::set_border_style(index, style);
            }
            PropValue::Signal(s) => {
                for slot in [&node.border_top, &node.border_right, &node.border_bottom, &node.border_left] {
                    let s = s.clone();
                    slot.set_getter(move || widths(s.get()));
                }
                visual::set_border_style_getter(index, move || s.get());
            }
            PropValue::Getter(g) => {
                for slot in [&node.border_top, &node.border_right, &node.border_bottom, &node.border_left] {
                    let g = g.clone();
                    slot.set_getter(move || widths(g()));
                }
                visual::set_border_style_getter(index, move || g());
            }
        }
    }
    if let Some(v) = props.border_color {
        match v {
            PropValue::Static(c) => visual::set_border_color(index, c),
            PropValue::Signal(s) => visual::set_border_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_border_color_getter(index, move || g()),
        }
    }
    if let Some(v) = props.fg {
        match v {
            PropValue::Static(c) => visual::set_fg_color(index, c),
            PropValue::Signal(s) => visual::set_fg_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_fg_color_getter(index, move || g()),
        }
    }
    if let Some(v) = props.bg {
        match v {
            PropValue::Static(c) => visual::set_bg_color(index, c),
            PropValue::Signal(s) => visual::set_bg_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_bg_color_getter(index, move || g()),
        }
    }

    // Inputs are always focusable.
    interaction::set_focusable(index, true);
    if let Some(tab) = props.tab_index {
        interaction::set_tab_index(index, tab);
    }
    if let Some(cursor) = &props.cursor {
        if let Some(ch) = cursor.char {
            interaction::set_cursor_char(index, ch);
        }
        if let Some(alt) = cursor.alt_char {
            interaction::set_cursor_alt_char(index, alt);
        }
    }
    interaction::set_cursor_position(index, props.value.peek().chars().count() as u32);

    // Editing handler.
    let key_cleanup = {
        let value = props.value.clone();
        let on_change = props.on_change.clone();
        let on_submit = props.on_submit.clone();
        let on_cancel = props.on_cancel.clone();
        let max_length = props.max_length;
        keyboard::on_focused(index, move |event| {
            handle_key(index, &value, event, max_length, |next| {
                if let Some(cb) = &on_change {
                    cb(next);
                }
            }, &on_submit, &on_cancel)
        })
    };

    // Click-to-focus comes from the mouse path; register an empty handler
    // set so the component participates in hit handling.
    let mouse_cleanup = mouse::on_component(index, mouse::MouseHandlers::default());

    let focus_cleanup = if props.on_focus.is_some() || props.on_blur.is_some() {
        let on_focus = props.on_focus.clone();
        let on_blur = props.on_blur.clone();
        Some(focus::register_callbacks(
            index,
            focus::FocusCallbacks {
                on_focus: on_focus.map(|f| Box::new(move || f()) as Box<dyn Fn()>),
                on_blur: on_blur.map(|f| Box::new(move || f()) as Box<dyn Fn()>),
            },
        ))
    } else {
        None
    };

    lifecycle::run_mount_callbacks(index);

    if props.auto_focus {
        focus::focus(index);
    }

    Box::new(move || {
        key_cleanup();
        mouse_cleanup();
        if let Some(cleanup) = focus_cleanup {
            cleanup();
        }
        mouse::cleanup_index(index);
        keyboard::cleanup_index(index);
        focus::cleanup_index(index);
        release_index(index);
    })
}

// =============================================================================
// Editing
// =============================================================================

fn handle_key(
    index: usize,
    value: &weft_signals::Signal<String>,
    event: &keyboard::KeyboardEvent,
    max_length: Option<usize>,
    notify_change: impl Fn(&str),
    on_submit: &Option<super::types::InputSubmitCallback>,
    on_cancel: &Option<super::types::InputCancelCallback>,
) -> bool {
    let current = value.peek();
    let cursor = interaction::get_cursor_position(index) as usize;
    let len = current.chars().count();
    let cursor = cursor.min(len);

    match event.key.as_str() {
        "Enter" => {
            if let Some(cb) = on_submit {
                cb(&current);
            }
            true
        }
        "Escape" => {
            if let Some(cb) = on_cancel {
                cb();
            }
            true
        }
        "Backspace" => {
            if cursor == 0 {
                return true;
            }
            let next = remove_char(&current, cursor - 1);
            interaction::set_cursor_position(index, (cursor - 1) as u32);
            value.set(next.clone());
            notify_change(&next);
            true
        }
        "Delete" => {
            if cursor >= len {
                return true;
            }
            let next = remove_char(&current, cursor);
            value.set(next.clone());
            notify_change(&next);
            true
        }
        "ArrowLeft" => {
            if event.modifiers.ctrl {
                interaction::set_cursor_position(index, word_left(&current, cursor) as u32);
            } else if cursor > 0 {
                interaction::set_cursor_position(index, (cursor - 1) as u32);
            }
            true
        }
        "ArrowRight" => {
            if event.modifiers.ctrl {
                interaction::set_cursor_position(index, word_right(&current, cursor) as u32);
            } else if cursor < len {
                interaction::set_cursor_position(index, (cursor + 1) as u32);
            }
            true
        }
        "Home" => {
            interaction::set_cursor_position(index, 0);
            true
        }
        "End" => {
            interaction::set_cursor_position(index, len as u32);
            true
        }
        key => {
            // Printable text only; modified keys pass through.
            if event.modifiers.ctrl || event.modifiers.alt || event.modifiers.meta {
                return false;
            }
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return false;
            };
            if ch.is_control() {
                return false;
            }
            if let Some(max) = max_length {
                if len >= max {
                    return true;
                }
            }
            let next = insert_char(&current, cursor, ch);
            interaction::set_cursor_position(index, (cursor + 1) as u32);
            value.set(next.clone());
            notify_change(&next);
            true
        }
    }
}

fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn insert_char(s: &str, at: usize, ch: char) -> String {
    let mut out = s.to_string();
    out.insert(byte_offset(s, at), ch);
    out
}

fn remove_char(s: &str, at: usize) -> String {
    let mut out = s.to_string();
    out.remove(byte_offset(s, at));
    out
}

/// Char offset of the previous word boundary.
fn word_left(s: &str, cursor: usize) -> usize {
    let byte_cursor = byte_offset(s, cursor);
    s.split_word_bound_indices()
        .filter(|(i, word)| *i < byte_cursor && !word.trim().is_empty())
        .last()
        .map(|(i, _)| s[..i].chars().count())
        .unwrap_or(0)
}

/// Char offset of the next word boundary.
fn word_right(s: &str, cursor: usize) -> usize {
    let byte_cursor = byte_offset(s, cursor);
    s.split_word_bound_indices()
        .find(|(i, word)| *i > byte_cursor && !word.trim().is_empty())
        .map(|(i, _)| s[..i].chars().count())
        .unwrap_or_else(|| s.chars().count())
}
