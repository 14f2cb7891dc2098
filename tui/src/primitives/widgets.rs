//! Select and progress primitives.

use super::box_primitive::bind_slot;
use super::lifecycle;
use super::types::{Cleanup, ProgressProps, PropValue, SelectProps};
use crate::engine::arrays::{core, interaction, text as text_arrays, visual};
use crate::engine::{
    allocate_index, create_layout_node, get_current_parent_index, release_index,
};
use crate::state::{focus, keyboard, mouse};
use crate::types::{BorderStyle, ComponentType};

/// Create a select. Focused ArrowUp/ArrowDown move the selection; the
/// frame-buffer producer paints the current option plus the `▼` indicator.
pub fn select(props: SelectProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_layout_node(index);

    core::set_component_type(index, ComponentType::Select);
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

    // Content mirrors the selected option.
    {
        let options = props.options.clone();
        let selected = props.selected.clone();
        text_arrays::set_text_content_getter(index, move || {
            let options = options.get();
            options
                .get(selected.get().min(options.len().saturating_sub(1)))
                .cloned()
                .unwrap_or_default()
        });
    }

    if let Some(v) = props.width {
        bind_slot(&node.width, v);
    }
    if let Some(v) = props.height {
        bind_slot(&node.height, v);
    }
    if let Some(border) = props.border {
        if let PropValue::Static(style) = border {
            let width = if style != BorderStyle::None { 1 } else { 0 };
            for slot in [&node.border_top, &node.border_right, &node.border_bottom, &node.border_left] {
                slot.set_value(width);
            }
            visual::set_border_style(index, style);
        }
    }
    if let Some(fg) = props.fg {
        match fg {
            PropValue::Static(v) => visual::set_fg_color(index, v),
            PropValue::Signal(s) => visual::set_fg_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_fg_color_getter(index, move || g()),
        }
    }
    if let Some(bg) = props.bg {
        match bg {
            PropValue::Static(v) => visual::set_bg_color(index, v),
            PropValue::Signal(s) => visual::set_bg_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_bg_color_getter(index, move || g()),
        }
    }

    interaction::set_focusable(index, true);
    if let Some(tab) = props.tab_index {
        interaction::set_tab_index(index, tab);
    }

    let key_cleanup = {
        let options = props.options.clone();
        let selected = props.selected.clone();
        let on_change = props.on_change.clone();
        keyboard::on_focused(index, move |event| {
            let count = weft_signals::untracked(|| options.get()).len();
            if count == 0 {
                return false;
            }
            let current = selected.peek();
            let next = match event.key.as_str() {
                "ArrowUp" => current.saturating_sub(1),
                "ArrowDown" => (current + 1).min(count - 1),
                _ => return false,
            };
            if next != current {
                selected.set(next);
                if let Some(cb) = &on_change {
                    let label = weft_signals::untracked(|| options.get())
                        .get(next)
                        .cloned()
                        .unwrap_or_default();
                    cb(next, &label);
                }
            }
            true
        })
    };
    let mouse_cleanup = mouse::on_component(index, mouse::MouseHandlers::default());

    lifecycle::run_mount_callbacks(index);

    Box::new(move || {
        key_cleanup();
        mouse_cleanup();
        mouse::cleanup_index(index);
        keyboard::cleanup_index(index);
        focus::cleanup_index(index);
        release_index(index);
    })
}

/// Create a progress bar bound to a ratio in [0, 1].
pub fn progress(props: ProgressProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_layout_node(index);

    core::set_component_type(index, ComponentType::Progress);
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

    // The ratio travels through text content; the painter parses it back.
    match props.value {
        PropValue::Static(v) => text_arrays::set_text_content(index, v.to_string()),
        PropValue::Signal(s) => {
            text_arrays::set_text_content_getter(index, move || s.get().to_string())
        }
        PropValue::Getter(g) => {
            text_arrays::set_text_content_getter(index, move || g().to_string())
        }
    }

    if let Some(v) = props.width {
        bind_slot(&node.width, v);
    }
    if let Some(v) = props.height {
        bind_slot(&node.height, v);
    }
    if let Some(fg) = props.fg {
        match fg {
            PropValue::Static(v) => visual::set_fg_color(index, v),
            PropValue::Signal(s) => visual::set_fg_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_fg_color_getter(index, move || g()),
        }
    }
    if let Some(bg) = props.bg {
        match bg {
            PropValue::Static(v) => visual::set_bg_color(index, v),
            PropValue::Signal(s) => visual::set_bg_color_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_bg_color_getter(index, move || g()),
        }
    }

    lifecycle::run_mount_callbacks(index);

    Box::new(move || {
        release_index(index);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reset_registry;
    use crate::state::keyboard::KeyboardEvent;
    use weft_signals::signal;

    fn setup() {
        reset_registry();
        keyboard::reset_keyboard_state();
        focus::reset_focus_state();
        crate::state::mouse::reset_mouse_state();
    }

    #[test]
    fn select_shows_selected_option() {
        setup();
        let selected = signal(1usize);
        let _cleanup = select(SelectProps::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            selected.clone(),
        ));
        assert_eq!(text_arrays::get_text_content(0), "b");
        selected.set(2);
        assert_eq!(text_arrays::get_text_content(0), "c");
    }

    #[test]
    fn select_arrows_move_selection() {
        setup();
        let selected = signal(0usize);
        let _cleanup = select(SelectProps::new(
            vec!["a".to_string(), "b".to_string()],
            selected.clone(),
        ));
        focus::focus(0);

        keyboard::route_event(KeyboardEvent::new("ArrowDown"));
        assert_eq!(selected.get(), 1);
        keyboard::route_event(KeyboardEvent::new("ArrowDown"));
        assert_eq!(selected.get(), 1, "clamped at the last option");
        keyboard::route_event(KeyboardEvent::new("ArrowUp"));
        assert_eq!(selected.get(), 0);
    }

    #[test]
    fn progress_content_tracks_value() {
        setup();
        let ratio = signal(0.25f32);
        let _cleanup = progress(ProgressProps {
            value: ratio.clone().into(),
            ..Default::default()
        });
        assert_eq!(text_arrays::get_text_content(0), "0.25");
        ratio.set(0.75);
        assert_eq!(text_arrays::get_text_content(0), "0.75");
    }
}
