//! The text leaf primitive.

use super::box_primitive::bind_slot;
use super::lifecycle;
use super::types::{Cleanup, PropValue, TextProps};
use crate::engine::arrays::{core, interaction, text as text_arrays, visual};
use crate::engine::{
    allocate_index, create_layout_node, get_current_parent_index, release_index,
};
use crate::state::{keyboard, mouse};
use crate::types::ComponentType;

/// Create a text component. Returns its cleanup closure.
pub fn text(props: TextProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_layout_node(index);

    core::set_component_type(index, ComponentType::Text);
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

    match props.content {
        PropValue::Static(v) => text_arrays::set_text_content(index, v),
        PropValue::Signal(s) => text_arrays::set_text_content_signal(index, s),
        PropValue::Getter(g) => text_arrays::set_text_content_getter(index, move || g()),
    }

    if let Some(attrs) = props.attrs {
        match attrs {
            PropValue::Static(v) => text_arrays::set_text_attrs(index, v),
            PropValue::Signal(s) => text_arrays::set_text_attrs_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_text_attrs_getter(index, move || g()),
        }
    }
    if let Some(align) = props.align {
        match align {
            PropValue::Static(v) => text_arrays::set_text_align(index, v),
            PropValue::Signal(s) => text_arrays::set_text_align_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_text_align_getter(index, move || g()),
        }
    }
    if let Some(wrap) = props.wrap {
        match wrap {
            PropValue::Static(v) => text_arrays::set_text_wrap(index, v),
            PropValue::Signal(s) => text_arrays::set_text_wrap_getter(index, move || s.get()),
            PropValue::Getter(g) => text_arrays::set_text_wrap_getter(index, move || g()),
        }
    }

    if let Some(v) = props.grow {
        bind_slot(&node.flex_grow, v);
    }
    if let Some(v) = props.shrink {
        bind_slot(&node.flex_shrink, v);
    }
    if let Some(v) = props.width {
        bind_slot(&node.width, v);
    }
    if let Some(v) = props.height {
        bind_slot(&node.height, v);
    }
    if let Some(v) = props.max_width {
        bind_slot(&node.max_width, v);
    }
    if let Some(v) = props.max_height {
        bind_slot(&node.max_height, v);
    }
    if let Some(p) = props.padding {
        bind_slot(&node.padding_top, p.clone());
        bind_slot(&node.padding_right, p.clone());
        bind_slot(&node.padding_bottom, p.clone());
        bind_slot(&node.padding_left, p);
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
    if let Some(opacity) = props.opacity {
        match opacity {
            PropValue::Static(v) => visual::set_opacity(index, v),
            PropValue::Signal(s) => visual::set_opacity_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_opacity_getter(index, move || g()),
        }
    }
    if let Some(z) = props.z_index {
        match z {
            PropValue::Static(v) => visual::set_z_index(index, v),
            PropValue::Signal(s) => visual::set_z_index_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_z_index_getter(index, move || g()),
        }
    }

    let focusable = props.focusable.unwrap_or(false);
    if focusable {
        interaction::set_focusable(index, true);
        if let Some(tab) = props.tab_index {
            interaction::set_tab_index(index, tab);
        }
    }

    let mut mouse_cleanup: Option<Box<dyn FnOnce()>> = None;
    if props.on_click.is_some() || focusable {
        mouse_cleanup = Some(Box::new(mouse::on_component(
            index,
            mouse::MouseHandlers {
                on_click: props.on_click.clone(),
                ..Default::default()
            },
        )));
    }
    let mut key_cleanup: Option<Box<dyn FnOnce()>> = None;
    if let Some(on_key) = props.on_key.clone() {
        key_cleanup = Some(Box::new(keyboard::on_focused(index, move |event| {
            on_key(event)
        })));
    }

    lifecycle::run_mount_callbacks(index);

    Box::new(move || {
        if let Some(cleanup) = mouse_cleanup {
            cleanup();
        }
        if let Some(cleanup) = key_cleanup {
            cleanup();
        }
        mouse::cleanup_index(index);
        keyboard::cleanup_index(index);
        crate::state::focus::cleanup_index(index);
        release_index(index);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_allocated_count, reset_registry};
    use crate::types::{Attr, TextAlign};
    use weft_signals::signal;

    fn setup() {
        reset_registry();
        crate::state::mouse::reset_mouse_state();
        crate::state::keyboard::reset_keyboard_state();
    }

    #[test]
    fn writes_text_arrays() {
        setup();
        let _cleanup = text(TextProps {
            content: "hello".into(),
            attrs: Some(Attr::BOLD.into()),
            align: Some(TextAlign::Center.into()),
            ..Default::default()
        });
        assert_eq!(core::get_component_type(0), ComponentType::Text);
        assert_eq!(text_arrays::get_text_content(0), "hello");
        assert_eq!(text_arrays::get_text_attrs(0), Attr::BOLD);
        assert_eq!(text_arrays::get_text_align(0), TextAlign::Center);
    }

    #[test]
    fn reactive_content() {
        setup();
        let message = signal("one".to_string());
        let _cleanup = text(TextProps {
            content: message.clone().into(),
            ..Default::default()
        });
        assert_eq!(text_arrays::get_text_content(0), "one");
        message.set("two".to_string());
        assert_eq!(text_arrays::get_text_content(0), "two");
    }

    #[test]
    fn cleanup_releases() {
        setup();
        let cleanup = text(TextProps {
            content: "x".into(),
            ..Default::default()
        });
        assert_eq!(get_allocated_count(), 1);
        cleanup();
        assert_eq!(get_allocated_count(), 0);
    }
}
