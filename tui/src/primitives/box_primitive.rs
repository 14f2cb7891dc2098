//! The box container primitive.
//!
//! Allocates an index, binds every prop into the layout node and the
//! parallel arrays (keeping signals and getters live), registers input
//! handlers, runs the children closure with itself as parent context, fires
//! mount callbacks, and returns the cleanup closure that tears it all down.

use weft_signals::Slot;

use super::lifecycle;
use super::types::{BoxProps, Cleanup, PropValue};
use crate::engine::arrays::{core, interaction, visual};
use crate::engine::{
    allocate_index, create_layout_node, get_current_parent_index, pop_current_component,
    pop_parent_context, push_current_component, push_parent_context, release_index,
};
use crate::state::{focus, keyboard, mouse};
use crate::types::{BorderStyle, ComponentType, Rgba};

/// Bind a prop into a layout-node slot, preserving reactivity.
pub(crate) fn bind_slot<T: Clone + PartialEq + 'static>(slot: &Slot<T>, prop: PropValue<T>) {
    match prop {
        PropValue::Static(v) => slot.set_value(v),
        PropValue::Signal(s) => slot.set_signal(s),
        PropValue::Getter(g) => slot.set_getter(move || g()),
    }
}

/// Border width (0/1) tracking a border-style prop.
fn bind_border_width(slot: &Slot<u16>, prop: &PropValue<BorderStyle>) {
    match prop {
        PropValue::Static(style) => {
            slot.set_value(if *style != BorderStyle::None { 1 } else { 0 });
        }
        PropValue::Signal(s) => {
            let s = s.clone();
            slot.set_getter(move || if s.get() != BorderStyle::None { 1 } else { 0 });
        }
        PropValue::Getter(g) => {
            let g = g.clone();
            slot.set_getter(move || if g() != BorderStyle::None { 1 } else { 0 });
        }
    }
}

fn bind_visual_color(
    index: usize,
    prop: PropValue<Rgba>,
    set_value: fn(usize, Rgba),
    set_getter: fn(usize, Box<dyn Fn() -> Rgba>),
) {
    match prop {
        PropValue::Static(v) => set_value(index, v),
        PropValue::Signal(s) => set_getter(index, Box::new(move || s.get())),
        PropValue::Getter(g) => set_getter(index, Box::new(move || g())),
    }
}

/// Create a box container. Returns its cleanup closure.
pub fn box_primitive(props: BoxProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    let node = create_layout_node(index);

    core::set_component_type(index, ComponentType::Box);
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

    // Layout: container.
    if let Some(v) = props.flex_direction {
        bind_slot(&node.flex_direction, v);
    }
    if let Some(v) = props.flex_wrap {
        bind_slot(&node.flex_wrap, v);
    }
    if let Some(v) = props.justify_content {
        bind_slot(&node.justify_content, v);
    }
    if let Some(v) = props.align_items {
        bind_slot(&node.align_items, v);
    }

    // Layout: item.
    if let Some(v) = props.grow {
        bind_slot(&node.flex_grow, v);
    }
    if let Some(v) = props.shrink {
        bind_slot(&node.flex_shrink, v);
    }
    if let Some(v) = props.flex_basis {
        bind_slot(&node.flex_basis, v);
    }
    if let Some(v) = props.align_self {
        bind_slot(&node.align_self, v);
    }
    if let Some(v) = props.order {
        bind_slot(&node.order, v);
    }

    // Dimensions.
    if let Some(v) = props.width {
        bind_slot(&node.width, v);
    }
    if let Some(v) = props.height {
        bind_slot(&node.height, v);
    }
    if let Some(v) = props.min_width {
        bind_slot(&node.min_width, v);
    }
    if let Some(v) = props.max_width {
        bind_slot(&node.max_width, v);
    }
    if let Some(v) = props.min_height {
        bind_slot(&node.min_height, v);
    }
    if let Some(v) = props.max_height {
        bind_slot(&node.max_height, v);
    }

    // Spacing; the shorthand fills sides without their own prop.
    if let Some(m) = &props.margin {
        if props.margin_top.is_none() {
            bind_slot(&node.margin_top, m.clone());
        }
        if props.margin_right.is_none() {
            bind_slot(&node.margin_right, m.clone());
        }
        if props.margin_bottom.is_none() {
            bind_slot(&node.margin_bottom, m.clone());
        }
        if props.margin_left.is_none() {
            bind_slot(&node.margin_left, m.clone());
        }
    }
    if let Some(v) = props.margin_top {
        bind_slot(&node.margin_top, v);
    }
    if let Some(v) = props.margin_right {
        bind_slot(&node.margin_right, v);
    }
    if let Some(v) = props.margin_bottom {
        bind_slot(&node.margin_bottom, v);
    }
    if let Some(v) = props.margin_left {
        bind_slot(&node.margin_left, v);
    }

    if let Some(p) = &props.padding {
        if props.padding_top.is_none() {
            bind_slot(&node.padding_top, p.clone());
        }
        if props.padding_right.is_none() {
            bind_slot(&node.padding_right, p.clone());
        }
        if props.padding_bottom.is_none() {
            bind_slot(&node.padding_bottom, p.clone());
        }
        if props.padding_left.is_none() {
            bind_slot(&node.padding_left, p.clone());
        }
    }
    if let Some(v) = props.padding_top {
        bind_slot(&node.padding_top, v);
    }
    if let Some(v) = props.padding_right {
        bind_slot(&node.padding_right, v);
    }
    if let Some(v) = props.padding_bottom {
        bind_slot(&node.padding_bottom, v);
    }
    if let Some(v) = props.padding_left {
        bind_slot(&node.padding_left, v);
    }
    if let Some(v) = props.gap {
        bind_slot(&node.gap, v);
    }

    // Positioning.
    if let Some(v) = props.position {
        bind_slot(&node.position, v);
    }
    if let Some(v) = props.top {
        bind_slot(&node.inset_top, v);
    }
    if let Some(v) = props.right {
        bind_slot(&node.inset_right, v);
    }
    if let Some(v) = props.bottom {
        bind_slot(&node.inset_bottom, v);
    }
    if let Some(v) = props.left {
        bind_slot(&node.inset_left, v);
    }
    if let Some(v) = props.overflow {
        bind_slot(&node.overflow, v);
    }
    if props.stick_to_bottom {
        interaction::set_stick_to_bottom(index, true);
    }

    // Border: width slots for layout, style arrays for paint. Per-side
    // styles override the shorthand.
    if let Some(border) = &props.border {
        bind_border_width(&node.border_top, border);
        bind_border_width(&node.border_right, border);
        bind_border_width(&node.border_bottom, border);
        bind_border_width(&node.border_left, border);
        match border.clone() {
            PropValue::Static(v) => visual::set_border_style(index, v),
            PropValue::Signal(s) => visual::set_border_style_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_border_style_getter(index, move || g()),
        }
    }
    for (prop, slot, set_side) in [
        (
            &props.border_top,
            &node.border_top,
            visual::set_border_style_top as fn(usize, BorderStyle),
        ),
        (&props.border_right, &node.border_right, visual::set_border_style_right),
        (&props.border_bottom, &node.border_bottom, visual::set_border_style_bottom),
        (&props.border_left, &node.border_left, visual::set_border_style_left),
    ] {
        if let Some(side) = prop {
            bind_border_width(slot, side);
            set_side(index, side.get());
        }
    }
    if let Some(v) = props.border_color {
        bind_visual_color(index, v, visual::set_border_color, |i, g| {
            visual::set_border_color_getter(i, g)
        });
    }

    // Visual.
    if let Some(v) = props.fg {
        bind_visual_color(index, v, visual::set_fg_color, |i, g| {
            visual::set_fg_color_getter(i, g)
        });
    }
    if let Some(v) = props.bg {
        bind_visual_color(index, v, visual::set_bg_color, |i, g| {
            visual::set_bg_color_getter(i, g)
        });
    }
    if let Some(v) = props.opacity {
        match v {
            PropValue::Static(o) => visual::set_opacity(index, o),
            PropValue::Signal(s) => visual::set_opacity_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_opacity_getter(index, move || g()),
        }
    }
    if let Some(v) = props.z_index {
        match v {
            PropValue::Static(z) => visual::set_z_index(index, z),
            PropValue::Signal(s) => visual::set_z_index_getter(index, move || s.get()),
            PropValue::Getter(g) => visual::set_z_index_getter(index, move || g()),
        }
    }

    // Interaction.
    let focusable = props.focusable.unwrap_or(false);
    if focusable {
        interaction::set_focusable(index, true);
        if let Some(tab) = props.tab_index {
            interaction::set_tab_index(index, tab);
        }
    }

    let has_mouse_handlers = props.on_click.is_some()
        || props.on_mouse_down.is_some()
        || props.on_mouse_up.is_some()
        || props.on_mouse_enter.is_some()
        || props.on_mouse_leave.is_some()
        || props.on_scroll.is_some();

    let mut mouse_cleanup: Option<Box<dyn FnOnce()>> = None;
    if has_mouse_handlers || focusable {
        let handlers = mouse::MouseHandlers {
            on_mouse_down: props.on_mouse_down.clone(),
            on_mouse_up: props.on_mouse_up.clone(),
            on_click: props.on_click.clone(),
            on_mouse_enter: props.on_mouse_enter.clone(),
            on_mouse_leave: props.on_mouse_leave.clone(),
            on_scroll: props.on_scroll.clone(),
        };
        mouse_cleanup = Some(Box::new(mouse::on_component(index, handlers)));
    }

    let mut key_cleanup: Option<Box<dyn FnOnce()>> = None;
    if let Some(on_key) = props.on_key.clone() {
        key_cleanup = Some(Box::new(keyboard::on_focused(index, move |event| {
            on_key(event)
        })));
    }

    let mut focus_cleanup: Option<Box<dyn FnOnce()>> = None;
    if props.on_focus.is_some() || props.on_blur.is_some() {
        let on_focus = props.on_focus.clone();
        let on_blur = props.on_blur.clone();
        focus_cleanup = Some(Box::new(focus::register_callbacks(
            index,
            focus::FocusCallbacks {
                on_focus: on_focus.map(|f| Box::new(move || f()) as Box<dyn Fn()>),
                on_blur: on_blur.map(|f| Box::new(move || f()) as Box<dyn Fn()>),
            },
        )));
    }

    // Children run with this box as parent and current component.
    if let Some(children) = props.children {
        push_parent_context(index);
        push_current_component(index);
        children();
        pop_current_component();
        pop_parent_context();
    }

    lifecycle::run_mount_callbacks(index);

    Box::new(move || {
        if let Some(cleanup) = mouse_cleanup {
            cleanup();
        }
        if let Some(cleanup) = key_cleanup {
            cleanup();
        }
        if let Some(cleanup) = focus_cleanup {
            cleanup();
        }
        mouse::cleanup_index(index);
        keyboard::cleanup_index(index);
        focus::cleanup_index(index);
        release_index(index);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_allocated_count, get_layout_node, reset_registry};
    use crate::types::Dimension;
    use weft_signals::signal;

    fn setup() {
        reset_registry();
        crate::state::mouse::reset_mouse_state();
        crate::state::keyboard::reset_keyboard_state();
        crate::state::focus::reset_focus_state();
    }

    #[test]
    fn creates_and_cleans_up() {
        setup();
        let cleanup = box_primitive(BoxProps {
            width: Some(50u16.into()),
            height: Some(20u16.into()),
            ..Default::default()
        });
        assert_eq!(core::get_component_type(0), ComponentType::Box);
        assert_eq!(get_layout_node(0).unwrap().width.get(), Dimension::Cells(50));

        cleanup();
        assert_eq!(get_allocated_count(), 0);
    }

    #[test]
    fn nested_children_get_parent_links() {
        setup();
        let _cleanup = box_primitive(BoxProps {
            children: Some(Box::new(|| {
                let _inner = box_primitive(BoxProps::default());
            })),
            ..Default::default()
        });
        assert_eq!(core::get_parent_index(1), Some(0));
    }

    #[test]
    fn reactive_width_stays_bound() {
        setup();
        let width = signal(Dimension::Cells(40));
        let _cleanup = box_primitive(BoxProps {
            width: Some(width.clone().into()),
            ..Default::default()
        });

        let node = get_layout_node(0).unwrap();
        assert_eq!(node.width.get(), Dimension::Cells(40));
        width.set(Dimension::Cells(80));
        assert_eq!(node.width.get(), Dimension::Cells(80));
    }

    #[test]
    fn border_sets_style_and_widths() {
        setup();
        let _cleanup = box_primitive(BoxProps {
            border: Some(BorderStyle::Single.into()),
            ..Default::default()
        });
        assert_eq!(visual::get_border_style(0), BorderStyle::Single);
        assert_eq!(get_layout_node(0).unwrap().border_top.get(), 1);
    }

    #[test]
    fn focusable_registers_interaction() {
        setup();
        let _cleanup = box_primitive(BoxProps {
            focusable: Some(true),
            tab_index: Some(5),
            ..Default::default()
        });
        assert!(interaction::get_focusable(0));
        assert_eq!(interaction::get_tab_index(0), 5);
    }

    #[test]
    fn cleanup_releases_children_recursively() {
        setup();
        let cleanup = box_primitive(BoxProps {
            children: Some(Box::new(|| {
                let _a = box_primitive(BoxProps::default());
                let _b = box_primitive(BoxProps {
                    children: Some(Box::new(|| {
                        let _c = box_primitive(BoxProps::default());
                    })),
                    ..Default::default()
                });
            })),
            ..Default::default()
        });
        assert_eq!(get_allocated_count(), 4);
        cleanup();
        assert_eq!(get_allocated_count(), 0);
    }
}
