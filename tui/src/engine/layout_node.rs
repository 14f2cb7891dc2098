//! LayoutNode - per-component bundle of reactive layout slots.
//!
//! Every component owns one LayoutNode for its whole lifetime. Each property
//! is a [`Slot`] so it can hold a literal, follow a signal, or evaluate a
//! getter; the layout solver reads `.get()` inside the layout derived, which
//! subscribes it to exactly the slots it touched.

use weft_signals::{slot, Slot};

use crate::types::Dimension;

/// Reactive layout properties for one component.
///
/// Enum-valued fields store the raw `u8` discriminant (normalized via
/// `From<u8>` at read time); sizes are [`Dimension`] slots.
pub struct LayoutNode {
    pub index: usize,

    // Container
    pub flex_direction: Slot<u8>,
    pub flex_wrap: Slot<u8>,
    pub justify_content: Slot<u8>,
    pub align_items: Slot<u8>,

    // Item
    pub flex_grow: Slot<f32>,
    pub flex_shrink: Slot<f32>,
    pub flex_basis: Slot<Dimension>,
    pub align_self: Slot<u8>,
    pub order: Slot<i32>,

    // Dimensions
    pub width: Slot<Dimension>,
    pub height: Slot<Dimension>,
    pub min_width: Slot<Dimension>,
    pub max_width: Slot<Dimension>,
    pub min_height: Slot<Dimension>,
    pub max_height: Slot<Dimension>,

    // Spacing
    pub margin_top: Slot<u16>,
    pub margin_right: Slot<u16>,
    pub margin_bottom: Slot<u16>,
    pub margin_left: Slot<u16>,
    pub padding_top: Slot<u16>,
    pub padding_right: Slot<u16>,
    pub padding_bottom: Slot<u16>,
    pub padding_left: Slot<u16>,
    pub gap: Slot<u16>,

    // Border widths (0 or 1); the solver only needs thickness.
    pub border_top: Slot<u16>,
    pub border_right: Slot<u16>,
    pub border_bottom: Slot<u16>,
    pub border_left: Slot<u16>,

    // Positioning
    pub overflow: Slot<u8>,
    pub position: Slot<u8>,
    /// Insets for absolute/fixed positioning. `i32::MIN` means unset;
    /// left wins over right, top over bottom.
    pub inset_top: Slot<i32>,
    pub inset_right: Slot<i32>,
    pub inset_bottom: Slot<i32>,
    pub inset_left: Slot<i32>,
}

/// Inset slot value meaning "not specified".
pub const INSET_UNSET: i32 = i32::MIN;

impl LayoutNode {
    pub fn new(index: usize) -> Self {
        Self {
            index,

            flex_direction: slot(Some(0)), // column
            flex_wrap: slot(Some(0)),      // nowrap
            justify_content: slot(Some(0)),
            align_items: slot(Some(0)), // stretch

            flex_grow: slot(Some(0.0)),
            flex_shrink: slot(Some(1.0)),
            flex_basis: slot(Some(Dimension::Auto)),
            align_self: slot(Some(0)), // auto
            order: slot(Some(0)),

            width: slot(Some(Dimension::Auto)),
            height: slot(Some(Dimension::Auto)),
            min_width: slot(Some(Dimension::Auto)),
            max_width: slot(Some(Dimension::Auto)),
            min_height: slot(Some(Dimension::Auto)),
            max_height: slot(Some(Dimension::Auto)),

            margin_top: slot(Some(0)),
            margin_right: slot(Some(0)),
            margin_bottom: slot(Some(0)),
            margin_left: slot(Some(0)),
            padding_top: slot(Some(0)),
            padding_right: slot(Some(0)),
            padding_bottom: slot(Some(0)),
            padding_left: slot(Some(0)),
            gap: slot(Some(0)),

            border_top: slot(Some(0)),
            border_right: slot(Some(0)),
            border_bottom: slot(Some(0)),
            border_left: slot(Some(0)),

            overflow: slot(Some(0)),
            position: slot(Some(0)),
            inset_top: slot(Some(INSET_UNSET)),
            inset_right: slot(Some(INSET_UNSET)),
            inset_bottom: slot(Some(INSET_UNSET)),
            inset_left: slot(Some(INSET_UNSET)),
        }
    }

    /// Break every reactive binding and restore defaults. Called on release.
    pub fn disconnect(&self) {
        self.flex_direction.set_value(0);
        self.flex_wrap.set_value(0);
        self.justify_content.set_value(0);
        self.align_items.set_value(0);

        self.flex_grow.set_value(0.0);
        self.flex_shrink.set_value(1.0);
        self.flex_basis.set_value(Dimension::Auto);
        self.align_self.set_value(0);
        self.order.set_value(0);

        self.width.set_value(Dimension::Auto);
        self.height.set_value(Dimension::Auto);
        self.min_width.set_value(Dimension::Auto);
        self.max_width.set_value(Dimension::Auto);
        self.min_height.set_value(Dimension::Auto);
        self.max_height.set_value(Dimension::Auto);

        self.margin_top.set_value(0);
        self.margin_right.set_value(0);
        self.margin_bottom.set_value(0);
        self.margin_left.set_value(0);
        self.padding_top.set_value(0);
        self.padding_right.set_value(0);
        self.padding_bottom.set_value(0);
        self.padding_left.set_value(0);
        self.gap.set_value(0);

        self.border_top.set_value(0);
        self.border_right.set_value(0);
        self.border_bottom.set_value(0);
        self.border_left.set_value(0);

        self.overflow.set_value(0);
        self.position.set_value(0);
        self.inset_top.set_value(INSET_UNSET);
        self.inset_right.set_value(INSET_UNSET);
        self.inset_bottom.set_value(INSET_UNSET);
        self.inset_left.set_value(INSET_UNSET);
    }

    /// Border thickness per side as 0/1 cells.
    pub fn border_widths(&self) -> (u16, u16, u16, u16) {
        (
            if self.border_top.get() > 0 { 1 } else { 0 },
            if self.border_right.get() > 0 { 1 } else { 0 },
            if self.border_bottom.get() > 0 { 1 } else { 0 },
            if self.border_left.get() > 0 { 1 } else { 0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_signals::signal;

    #[test]
    fn defaults() {
        let node = LayoutNode::new(0);
        assert_eq!(node.flex_direction.get(), 0);
        assert_eq!(node.flex_shrink.get(), 1.0);
        assert_eq!(node.width.get(), Dimension::Auto);
        assert_eq!(node.inset_left.get(), INSET_UNSET);
    }

    #[test]
    fn signal_binding() {
        let node = LayoutNode::new(0);
        let w = signal(Dimension::Cells(30));
        node.width.set_signal(w.clone());
        assert_eq!(node.width.get(), Dimension::Cells(30));
        w.set(Dimension::Cells(60));
        assert_eq!(node.width.get(), Dimension::Cells(60));
    }

    #[test]
    fn disconnect_restores_defaults() {
        let node = LayoutNode::new(0);
        node.width.set_value(Dimension::Cells(100));
        node.padding_top.set_value(5);
        node.flex_grow.set_value(2.0);

        node.disconnect();
        assert_eq!(node.width.get(), Dimension::Auto);
        assert_eq!(node.padding_top.get(), 0);
        assert_eq!(node.flex_grow.get(), 0.0);
    }
}
