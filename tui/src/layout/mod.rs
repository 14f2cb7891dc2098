//! Layout: the flex solver and text measurement.

pub mod solver;
pub mod text_measure;

pub use solver::{compute_layout, reset_layout_scratch};
pub use text_measure::{
    char_display_width, display_width, max_line_width, measure_text_height, truncate_text,
    wrap_text,
};

/// Output of the layout solver: parallel arrays indexed by component index,
/// plus the overall content bounds.
///
/// Coordinates are absolute (terminal-space, before scroll offsets); the
/// frame-buffer producer subtracts accumulated scroll when painting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComputedLayout {
    pub x: Vec<u16>,
    pub y: Vec<u16>,
    pub width: Vec<u16>,
    pub height: Vec<u16>,
    pub scrollable: Vec<u8>,
    pub max_scroll_x: Vec<u16>,
    pub max_scroll_y: Vec<u16>,
    pub content_width: u16,
    pub content_height: u16,
}

impl ComputedLayout {
    pub fn with_capacity(size: usize) -> Self {
        Self {
            x: vec![0; size],
            y: vec![0; size],
            width: vec![0; size],
            height: vec![0; size],
            scrollable: vec![0; size],
            max_scroll_x: vec![0; size],
            max_scroll_y: vec![0; size],
            content_width: 0,
            content_height: 0,
        }
    }

    /// Rect accessor tolerating out-of-range indices (released components).
    pub fn rect(&self, index: usize) -> (u16, u16, u16, u16) {
        (
            self.x.get(index).copied().unwrap_or(0),
            self.y.get(index).copied().unwrap_or(0),
            self.width.get(index).copied().unwrap_or(0),
            self.height.get(index).copied().unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::{core, text};
    use crate::engine::{allocate_index, create_layout_node, reset_registry};
    use crate::types::{ComponentType, Dimension};

    fn setup() {
        reset_registry();
    }

    fn make_box(parent: Option<usize>, w: u16, h: u16) -> usize {
        let index = allocate_index(None);
        core::set_component_type(index, ComponentType::Box);
        core::set_parent_index(index, parent);
        let node = create_layout_node(index);
        if w > 0 {
            node.width.set_value(Dimension::Cells(w));
        }
        if h > 0 {
            node.height.set_value(Dimension::Cells(h));
        }
        index
    }

    #[test]
    fn empty_layout() {
        setup();
        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.content_width, 0);
        assert_eq!(layout.content_height, 0);
    }

    #[test]
    fn single_root() {
        setup();
        let root = make_box(None, 40, 10);
        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.rect(root), (0, 0, 40, 10));
        assert_eq!(layout.content_width, 40);
        assert_eq!(layout.content_height, 10);
    }

    #[test]
    fn root_defaults_to_terminal_size() {
        setup();
        let root = make_box(None, 0, 0);
        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.rect(root), (0, 0, 80, 24));
    }

    #[test]
    fn percent_resolves_against_parent() {
        setup();
        let root = make_box(None, 40, 10);
        let child = allocate_index(None);
        core::set_component_type(child, ComponentType::Box);
        core::set_parent_index(child, Some(root));
        let node = create_layout_node(child);
        node.width.set_value(Dimension::Percent(50.0));
        node.height.set_value(Dimension::Cells(2));

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.width[child], 20);
    }

    #[test]
    fn row_places_side_by_side() {
        setup();
        let root = make_box(None, 40, 10);
        create_layout_node(root).flex_direction.set_value(1); // row
        let a = make_box(Some(root), 10, 5);
        let b = make_box(Some(root), 10, 5);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[a], 0);
        assert_eq!(layout.x[b], 10);
        assert_eq!(layout.y[a], 0);
    }

    #[test]
    fn justify_space_between() {
        setup();
        // S2: row of width 20, three children of width 4.
        let root = make_box(None, 20, 1);
        let node = create_layout_node(root);
        node.flex_direction.set_value(1);
        node.justify_content.set_value(3); // between
        let a = make_box(Some(root), 4, 1);
        let b = make_box(Some(root), 4, 1);
        let c = make_box(Some(root), 4, 1);

        let layout = compute_layout(80, 24, true);
        assert_eq!([layout.x[a], layout.x[b], layout.x[c]], [0, 8, 16]);
        assert_eq!(layout.width[a], 4);
    }

    #[test]
    fn grow_distributes_with_residue_on_last() {
        setup();
        // S3: row of width 30, grow factors 1/2/1.
        let root = make_box(None, 30, 1);
        create_layout_node(root).flex_direction.set_value(1);
        let grows = [1.0f32, 2.0, 1.0];
        let kids: Vec<usize> = grows
            .iter()
            .map(|&g| {
                let k = make_box(Some(root), 0, 1);
                create_layout_node(k).flex_grow.set_value(g);
                k
            })
            .collect();

        let layout = compute_layout(80, 24, true);
        let widths: Vec<u16> = kids.iter().map(|&k| layout.width[k]).collect();
        assert_eq!(widths.iter().sum::<u16>(), 30, "grow must fill the line");
        assert_eq!(widths, vec![7, 15, 8]);
    }

    #[test]
    fn shrink_never_goes_negative() {
        setup();
        let root = make_box(None, 10, 1);
        create_layout_node(root).flex_direction.set_value(1);
        let a = make_box(Some(root), 30, 1);
        let b = make_box(Some(root), 30, 1);

        let layout = compute_layout(80, 24, true);
        let total = layout.width[a] + layout.width[b];
        assert!(total <= 10 + 1, "shrink keeps children within the line");
    }

    #[test]
    fn text_remeasures_at_final_width() {
        setup();
        // S4: a 10-wide box re-wraps its text once width is known.
        let root = make_box(None, 10, 0);
        let txt = allocate_index(None);
        core::set_component_type(txt, ComponentType::Text);
        core::set_parent_index(txt, Some(root));
        create_layout_node(txt);
        text::set_text_content(txt, "hello world foo".to_string());

        let layout = compute_layout(40, 24, false);
        assert_eq!(layout.width[txt], 10);
        assert_eq!(layout.height[txt], 2, "wraps to [hello][world foo]");
        assert_eq!(layout.height[root], 2, "intrinsic parent grows with text");
    }

    #[test]
    fn scroll_ranges() {
        setup();
        // S5: 10x5 scroll box with 12 single-row children.
        let root = make_box(None, 10, 5);
        create_layout_node(root).overflow.set_value(2); // scroll
        for _ in 0..12 {
            make_box(Some(root), 10, 1);
        }

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.scrollable[root], 1);
        assert_eq!(layout.max_scroll_y[root], 7);
        assert_eq!(layout.max_scroll_x[root], 0);
    }

    #[test]
    fn border_and_padding_shrink_content() {
        setup();
        // S1 layout shape: 10x3 bordered box, text inside at (1,1) width 8.
        let root = make_box(None, 10, 3);
        let node = create_layout_node(root);
        node.border_top.set_value(1);
        node.border_right.set_value(1);
        node.border_bottom.set_value(1);
        node.border_left.set_value(1);

        let txt = allocate_index(None);
        core::set_component_type(txt, ComponentType::Text);
        core::set_parent_index(txt, Some(root));
        create_layout_node(txt);
        text::set_text_content(txt, "Hi".to_string());

        let layout = compute_layout(40, 24, false);
        assert_eq!(layout.rect(txt), (1, 1, 8, 1));
    }

    #[test]
    fn order_property_reorders_flow() {
        setup();
        let root = make_box(None, 20, 1);
        create_layout_node(root).flex_direction.set_value(1);
        let a = make_box(Some(root), 5, 1);
        let b = make_box(Some(root), 5, 1);
        create_layout_node(a).order.set_value(1);
        // b keeps order 0 and now lays out first.

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[b], 0);
        assert_eq!(layout.x[a], 5);
    }

    #[test]
    fn absolute_positions_against_ancestor_insets() {
        setup();
        let root = make_box(None, 40, 20);
        let abs = make_box(Some(root), 10, 4);
        let node = create_layout_node(abs);
        node.position.set_value(1); // absolute
        node.inset_top.set_value(3);
        node.inset_left.set_value(5);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.rect(abs), (5, 3, 10, 4));
    }

    #[test]
    fn absolute_right_bottom_when_left_top_unset() {
        setup();
        let root = make_box(None, 40, 20);
        let abs = make_box(Some(root), 10, 4);
        let node = create_layout_node(abs);
        node.position.set_value(1);
        node.inset_right.set_value(2);
        node.inset_bottom.set_value(1);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.x[abs], 40 - 2 - 10);
        assert_eq!(layout.y[abs], 20 - 1 - 4);
    }

    #[test]
    fn invisible_subtree_is_skipped() {
        setup();
        let root = make_box(None, 20, 5);
        let hidden = make_box(Some(root), 10, 2);
        core::set_visible(hidden, false);
        let _inner = make_box(Some(hidden), 5, 1);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.width[hidden], 0, "invisible children are not placed");
    }

    #[test]
    fn column_reverse_stacks_upward() {
        setup();
        let root = make_box(None, 10, 10);
        create_layout_node(root).flex_direction.set_value(2); // column-reverse
        let a = make_box(Some(root), 10, 2);
        let b = make_box(Some(root), 10, 2);

        let layout = compute_layout(80, 24, true);
        assert_eq!(layout.y[a], 8, "first child sits at the bottom");
        assert_eq!(layout.y[b], 6);
    }
}
