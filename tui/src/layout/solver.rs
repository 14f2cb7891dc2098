//! Flex layout solver.
//!
//! Five O(n) passes over parallel arrays, no recursion:
//!
//! 1. Reset scratch and build sibling chains from `parent_index`
//! 2. BFS to order parents before children
//! 3. Bottom-up intrinsic sizing (reverse BFS)
//! 4. Top-down placement with flex-line collection, grow/shrink, justify
//!    and align
//! 5. Absolute/fixed positioning against the nearest positioned ancestor
//!
//! The solver reads layout-node slots and the text arrays; when it runs
//! inside the layout derived those reads are what subscribe the derived to
//! its inputs. Invalid enum values normalize to defaults and missing cells
//! read as zero, so well-formed trees can never panic here.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::arrays::{core, text};
use crate::engine::{get_allocated_indices, get_layout_node, LayoutNode, INSET_UNSET};
use crate::types::{ComponentType, Dimension, FlexDirection, FlexWrap, JustifyContent, Overflow, Position};

use super::text_measure::{display_width, max_line_width, measure_text_height};
use super::ComputedLayout;

// =============================================================================
// Scratch
// =============================================================================

#[derive(Default)]
struct Scratch {
    first_child: Vec<i32>,
    next_sibling: Vec<i32>,
    last_child: Vec<i32>,
    intrinsic_w: Vec<u16>,
    intrinsic_h: Vec<u16>,
    item_main: Vec<u16>,
    item_cross: Vec<u16>,
}

impl Scratch {
    fn reset(&mut self, size: usize) {
        self.first_child.clear();
        self.first_child.resize(size, -1);
        self.next_sibling.clear();
        self.next_sibling.resize(size, -1);
        self.last_child.clear();
        self.last_child.resize(size, -1);
        self.intrinsic_w.clear();
        self.intrinsic_w.resize(size, 0);
        self.intrinsic_h.clear();
        self.intrinsic_h.resize(size, 0);
        self.item_main.clear();
        self.item_main.resize(size, 0);
        self.item_cross.clear();
        self.item_cross.resize(size, 0);
    }
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = RefCell::new(Scratch::default());
}

/// Release scratch storage. Called by the registry's empty-reset.
pub fn reset_layout_scratch() {
    SCRATCH.with(|s| *s.borrow_mut() = Scratch::default());
}

// =============================================================================
// Dimension helpers
// =============================================================================

fn resolve_dimension(dim: Dimension, basis: u16) -> u16 {
    match dim {
        Dimension::Auto => 0,
        Dimension::Cells(n) => n,
        Dimension::Percent(p) => (basis as f32 * p / 100.0).floor().max(0.0) as u16,
    }
}

fn clamp_dimension(value: u16, min: Dimension, max: Dimension, basis: u16) -> u16 {
    let min = resolve_dimension(min, basis);
    let max = resolve_dimension(max, basis);
    let mut out = value;
    if min > 0 && out < min {
        out = min;
    }
    if max > 0 && out > max {
        out = max;
    }
    out
}

fn node_of(index: usize) -> Option<Rc<LayoutNode>> {
    get_layout_node(index)
}

fn padding_and_border(node: &LayoutNode) -> (u16, u16, u16, u16) {
    let (bt, br, bb, bl) = node.border_widths();
    (
        node.padding_top.get() + bt,
        node.padding_right.get() + br,
        node.padding_bottom.get() + bb,
        node.padding_left.get() + bl,
    )
}

// =============================================================================
// Entry point
// =============================================================================

/// Compute layout for every live, visible component.
///
/// `constrain_height` pins roots without an explicit height to the terminal
/// height (fullscreen); otherwise they take their intrinsic height.
pub fn compute_layout(terminal_width: u16, terminal_height: u16, constrain_height: bool) -> ComputedLayout {
    // Terminal size 0 would divide by zero downstream.
    let terminal_width = terminal_width.max(1);
    let terminal_height = terminal_height.max(1);

    let mut indices = get_allocated_indices();
    if indices.is_empty() {
        return ComputedLayout::default();
    }
    indices.sort_unstable();

    let size = indices.iter().max().copied().unwrap_or(0) + 1;
    let mut out = ComputedLayout::with_capacity(size);

    SCRATCH.with(|scratch| {
        let mut s = scratch.borrow_mut();
        s.reset(size);

        // ---------------------------------------------------------------------
        // Pass 1: sibling chains + root collection
        // ---------------------------------------------------------------------
        let mut bfs: Vec<usize> = Vec::with_capacity(indices.len());
        let mut root_count = 0;

        for &i in &indices {
            if !core::get_visible(i) {
                continue;
            }
            match core::get_parent_index(i) {
                Some(parent) if indices.binary_search(&parent).is_ok() => {
                    if s.first_child[parent] == -1 {
                        s.first_child[parent] = i as i32;
                    } else if s.last_child[parent] >= 0 {
                        let last = s.last_child[parent] as usize;
                        s.next_sibling[last] = i as i32;
                    }
                    s.last_child[parent] = i as i32;
                }
                _ => {
                    bfs.push(i);
                    root_count += 1;
                }
            }
        }

        // ---------------------------------------------------------------------
        // Pass 2: BFS order (parents before children)
        // ---------------------------------------------------------------------
        let mut head = 0;
        while head < bfs.len() {
            let parent = bfs[head];
            head += 1;
            let mut child = s.first_child[parent];
            while child >= 0 {
                bfs.push(child as usize);
                child = s.next_sibling[child as usize];
            }
        }

        // ---------------------------------------------------------------------
        // Pass 3: intrinsic sizes, bottom-up
        // ---------------------------------------------------------------------
        for &i in bfs.iter().rev() {
            measure_intrinsic(i, terminal_width, terminal_height, &mut s);
        }

        // ---------------------------------------------------------------------
        // Pass 4: place roots, then children top-down
        // ---------------------------------------------------------------------
        for &root in bfs.iter().take(root_count) {
            place_root(root, terminal_width, terminal_height, constrain_height, &s, &mut out);
        }
        for &parent in &bfs {
            layout_children(parent, constrain_height, &mut s, &mut out);
        }

        // ---------------------------------------------------------------------
        // Pass 5: absolute/fixed elements (then their own subtrees)
        // ---------------------------------------------------------------------
        for &i in &bfs {
            let Some(node) = node_of(i) else { continue };
            let position = Position::from(node.position.get());
            if !matches!(position, Position::Absolute | Position::Fixed) {
                continue;
            }
            place_absolute(i, position, terminal_width, terminal_height, &s, &mut out);

            // Re-place the subtree now that its origin is final.
            let mut queue = vec![i];
            let mut head = 0;
            while head < queue.len() {
                let p = queue[head];
                head += 1;
                layout_children(p, constrain_height, &mut s, &mut out);
                let mut child = s.first_child[p];
                while child >= 0 {
                    queue.push(child as usize);
                    child = s.next_sibling[child as usize];
                }
            }
        }

        // Content bounds: extent of the roots.
        for &root in bfs.iter().take(root_count) {
            out.content_width = out.content_width.max(out.x[root] + out.width[root]);
            out.content_height = out.content_height.max(out.y[root] + out.height[root]);
        }
    });

    out
}

// =============================================================================
// Pass 3 helpers
// =============================================================================

fn text_available_width(i: usize, terminal_width: u16) -> u16 {
    let Some(parent) = core::get_parent_index(i) else {
        return terminal_width;
    };
    let Some(node) = node_of(parent) else {
        return terminal_width;
    };
    let parent_w = resolve_dimension(node.width.get(), terminal_width);
    if parent_w == 0 {
        return terminal_width;
    }
    let (_, pr, _, pl) = padding_and_border(&node);
    parent_w.saturating_sub(pl + pr).max(1)
}

fn measure_intrinsic(i: usize, terminal_width: u16, terminal_height: u16, s: &mut Scratch) {
    match core::get_component_type(i) {
        ComponentType::Text => {
            let content = text::get_text_content(i);
            if content.is_empty() {
                return;
            }
            let wrap = text::get_text_wrap(i);
            let avail = text_available_width(i, terminal_width);
            s.intrinsic_w[i] = max_line_width(&content);
            s.intrinsic_h[i] = measure_text_height(&content, avail, wrap);
        }
        ComponentType::Input | ComponentType::Select => {
            let Some(node) = node_of(i) else { return };
            let (pt, pr, pb, pl) = padding_and_border(&node);
            let content = text::get_text_content(i);
            let extra = if core::get_component_type(i) == ComponentType::Select {
                2 // dropdown indicator
            } else {
                0
            };
            s.intrinsic_w[i] = display_width(&content) + extra + pl + pr;
            s.intrinsic_h[i] = 1 + pt + pb;
        }
        ComponentType::Progress => {
            let Some(node) = node_of(i) else { return };
            let (pt, _, pb, _) = padding_and_border(&node);
            s.intrinsic_h[i] = 1 + pt + pb;
        }
        ComponentType::Box => {
            let Some(node) = node_of(i) else { return };
            let overflow = Overflow::from(node.overflow.get());
            let scrollable = matches!(overflow, Overflow::Scroll | Overflow::Auto);
            let (pt, pr, pb, pl) = padding_and_border(&node);

            if scrollable || s.first_child[i] < 0 {
                // Scrollable boxes (and leaves) have no content-driven size.
                s.intrinsic_w[i] = pl + pr;
                s.intrinsic_h[i] = pt + pb;
                return;
            }

            let direction = FlexDirection::from(node.flex_direction.get());
            let is_row = direction.is_row();
            let gap = node.gap.get();

            let mut sum_main: u16 = 0;
            let mut max_cross: u16 = 0;
            let mut count: u16 = 0;

            let mut kid = s.first_child[i];
            while kid >= 0 {
                let k = kid as usize;
                count += 1;

                let (kid_w, kid_h, margin_main) = match node_of(k) {
                    Some(kn) => {
                        let ew = resolve_dimension(kn.width.get(), terminal_width);
                        let eh = resolve_dimension(kn.height.get(), terminal_height);
                        let w = if ew > 0 { ew } else { s.intrinsic_w[k] };
                        let h = if eh > 0 { eh } else { s.intrinsic_h[k] };
                        let m = if is_row {
                            kn.margin_left.get() + kn.margin_right.get()
                        } else {
                            kn.margin_top.get() + kn.margin_bottom.get()
                        };
                        (w, h, m)
                    }
                    None => (s.intrinsic_w[k], s.intrinsic_h[k], 0),
                };

                if is_row {
                    sum_main = sum_main.saturating_add(kid_w + margin_main + gap);
                    max_cross = max_cross.max(kid_h);
                } else {
                    sum_main = sum_main.saturating_add(kid_h + margin_main + gap);
                    max_cross = max_cross.max(kid_w);
                }
                kid = s.next_sibling[k];
            }
            if count > 0 {
                sum_main = sum_main.saturating_sub(gap);
            }

            if is_row {
                s.intrinsic_w[i] = sum_main + pl + pr;
                s.intrinsic_h[i] = max_cross + pt + pb;
            } else {
                s.intrinsic_w[i] = max_cross + pl + pr;
                s.intrinsic_h[i] = sum_main + pt + pb;
            }
        }
        ComponentType::None => {}
    }
}

// =============================================================================
// Pass 4 helpers
// =============================================================================

fn place_root(
    root: usize,
    terminal_width: u16,
    terminal_height: u16,
    constrain_height: bool,
    s: &Scratch,
    out: &mut ComputedLayout,
) {
    out.x[root] = 0;
    out.y[root] = 0;

    let (ew, eh) = match node_of(root) {
        Some(node) => (
            resolve_dimension(node.width.get(), terminal_width),
            resolve_dimension(node.height.get(), terminal_height),
        ),
        None => (0, 0),
    };

    out.width[root] = if ew > 0 { ew } else { terminal_width };
    out.height[root] = if eh > 0 {
        eh
    } else if constrain_height {
        terminal_height
    } else {
        s.intrinsic_h[root].max(1)
    };
}

/// Main size a child wants before grow/shrink (flex-basis, explicit, or
/// intrinsic).
fn child_base_main(
    k: usize,
    is_row: bool,
    content_w: u16,
    content_h: u16,
    s: &Scratch,
) -> u16 {
    match node_of(k) {
        Some(kn) => {
            let main_basis = if is_row { content_w } else { content_h };
            let basis = resolve_dimension(kn.flex_basis.get(), main_basis);
            if basis > 0 {
                return basis;
            }
            let ew = resolve_dimension(kn.width.get(), content_w);
            let eh = resolve_dimension(kn.height.get(), content_h);
            if is_row {
                if ew > 0 { ew } else { s.intrinsic_w[k] }
            } else if eh > 0 {
                eh
            } else {
                s.intrinsic_h[k]
            }
        }
        None => {
            if is_row {
                s.intrinsic_w[k]
            } else {
                s.intrinsic_h[k]
            }
        }
    }
}

fn layout_children(parent: usize, constrain_height: bool, s: &mut Scratch, out: &mut ComputedLayout) {
    let Some(parent_node) = node_of(parent) else { return };

    // Flow children only; absolute/fixed are placed in pass 5.
    let mut flow: Vec<usize> = Vec::new();
    let mut kid = s.first_child[parent];
    while kid >= 0 {
        let k = kid as usize;
        let in_flow = match node_of(k) {
            Some(kn) => !matches!(
                Position::from(kn.position.get()),
                Position::Absolute | Position::Fixed
            ),
            None => true,
        };
        if in_flow {
            flow.push(k);
        }
        kid = s.next_sibling[k];
    }
    if flow.is_empty() {
        return;
    }

    // Stable order-property sort; allocation order breaks ties.
    flow.sort_by_key(|&k| node_of(k).map_or(0, |n| n.order.get()));

    let (pt, pr, pb, pl) = padding_and_border(&parent_node);
    let content_x = out.x[parent] + pl;
    let content_y = out.y[parent] + pt;
    let content_w = out.width[parent].saturating_sub(pl + pr);
    let content_h = out.height[parent].saturating_sub(pt + pb);

    let direction = FlexDirection::from(parent_node.flex_direction.get());
    let wrap = FlexWrap::from(parent_node.flex_wrap.get());
    let justify = JustifyContent::from(parent_node.justify_content.get());
    let align_items = parent_node.align_items.get();
    let gap = parent_node.gap.get();
    let overflow = Overflow::from(parent_node.overflow.get());

    let is_row = direction.is_row();
    let is_reverse = direction.is_reverse();
    let is_root = core::get_parent_index(parent).is_none();
    // Scroll containers never shrink their children; the constrained root
    // still participates in scroll detection but shrinks normally.
    let scroll_container = matches!(overflow, Overflow::Scroll | Overflow::Auto);
    let scrollable = scroll_container || (is_root && constrain_height);

    let main_size = if is_row { content_w } else { content_h };
    let cross_size = if is_row { content_h } else { content_w };

    // Step 1: collect flex lines.
    let wrapping = !matches!(wrap, FlexWrap::NoWrap);
    let mut line_ranges: Vec<(usize, usize)> = Vec::new(); // inclusive index ranges in `flow`
    let mut line_start = 0;
    let mut used: u16 = 0;

    for (fi, &k) in flow.iter().enumerate() {
        let base = child_base_main(k, is_row, content_w, content_h, s);
        if wrapping && fi > line_start && used + base + gap > main_size {
            line_ranges.push((line_start, fi - 1));
            line_start = fi;
            used = 0;
        }
        used = used.saturating_add(base + gap);
    }
    line_ranges.push((line_start, flow.len() - 1));
    let line_count = line_ranges.len();

    // Step 2: resolve grow/shrink per line, residue to the last item.
    for &(l_start, l_end) in &line_ranges {
        let mut line_base: u16 = 0;
        let mut total_grow = 0.0f32;
        let mut total_shrink = 0.0f32;
        for fi in l_start..=l_end {
            let k = flow[fi];
            line_base = line_base.saturating_add(child_base_main(k, is_row, content_w, content_h, s) + gap);
            if let Some(kn) = node_of(k) {
                total_grow += kn.flex_grow.get().max(0.0);
                total_shrink += kn.flex_shrink.get().max(0.0);
            } else {
                total_shrink += 1.0;
            }
        }
        line_base = line_base.saturating_sub(gap);
        let free = main_size as i32 - line_base as i32;

        let grow_total = if free > 0 && total_grow > 0.0 { free } else { 0 };
        let shrink_total = if free < 0 && total_shrink > 0.0 && !scroll_container {
            -free
        } else {
            0
        };

        let mut grown_so_far: i32 = 0;
        let mut shrunk_so_far: i32 = 0;

        for fi in l_start..=l_end {
            let k = flow[fi];
            let base = child_base_main(k, is_row, content_w, content_h, s);
            let mut main = base;

            if let Some(kn) = node_of(k) {
                if grow_total > 0 {
                    let share = kn.flex_grow.get().max(0.0) / total_grow;
                    let mut add = ((share * grow_total as f32).floor()) as i32;
                    if fi == l_end {
                        // Last item absorbs the rounding residue.
                        add = grow_total - grown_so_far;
                    }
                    grown_so_far += add;
                    main = main.saturating_add(add.max(0) as u16);
                } else if shrink_total > 0 {
                    let share = kn.flex_shrink.get().max(0.0) / total_shrink;
                    let mut sub = ((share * shrink_total as f32).floor()) as i32;
                    if fi == l_end {
                        sub = shrink_total - shrunk_so_far;
                    }
                    shrunk_so_far += sub;
                    main = main.saturating_sub(sub.max(0) as u16);
                }

                main = clamp_dimension(
                    main,
                    if is_row { kn.min_width.get() } else { kn.min_height.get() },
                    if is_row { kn.max_width.get() } else { kn.max_height.get() },
                    main_size,
                );

                let ew = resolve_dimension(kn.width.get(), content_w);
                let eh = resolve_dimension(kn.height.get(), content_h);
                let self_align = effective_align(&kn, align_items);
                let explicit_cross = if is_row { eh } else { ew };
                let mut cross = if explicit_cross > 0 {
                    explicit_cross
                } else if self_align == ALIGN_STRETCH {
                    cross_size / line_count.max(1) as u16
                } else if is_row {
                    s.intrinsic_h[k]
                } else {
                    s.intrinsic_w[k]
                };
                cross = clamp_dimension(
                    cross,
                    if is_row { kn.min_height.get() } else { kn.min_width.get() },
                    if is_row { kn.max_height.get() } else { kn.max_width.get() },
                    cross_size,
                );

                s.item_main[k] = main;
                s.item_cross[k] = cross;
            } else {
                s.item_main[k] = main;
                s.item_cross[k] = if is_row { s.intrinsic_h[k] } else { s.intrinsic_w[k] };
            }
        }
    }

    // Step 3: position items line by line.
    let line_height = cross_size / line_count.max(1) as u16;
    let mut cross_offset: u16 = 0;
    let mut children_max_main: u16 = 0;
    let mut children_max_cross: u16 = 0;

    for li in 0..line_count {
        let (l_start, l_end) = line_ranges[li];

        let mut line_main: u16 = 0;
        for fi in l_start..=l_end {
            let k = flow[fi];
            let m = margins_main(k, is_row);
            line_main = line_main.saturating_add(s.item_main[k] + m + gap);
        }
        line_main = line_main.saturating_sub(gap);

        let remaining = main_size.saturating_sub(line_main);
        let item_count = (l_end - l_start + 1) as u16;

        // Step 4 of the algorithm: justify-content offset and per-item gap.
        let (mut main_offset, item_gap) = match justify {
            JustifyContent::Center => (remaining / 2, gap),
            JustifyContent::End => (remaining, gap),
            JustifyContent::SpaceBetween => {
                if item_count > 1 {
                    (0, remaining / (item_count - 1) + gap)
                } else {
                    (0, gap)
                }
            }
            JustifyContent::SpaceAround => {
                let slab = remaining / item_count;
                (slab / 2, slab + gap)
            }
            JustifyContent::SpaceEvenly => {
                let slab = remaining / (item_count + 1);
                (slab, slab + gap)
            }
            JustifyContent::Start => (0, gap),
        };

        for fi in l_start..=l_end {
            let k = flow[fi];
            let (size_main, size_cross) = (s.item_main[k], s.item_cross[k]);
            let (mt, mr, mb, ml) = margins(k);

            // Step 5: align-items / align-self on the cross axis.
            let self_align = node_of(k).map_or(align_items, |kn| effective_align(&kn, align_items));
            let mut cross_pos = cross_offset;
            match self_align {
                ALIGN_CENTER => cross_pos += line_height.saturating_sub(size_cross) / 2,
                ALIGN_END => cross_pos += line_height.saturating_sub(size_cross),
                _ => {} // stretch / start / baseline-as-start
            }

            if is_row {
                if is_reverse {
                    out.x[k] = content_x + content_w.saturating_sub(main_offset + size_main + mr);
                } else {
                    out.x[k] = content_x + main_offset + ml;
                }
                out.y[k] = content_y + cross_pos + mt;
                out.width[k] = size_main;
                out.height[k] = size_cross;
            } else {
                out.x[k] = content_x + cross_pos + ml;
                if is_reverse {
                    out.y[k] = content_y + content_h.saturating_sub(main_offset + size_main + mb);
                } else {
                    out.y[k] = content_y + main_offset + mt;
                }
                out.width[k] = size_cross;
                out.height[k] = size_main;
            }

            // Step 6: text wraps tighter or looser once its real width is known.
            if core::get_component_type(k) == ComponentType::Text {
                let content = text::get_text_content(k);
                if !content.is_empty() {
                    let wrap = text::get_text_wrap(k);
                    out.height[k] = measure_text_height(&content, out.width[k].max(1), wrap).max(1);
                }
            }

            let main_used = if is_row { out.width[k] } else { out.height[k] };
            let cross_used = if is_row { out.height[k] } else { out.width[k] };
            let main_margin = if is_row { ml + mr } else { mt + mb };
            let cross_margin = if is_row { mt + mb } else { ml + mr };
            children_max_main = children_max_main.max(main_offset + main_used + main_margin);
            children_max_cross = children_max_cross.max(cross_pos + cross_used + cross_margin);

            main_offset = main_offset.saturating_add(main_used + main_margin + item_gap);
        }

        cross_offset = cross_offset.saturating_add(line_height);
    }

    // Step 7: scroll ranges from children extents.
    if scrollable {
        let (max_x, max_y) = if is_row {
            (children_max_main, children_max_cross)
        } else {
            (children_max_cross, children_max_main)
        };
        let range_x = max_x.saturating_sub(content_w);
        let range_y = max_y.saturating_sub(content_h);
        if matches!(overflow, Overflow::Scroll) || range_x > 0 || range_y > 0 {
            out.scrollable[parent] = 1;
            out.max_scroll_x[parent] = range_x;
            out.max_scroll_y[parent] = range_y;
        }
    }
}

const ALIGN_STRETCH: u8 = 0;
const ALIGN_CENTER: u8 = 2;
const ALIGN_END: u8 = 3;
const ALIGN_SELF_AUTO: u8 = 0;

/// align-self override (auto inherits the container's align-items).
fn effective_align(node: &LayoutNode, align_items: u8) -> u8 {
    let own = node.align_self.get();
    if own == ALIGN_SELF_AUTO {
        align_items
    } else {
        own - 1
    }
}

fn margins(k: usize) -> (u16, u16, u16, u16) {
    match node_of(k) {
        Some(kn) => (
            kn.margin_top.get(),
            kn.margin_right.get(),
            kn.margin_bottom.get(),
            kn.margin_left.get(),
        ),
        None => (0, 0, 0, 0),
    }
}

fn margins_main(k: usize, is_row: bool) -> u16 {
    let (mt, mr, mb, ml) = margins(k);
    if is_row {
        ml + mr
    } else {
        mt + mb
    }
}

// =============================================================================
// Pass 5: absolute/fixed
// =============================================================================

fn place_absolute(
    i: usize,
    position: Position,
    terminal_width: u16,
    terminal_height: u16,
    s: &Scratch,
    out: &mut ComputedLayout,
) {
    // Containing block: nearest positioned ancestor, or the root ancestor
    // for fixed (and as fallback).
    let container = if position == Position::Fixed {
        root_ancestor(i)
    } else {
        let mut cursor = core::get_parent_index(i);
        let mut found = None;
        while let Some(c) = cursor {
            if let Some(node) = node_of(c) {
                if Position::from(node.position.get()) != Position::Relative {
                    found = Some(c);
                    break;
                }
            }
            cursor = core::get_parent_index(c);
        }
        found.or_else(|| root_ancestor(i))
    };

    let (cx, cy, cw, ch) = match container {
        Some(c) if c < out.width.len() => (out.x[c], out.y[c], out.width[c], out.height[c]),
        _ => (0, 0, terminal_width, terminal_height),
    };

    let Some(node) = node_of(i) else { return };

    let ew = resolve_dimension(node.width.get(), cw);
    let eh = resolve_dimension(node.height.get(), ch);
    let w = clamp_dimension(
        if ew > 0 { ew } else { s.intrinsic_w[i] },
        node.min_width.get(),
        node.max_width.get(),
        cw,
    );
    let h = clamp_dimension(
        if eh > 0 { eh } else { s.intrinsic_h[i] },
        node.min_height.get(),
        node.max_height.get(),
        ch,
    );
    out.width[i] = w;
    out.height[i] = h;

    let inset = |slot: &weft_signals::Slot<i32>| {
        let v = slot.get();
        if v == INSET_UNSET {
            None
        } else {
            Some(v)
        }
    };

    // Left wins over right; top wins over bottom.
    out.x[i] = match (inset(&node.inset_left), inset(&node.inset_right)) {
        (Some(left), _) => (cx as i32 + left).max(0) as u16,
        (None, Some(right)) => (cx as i32 + cw as i32 - right - w as i32).max(0) as u16,
        (None, None) => cx,
    };
    out.y[i] = match (inset(&node.inset_top), inset(&node.inset_bottom)) {
        (Some(top), _) => (cy as i32 + top).max(0) as u16,
        (None, Some(bottom)) => (cy as i32 + ch as i32 - bottom - h as i32).max(0) as u16,
        (None, None) => cy,
    };
}

fn root_ancestor(i: usize) -> Option<usize> {
    let mut current = i;
    while let Some(parent) = core::get_parent_index(current) {
        current = parent;
    }
    if current == i {
        None
    } else {
        Some(current)
    }
}
