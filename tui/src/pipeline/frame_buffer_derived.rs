//! The frame-buffer derived: paints the component tree into a cell grid.
//!
//! Pure function of its inputs: layout, terminal size/mode, the visual, text
//! and interaction arrays, and the live set. Hit regions are returned as
//! data; the render effect applies them to the hit grid, so this derived has
//! no side effects of its own.

use std::collections::HashMap;

use weft_signals::{derived, Derived};

use super::inheritance::{
    apply_opacity, effective_opacity, inherited_bg, inherited_border_color, inherited_fg,
};
use super::terminal::{
    render_mode_signal, terminal_height_signal, terminal_width_signal, RenderMode,
};
use crate::engine::arrays::{core, interaction, text, visual};
use crate::engine::{get_allocated_indices, get_layout_node};
use crate::layout::text_measure::{display_width, truncate_text, wrap_text};
use crate::layout::ComputedLayout;
use crate::renderer::buffer::BorderSides;
use crate::renderer::FrameBuffer;
use crate::state::focus;
use crate::types::{Attr, ClipRect, ComponentType, Overflow, Rgba, TextAlign, TextWrap};

// =============================================================================
// Result types
// =============================================================================

/// One rectangle of the hit map; later regions overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRegion {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub component_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBufferResult {
    pub buffer: FrameBuffer,
    pub hit_regions: Vec<HitRegion>,
    pub terminal_size: (u16, u16),
}

// =============================================================================
// Derived factory
// =============================================================================

pub fn create_frame_buffer_derived<F>(
    layout_derived: Derived<ComputedLayout, F>,
) -> Derived<FrameBufferResult, impl Fn() -> FrameBufferResult>
where
    F: Fn() -> ComputedLayout + 'static,
{
    let width = terminal_width_signal();
    let height = terminal_height_signal();
    let mode = render_mode_signal();

    derived(move || {
        let tw = width.get();
        let th = height.get();
        let mode = mode.get();
        let layout = layout_derived.get();

        let buffer_height = match mode {
            RenderMode::Fullscreen => th,
            RenderMode::Inline | RenderMode::Append => layout.content_height.max(1),
        };

        let mut buffer = FrameBuffer::new(tw, buffer_height);
        let mut hit_regions = Vec::new();

        let mut indices = get_allocated_indices();
        if !indices.is_empty() {
            indices.sort_unstable();

            // Parent → children map of visible components, z-ordered (stable).
            let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
            let mut roots: Vec<usize> = Vec::new();
            for &index in &indices {
                if !core::get_visible(index) {
                    continue;
                }
                match core::get_parent_index(index) {
                    Some(parent) => children.entry(parent).or_default().push(index),
                    None => roots.push(index),
                }
            }
            roots.sort_by_key(|&i| visual::get_z_index(i));
            for list in children.values_mut() {
                list.sort_by_key(|&i| visual::get_z_index(i));
            }

            let walker = Walker {
                layout: &layout,
                children: &children,
            };
            for &root in &roots {
                walker.paint(&mut buffer, &mut hit_regions, root, None, 0, 0);
            }
        }

        FrameBufferResult {
            buffer,
            hit_regions,
            terminal_size: (tw, th),
        }
    })
}

/// Paint only `roots` (and their subtrees) into a fresh content-height
/// buffer. Used by `render_to_history` to produce a scrollback sub-frame
/// without disturbing the reactive pipeline.
pub(crate) fn paint_subtree(layout: &ComputedLayout, roots: &[usize], width: u16) -> FrameBuffer {
    let mut height = 1u16;
    for &root in roots {
        let (_, y, _, h) = layout.rect(root);
        height = height.max(y + h);
    }
    let mut buffer = FrameBuffer::new(width, height);
    let mut hit_regions = Vec::new();

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for index in get_allocated_indices() {
        if !core::get_visible(index) {
            continue;
        }
        if let Some(parent) = core::get_parent_index(index) {
            children.entry(parent).or_default().push(index);
        }
    }
    for list in children.values_mut() {
        list.sort_by_key(|&i| visual::get_z_index(i));
    }

    let walker = Walker {
        layout,
        children: &children,
    };
    for &root in roots {
        walker.paint(&mut buffer, &mut hit_regions, root, None, 0, 0);
    }
    buffer
}

// =============================================================================
// Tree walk
// =============================================================================

struct Walker<'a> {
    layout: &'a ComputedLayout,
    children: &'a HashMap<usize, Vec<usize>>,
}

impl Walker<'_> {
    fn paint(
        &self,
        fb: &mut FrameBuffer,
        hits: &mut Vec<HitRegion>,
        index: usize,
        parent_clip: Option<&ClipRect>,
        scroll_x: i32,
        scroll_y: i32,
    ) {
        let (x, y, w, h) = self.layout.rect(index);
        if w == 0 || h == 0 {
            return;
        }

        // Screen position: layout coordinates minus accumulated scroll.
        let sx = x as i32 - scroll_x;
        let sy = y as i32 - scroll_y;

        // Visible part of this component's rect on screen.
        let Some(bounds) = clip_i32(sx, sy, w, h, fb) else {
            return;
        };
        let clip = match parent_clip {
            Some(parent) => match bounds.intersect(parent) {
                Some(clip) => clip,
                None => return, // fully clipped by ancestors
            },
            None => bounds,
        };

        let opacity = effective_opacity(index);
        let fg = apply_opacity(inherited_fg(index), opacity);
        let bg = apply_opacity(inherited_bg(index), opacity);

        if bg.a > 0 && !bg.is_terminal_default() {
            fb.fill_rect(clip.x, clip.y, clip.width, clip.height, bg, Some(&clip));
        }

        hits.push(HitRegion {
            x: clip.x,
            y: clip.y,
            width: clip.width,
            height: clip.height,
            component_index: index,
        });

        // Borders.
        let node = get_layout_node(index);
        let (bt, br, bb, bl) = node.as_ref().map_or((0, 0, 0, 0), |n| n.border_widths());
        let has_border = bt + br + bb + bl > 0;
        if has_border && w >= 2 && h >= 2 && sx >= 0 && sy >= 0 {
            let (top, right, bottom, left) = visual::get_border_sides(index);
            let sides = BorderSides {
                top,
                right,
                bottom,
                left,
            };
            let color = apply_opacity(inherited_border_color(index), opacity);
            fb.draw_border_sides(sx as u16, sy as u16, w, h, sides, color, Some(&clip));
        }

        // Content box.
        let (pt, pr, pb, pl) = node.as_ref().map_or((0, 0, 0, 0), |n| {
            (
                n.padding_top.get() + bt,
                n.padding_right.get() + br,
                n.padding_bottom.get() + bb,
                n.padding_left.get() + bl,
            )
        });
        let content_x = sx + pl as i32;
        let content_y = sy + pt as i32;
        let content_w = w.saturating_sub(pl + pr);
        let content_h = h.saturating_sub(pt + pb);

        let content_clip = clip_i32(content_x, content_y, content_w, content_h, fb)
            .and_then(|rect| rect.intersect(&clip));

        if let Some(content_clip) = &content_clip {
            match core::get_component_type(index) {
                ComponentType::Text => {
                    self.paint_text(fb, index, content_x, content_y, content_w, content_h, fg, content_clip)
                }
                ComponentType::Input => {
                    self.paint_input(fb, index, content_x, content_y, content_w, fg, bg, content_clip)
                }
                ComponentType::Progress => {
                    self.paint_progress(fb, index, content_x, content_y, content_w, content_h, fg, content_clip)
                }
                ComponentType::Select => {
                    self.paint_select(fb, index, content_x, content_y, content_w, fg, content_clip)
                }
                ComponentType::Box | ComponentType::None => {}
            }
        }

        // Children (boxes only carry children, but the walk is generic).
        if let Some(kids) = self.children.get(&index) {
            let child_clip = content_clip.unwrap_or(clip);
            let scrollable = self.layout.scrollable.get(index).copied().unwrap_or(0) == 1;
            let (child_scroll_x, child_scroll_y) = if scrollable {
                (
                    scroll_x + interaction::get_scroll_offset_x(index) as i32,
                    scroll_y + interaction::get_scroll_offset_y(index) as i32,
                )
            } else {
                (scroll_x, scroll_y)
            };
            for &kid in kids {
                self.paint(fb, hits, kid, Some(&child_clip), child_scroll_x, child_scroll_y);
            }
        }

        // Scrollbar column overlays the right content edge.
        if self.layout.scrollable.get(index).copied().unwrap_or(0) == 1 {
            self.paint_scrollbar(fb, index, sx, sy, w, h, br, bt, bb, fg, &clip);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_text(
        &self,
        fb: &mut FrameBuffer,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        fg: Rgba,
        clip: &ClipRect,
    ) {
        let content = text::get_text_content(index);
        if content.is_empty() || w == 0 {
            return;
        }
        let attrs = text::get_text_attrs(index);
        let align = text::get_text_align(index);
        let wrap = text::get_text_wrap(index);

        let lines: Vec<String> = match wrap {
            TextWrap::Wrap => wrap_text(&content, w),
            TextWrap::NoWrap => content.lines().map(str::to_string).collect(),
            TextWrap::Truncate => content.lines().map(|l| truncate_text(l, w)).collect(),
        };

        for (row, line) in lines.iter().enumerate() {
            if row as u16 >= h {
                break;
            }
            let line_y = y + row as i32;
            let line_w = display_width(line);
            let line_x = match align {
                TextAlign::Left => x,
                TextAlign::Center => x + (w.saturating_sub(line_w) / 2) as i32,
                TextAlign::Right => x + w.saturating_sub(line_w) as i32,
            };
            blit_text(fb, line_x, line_y, line, fg, None, attrs, clip);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_input(
        &self,
        fb: &mut FrameBuffer,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        fg: Rgba,
        bg: Rgba,
        clip: &ClipRect,
    ) {
        let content = text::get_text_content(index);
        let attrs = text::get_text_attrs(index);
        if w == 0 {
            return;
        }

        // Horizontal scroll keeps the cursor inside the field.
        let cursor = interaction::get_cursor_position(index) as usize;
        let cursor_col = display_width(&content.chars().take(cursor).collect::<String>());
        let scroll = cursor_col.saturating_sub(w.saturating_sub(1));

        blit_text(fb, x - scroll as i32, y, &content, fg, None, attrs, clip);

        let focused = focus::is_focused(index);
        if focused {
            let visible_phase = interaction::get_cursor_visible(index);
            let cursor_x = x + (cursor_col - scroll) as i32;
            if visible_phase {
                // Inverse block by default, custom glyph when configured.
                let glyph = interaction::get_cursor_char(index);
                let under = content.chars().nth(cursor).unwrap_or(' ');
                match glyph {
                    Some(g) => {
                        blit_char(fb, cursor_x, y, g, fg, Some(bg), attrs, clip);
                    }
                    None => {
                        blit_char(fb, cursor_x, y, under, fg, Some(bg), attrs | Attr::INVERSE, clip);
                    }
                }
            } else if let Some(alt) = interaction::get_cursor_alt_char(index) {
                blit_char(fb, cursor_x, y, alt, fg, Some(bg), attrs, clip);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_progress(
        &self,
        fb: &mut FrameBuffer,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        fg: Rgba,
        clip: &ClipRect,
    ) {
        // Content carries the ratio as text; unparsable values read as 0.
        let ratio: f32 = text::get_text_content(index).trim().parse().unwrap_or(0.0);
        let bar_y = y + (h / 2) as i32;
        if bar_y < 0 || x < 0 {
            return;
        }
        fb.draw_progress(
            x as u16,
            bar_y as u16,
            w,
            ratio.clamp(0.0, 1.0),
            fg,
            fg.dim(0.4),
            Some(clip),
        );
    }

    fn paint_select(
        &self,
        fb: &mut FrameBuffer,
        index: usize,
        x: i32,
        y: i32,
        w: u16,
        fg: Rgba,
        clip: &ClipRect,
    ) {
        let content = text::get_text_content(index);
        let attrs = text::get_text_attrs(index);
        let indicator_w = 2u16;
        let text_w = w.saturating_sub(indicator_w);

        let shown = if display_width(&content) > text_w {
            truncate_text(&content, text_w)
        } else {
            content
        };
        blit_text(fb, x, y, &shown, fg, None, attrs, clip);
        blit_text(fb, x + text_w as i32, y, " ▼", fg, None, Attr::NONE, clip);
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_scrollbar(
        &self,
        fb: &mut FrameBuffer,
        index: usize,
        sx: i32,
        sy: i32,
        w: u16,
        h: u16,
        border_right: u16,
        border_top: u16,
        border_bottom: u16,
        fg: Rgba,
        clip: &ClipRect,
    ) {
        let max_scroll = self.layout.max_scroll_y.get(index).copied().unwrap_or(0);
        if max_scroll == 0 {
            return;
        }
        let track_h = h.saturating_sub(border_top + border_bottom);
        if track_h == 0 {
            return;
        }
        let bar_x = sx + (w.saturating_sub(1 + border_right)) as i32;
        let bar_y = sy + border_top as i32;
        let scroll = interaction::get_scroll_offset_y(index);
        let overflow = get_layout_node(index)
            .map(|n| Overflow::from(n.overflow.get()))
            .unwrap_or(Overflow::Visible);
        let color = fg.dim(0.5);

        match overflow {
            Overflow::Scroll => {
                // Track plus proportional thumb.
                let total = max_scroll + track_h;
                let thumb_h = ((track_h as f32 / total as f32) * track_h as f32).max(1.0) as u16;
                let thumb_at =
                    ((scroll as f32 / max_scroll as f32) * (track_h - thumb_h) as f32) as u16;
                for row in 0..track_h {
                    let glyph = if row >= thumb_at && row < thumb_at + thumb_h {
                        '█'
                    } else {
                        '░'
                    };
                    blit_char(fb, bar_x, bar_y + row as i32, glyph, color, None, Attr::NONE, clip);
                }
            }
            Overflow::Auto => {
                // Minimal position indicator.
                let at = ((scroll as f32 / max_scroll as f32) * (track_h - 1) as f32) as u16;
                blit_char(fb, bar_x, bar_y + at as i32, '▐', color, None, Attr::NONE, clip);
            }
            _ => {}
        }
    }
}

// =============================================================================
// i32-space drawing helpers (content scrolled above/left of the screen)
// =============================================================================

fn clip_i32(x: i32, y: i32, w: u16, h: u16, fb: &FrameBuffer) -> Option<ClipRect> {
    let x2 = x + w as i32;
    let y2 = y + h as i32;
    let cx = x.max(0);
    let cy = y.max(0);
    let cx2 = x2.min(fb.width() as i32);
    let cy2 = y2.min(fb.height() as i32);
    if cx2 > cx && cy2 > cy {
        Some(ClipRect::new(
            cx as u16,
            cy as u16,
            (cx2 - cx) as u16,
            (cy2 - cy) as u16,
        ))
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn blit_text(
    fb: &mut FrameBuffer,
    x: i32,
    y: i32,
    text: &str,
    fg: Rgba,
    bg: Option<Rgba>,
    attrs: Attr,
    clip: &ClipRect,
) {
    if y < 0 {
        return;
    }
    let mut col = x;
    let mut utf8 = [0u8; 4];
    for ch in text.chars() {
        let cw = crate::layout::text_measure::char_display_width(ch) as i32;
        if cw == 0 {
            continue;
        }
        if col >= 0 {
            fb.draw_text(col as u16, y as u16, ch.encode_utf8(&mut utf8), fg, bg, attrs, Some(clip));
        }
        col += cw;
        if col >= fb.width() as i32 {
            break;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn blit_char(
    fb: &mut FrameBuffer,
    x: i32,
    y: i32,
    ch: char,
    fg: Rgba,
    bg: Option<Rgba>,
    attrs: Attr,
    clip: &ClipRect,
) {
    if x >= 0 && y >= 0 {
        fb.draw_char(x as u16, y as u16, ch, fg, bg, attrs, Some(clip));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::core as core_arrays;
    use crate::engine::{allocate_index, create_layout_node, reset_registry};
    use crate::pipeline::layout_derived::create_layout_derived;
    use crate::pipeline::terminal::{set_render_mode, set_terminal_size};
    use crate::types::{BorderStyle, Dimension};

    fn setup() {
        reset_registry();
        set_terminal_size(80, 24);
        set_render_mode(RenderMode::Fullscreen);
    }

    fn pipeline() -> Derived<FrameBufferResult, impl Fn() -> FrameBufferResult> {
        create_frame_buffer_derived(create_layout_derived())
    }

    #[test]
    fn empty_tree_paints_empty_buffer() {
        setup();
        let fb = pipeline();
        let result = fb.get();
        assert_eq!(result.buffer.width(), 80);
        assert_eq!(result.buffer.height(), 24);
        assert!(result.hit_regions.is_empty());
    }

    #[test]
    fn box_paints_background_and_hit_region() {
        setup();
        let index = allocate_index(None);
        core_arrays::set_component_type(index, ComponentType::Box);
        let node = create_layout_node(index);
        node.width.set_value(Dimension::Cells(20));
        node.height.set_value(Dimension::Cells(5));
        visual::set_bg_color(index, Rgba::BLUE);

        let result = pipeline().get();
        assert_eq!(result.hit_regions.len(), 1);
        let hit = &result.hit_regions[0];
        assert_eq!((hit.x, hit.y, hit.width, hit.height), (0, 0, 20, 5));
        assert_eq!(hit.component_index, index);
        assert_eq!(result.buffer.get(5, 2).unwrap().bg, Rgba::BLUE);
        assert_eq!(result.buffer.get(25, 2).unwrap().bg, Rgba::TERMINAL_DEFAULT);
    }

    #[test]
    fn text_paints_glyphs_with_inherited_fg() {
        setup();
        let parent = allocate_index(None);
        core_arrays::set_component_type(parent, ComponentType::Box);
        let node = create_layout_node(parent);
        node.width.set_value(Dimension::Cells(20));
        node.height.set_value(Dimension::Cells(3));
        visual::set_fg_color(parent, Rgba::GREEN);

        let child = allocate_index(None);
        core_arrays::set_component_type(child, ComponentType::Text);
        core_arrays::set_parent_index(child, Some(parent));
        create_layout_node(child);
        text::set_text_content(child, "Hi".to_string());

        let result = pipeline().get();
        let cell = result.buffer.get(0, 0).unwrap();
        assert_eq!(cell.char, 'H' as u32);
        assert_eq!(cell.fg, Rgba::GREEN);
    }

    #[test]
    fn bordered_box_draws_corner() {
        setup();
        let index = allocate_index(None);
        core_arrays::set_component_type(index, ComponentType::Box);
        let node = create_layout_node(index);
        node.width.set_value(Dimension::Cells(10));
        node.height.set_value(Dimension::Cells(3));
        node.border_top.set_value(1);
        node.border_right.set_value(1);
        node.border_bottom.set_value(1);
        node.border_left.set_value(1);
        visual::set_border_style(index, BorderStyle::Single);

        let result = pipeline().get();
        assert_eq!(result.buffer.get(0, 0).unwrap().char, '┌' as u32);
        assert_eq!(result.buffer.get(9, 2).unwrap().char, '┘' as u32);
    }

    #[test]
    fn purity_identical_inputs_identical_results() {
        setup();
        let index = allocate_index(None);
        core_arrays::set_component_type(index, ComponentType::Box);
        let node = create_layout_node(index);
        node.width.set_value(Dimension::Cells(8));
        node.height.set_value(Dimension::Cells(2));
        visual::set_bg_color(index, Rgba::RED);

        let fb = pipeline();
        let a = fb.get();
        let b = fb.get();
        assert_eq!(a, b);
    }

    #[test]
    fn progress_fills_proportionally() {
        setup();
        let index = allocate_index(None);
        core_arrays::set_component_type(index, ComponentType::Progress);
        let node = create_layout_node(index);
        node.width.set_value(Dimension::Cells(10));
        node.height.set_value(Dimension::Cells(1));
        text::set_text_content(index, "0.5".to_string());

        let result = pipeline().get();
        assert_eq!(result.buffer.get(0, 0).unwrap().char, '█' as u32);
        assert_eq!(result.buffer.get(4, 0).unwrap().char, '█' as u32);
        assert_eq!(result.buffer.get(5, 0).unwrap().char, '░' as u32);
    }

    #[test]
    fn select_shows_indicator() {
        setup();
        let index = allocate_index(None);
        core_arrays::set_component_type(index, ComponentType::Select);
        let node = create_layout_node(index);
        node.width.set_value(Dimension::Cells(10));
        node.height.set_value(Dimension::Cells(1));
        text::set_text_content(index, "option".to_string());

        let result = pipeline().get();
        assert_eq!(result.buffer.get(9, 0).unwrap().char, '▼' as u32);
        assert_eq!(result.buffer.get(0, 0).unwrap().char, 'o' as u32);
    }

    #[test]
    fn scrolled_children_shift_up() {
        setup();
        let root = allocate_index(None);
        core_arrays::set_component_type(root, ComponentType::Box);
        let node = create_layout_node(root);
        node.width.set_value(Dimension::Cells(10));
        node.height.set_value(Dimension::Cells(3));
        node.overflow.set_value(2); // scroll

        let mut kids = Vec::new();
        for i in 0..6 {
            let kid = allocate_index(None);
            core_arrays::set_component_type(kid, ComponentType::Text);
            core_arrays::set_parent_index(kid, Some(root));
            create_layout_node(kid);
            text::set_text_content(kid, format!("row{}", i));
            kids.push(kid);
        }

        let fb = pipeline();
        let before = fb.get();
        assert_eq!(before.buffer.get(0, 0).unwrap().char, 'r' as u32);
        assert_eq!(before.buffer.get(3, 0).unwrap().char, '0' as u32);

        interaction::set_scroll_offset_y(root, 2);
        let after = fb.get();
        assert_eq!(after.buffer.get(3, 0).unwrap().char, '2' as u32, "row2 now on top");
    }

    #[test]
    fn inline_mode_sizes_buffer_to_content() {
        setup();
        set_render_mode(RenderMode::Inline);
        let index = allocate_index(None);
        core_arrays::set_component_type(index, ComponentType::Box);
        let node = create_layout_node(index);
        node.width.set_value(Dimension::Cells(10));
        node.height.set_value(Dimension::Cells(3));

        let result = pipeline().get();
        assert_eq!(result.buffer.height(), 3);
        assert_eq!(result.terminal_size, (80, 24));
        set_render_mode(RenderMode::Fullscreen);
    }
}
