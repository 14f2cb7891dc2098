//! FrameBuffer: the 2-D cell grid and its drawing primitives.
//!
//! Flat row-major storage. Every drawing call takes an optional [`ClipRect`];
//! writes outside the clip or the buffer are dropped. Translucent backgrounds
//! alpha-blend onto the existing cell; wide glyphs mark their trailing cell
//! with `char == 0`.

use crate::layout::text_measure::char_display_width;
use crate::types::{Attr, BorderStyle, Cell, ClipRect, Rgba};

/// A 2-D grid of terminal cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

/// Per-side border styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSides {
    pub top: BorderStyle,
    pub right: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
}

impl BorderSides {
    pub const fn all(style: BorderStyle) -> Self {
        Self {
            top: style,
            right: style,
            bottom: style,
            left: style,
        }
    }

    pub fn any(&self) -> bool {
        self.top != BorderStyle::None
            || self.right != BorderStyle::None
            || self.bottom != BorderStyle::None
            || self.left != BorderStyle::None
    }
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row `y` as a slice, for renderers that walk line by line.
    pub fn row(&self, y: u16) -> &[Cell] {
        let start = self.index(0, y);
        &self.cells[start..start + self.width as usize]
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Write one cell, honoring bounds and clip. Translucent `bg` blends.
    pub fn set_cell(
        &mut self,
        x: u16,
        y: u16,
        char: u32,
        fg: Rgba,
        bg: Rgba,
        attrs: Attr,
        clip: Option<&ClipRect>,
    ) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        if let Some(clip) = clip {
            if !clip.contains(x, y) {
                return false;
            }
        }

        let idx = self.index(x, y);
        let cell = &mut self.cells[idx];
        let blended_bg = if bg.is_opaque() || bg.is_terminal_default() || bg.is_ansi() {
            bg
        } else {
            Rgba::blend(bg, cell.bg)
        };
        cell.char = char;
        cell.fg = fg;
        cell.bg = blended_bg;
        cell.attrs = attrs;
        true
    }

    /// Fill a rect with `bg`, resetting glyphs to spaces.
    pub fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        bg: Rgba,
        clip: Option<&ClipRect>,
    ) {
        let x2 = x.saturating_add(width).min(self.width);
        let y2 = y.saturating_add(height).min(self.height);
        let (x1, y1, x2, y2) = match clip {
            Some(clip) => (
                x.max(clip.x),
                y.max(clip.y),
                x2.min(clip.x.saturating_add(clip.width)),
                y2.min(clip.y.saturating_add(clip.height)),
            ),
            None => (x, y, x2, y2),
        };
        if x2 <= x1 || y2 <= y1 {
            return;
        }

        let opaque = bg.is_opaque() || bg.is_terminal_default() || bg.is_ansi();
        for row in y1..y2 {
            let start = self.index(x1, row);
            let end = self.index(x2, row);
            for cell in &mut self.cells[start..end] {
                cell.bg = if opaque { bg } else { Rgba::blend(bg, cell.bg) };
                cell.char = b' ' as u32;
                cell.attrs = Attr::NONE;
            }
        }
    }

    pub fn draw_char(
        &mut self,
        x: u16,
        y: u16,
        char: char,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&ClipRect>,
    ) -> bool {
        self.set_cell(
            x,
            y,
            char as u32,
            fg,
            bg.unwrap_or(Rgba::TRANSPARENT),
            attrs,
            clip,
        )
    }

    /// Draw a string; wide glyphs get a continuation marker in the trailing
    /// cell. Returns cells advanced.
    pub fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&ClipRect>,
    ) -> u16 {
        let bg = bg.unwrap_or(Rgba::TRANSPARENT);
        let mut col = x;

        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let cw = char_display_width(ch);
            if cw == 0 {
                continue;
            }
            if self.set_cell(col, y, ch as u32, fg, bg, attrs, clip) && cw == 2 {
                let next = col + 1;
                if self.in_bounds(next, y) && clip.map_or(true, |c| c.contains(next, y)) {
                    let idx = self.index(next, y);
                    let cell = &mut self.cells[idx];
                    cell.char = 0;
                    cell.fg = fg;
                    if !bg.is_transparent() {
                        cell.bg = Rgba::blend(bg, cell.bg);
                    }
                    cell.attrs = attrs;
                }
            }
            col += cw;
        }
        col.saturating_sub(x)
    }

    /// Border with one style/color on all sides.
    pub fn draw_border(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        style: BorderStyle,
        color: Rgba,
        clip: Option<&ClipRect>,
    ) {
        self.draw_border_sides(x, y, width, height, BorderSides::all(style), color, clip);
    }

    /// Border honoring per-side style overrides. Corners take the style of
    /// the touching top/bottom side, falling back to the vertical side.
    pub fn draw_border_sides(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        sides: BorderSides,
        color: Rgba,
        clip: Option<&ClipRect>,
    ) {
        if width < 2 || height < 2 || !sides.any() {
            return;
        }
        let x2 = x + width - 1;
        let y2 = y + height - 1;

        if sides.top != BorderStyle::None {
            let (h, ..) = sides.top.chars();
            for col in (x + 1)..x2 {
                self.draw_char(col, y, h, color, None, Attr::NONE, clip);
            }
        }
        if sides.bottom != BorderStyle::None {
            let (h, ..) = sides.bottom.chars();
            for col in (x + 1)..x2 {
                self.draw_char(col, y2, h, color, None, Attr::NONE, clip);
            }
        }
        if sides.left != BorderStyle::None {
            let (_, v, ..) = sides.left.chars();
            for row in (y + 1)..y2 {
                self.draw_char(x, row, v, color, None, Attr::NONE, clip);
            }
        }
        if sides.right != BorderStyle::None {
            let (_, v, ..) = sides.right.chars();
            for row in (y + 1)..y2 {
                self.draw_char(x2, row, v, color, None, Attr::NONE, clip);
            }
        }

        let corner_for = |a: BorderStyle, b: BorderStyle| {
            if a != BorderStyle::None {
                a
            } else {
                b
            }
        };
        if sides.top != BorderStyle::None || sides.left != BorderStyle::None {
            let (.., tl, _, _, _) = corner_for(sides.top, sides.left).chars();
            self.draw_char(x, y, tl, color, None, Attr::NONE, clip);
        }
        if sides.top != BorderStyle::None || sides.right != BorderStyle::None {
            let (.., tr, _, _) = corner_for(sides.top, sides.right).chars();
            self.draw_char(x2, y, tr, color, None, Attr::NONE, clip);
        }
        if sides.bottom != BorderStyle::None || sides.right != BorderStyle::None {
            let (.., br, _) = corner_for(sides.bottom, sides.right).chars();
            self.draw_char(x2, y2, br, color, None, Attr::NONE, clip);
        }
        if sides.bottom != BorderStyle::None || sides.left != BorderStyle::None {
            let (.., bl) = corner_for(sides.bottom, sides.left).chars();
            self.draw_char(x, y2, bl, color, None, Attr::NONE, clip);
        }
    }

    /// Progress bar: `⌊p·w⌋` filled cells, remainder in the empty glyph.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_progress(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        progress: f32,
        filled_fg: Rgba,
        empty_fg: Rgba,
        clip: Option<&ClipRect>,
    ) {
        let progress = progress.clamp(0.0, 1.0);
        let filled = (progress * width as f32).floor() as u16;
        for col in 0..width {
            let (glyph, fg) = if col < filled {
                ('█', filled_fg)
            } else {
                ('░', empty_fg)
            };
            self.draw_char(x + col, y, glyph, fg, None, Attr::NONE, clip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_respects_bounds() {
        let mut fb = FrameBuffer::new(20, 20);
        fb.fill_rect(5, 5, 10, 10, Rgba::BLUE, None);
        assert_eq!(fb.get(5, 5).unwrap().bg, Rgba::BLUE);
        assert_eq!(fb.get(14, 14).unwrap().bg, Rgba::BLUE);
        assert_eq!(fb.get(4, 5).unwrap().bg, Rgba::TERMINAL_DEFAULT);
        assert_eq!(fb.get(15, 5).unwrap().bg, Rgba::TERMINAL_DEFAULT);
    }

    #[test]
    fn fill_blends_translucent() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.fill_rect(0, 0, 4, 1, Rgba::rgb(0, 0, 100), None);
        fb.fill_rect(0, 0, 4, 1, Rgba::new(200, 0, 0, 128), None);
        let out = fb.get(0, 0).unwrap().bg;
        assert!(out.r > 50 && out.b > 0, "translucent red over blue mixes");
    }

    #[test]
    fn clip_drops_writes() {
        let mut fb = FrameBuffer::new(10, 10);
        let clip = ClipRect::new(2, 2, 3, 3);
        assert!(!fb.draw_char(0, 0, 'x', Rgba::WHITE, None, Attr::NONE, Some(&clip)));
        assert!(fb.draw_char(3, 3, 'x', Rgba::WHITE, None, Attr::NONE, Some(&clip)));
    }

    #[test]
    fn text_and_wide_glyphs() {
        let mut fb = FrameBuffer::new(10, 1);
        let advanced = fb.draw_text(0, 0, "a中b", Rgba::WHITE, None, Attr::NONE, None);
        assert_eq!(advanced, 4);
        assert_eq!(fb.get(0, 0).unwrap().char, 'a' as u32);
        assert_eq!(fb.get(1, 0).unwrap().char, '中' as u32);
        assert_eq!(fb.get(2, 0).unwrap().char, 0, "continuation marker");
        assert_eq!(fb.get(3, 0).unwrap().char, 'b' as u32);
    }

    #[test]
    fn border_corners() {
        let mut fb = FrameBuffer::new(10, 3);
        fb.draw_border(0, 0, 10, 3, BorderStyle::Single, Rgba::WHITE, None);
        assert_eq!(fb.get(0, 0).unwrap().char, '┌' as u32);
        assert_eq!(fb.get(9, 0).unwrap().char, '┐' as u32);
        assert_eq!(fb.get(0, 2).unwrap().char, '└' as u32);
        assert_eq!(fb.get(9, 2).unwrap().char, '┘' as u32);
        assert_eq!(fb.get(4, 0).unwrap().char, '─' as u32);
        assert_eq!(fb.get(0, 1).unwrap().char, '│' as u32);
    }

    #[test]
    fn border_too_small_is_noop() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_border(0, 0, 1, 1, BorderStyle::Single, Rgba::WHITE, None);
        assert_eq!(fb.get(0, 0).unwrap().char, b' ' as u32);
    }

    #[test]
    fn per_side_borders() {
        let mut fb = FrameBuffer::new(6, 3);
        let sides = BorderSides {
            top: BorderStyle::Double,
            right: BorderStyle::None,
            bottom: BorderStyle::None,
            left: BorderStyle::Single,
        };
        fb.draw_border_sides(0, 0, 6, 3, sides, Rgba::WHITE, None);
        assert_eq!(fb.get(2, 0).unwrap().char, '═' as u32);
        assert_eq!(fb.get(0, 1).unwrap().char, '│' as u32);
        // Right column untouched.
        assert_eq!(fb.get(5, 1).unwrap().char, b' ' as u32);
    }

    #[test]
    fn progress_fill() {
        let mut fb = FrameBuffer::new(10, 1);
        fb.draw_progress(0, 0, 10, 0.5, Rgba::WHITE, Rgba::GRAY, None);
        assert_eq!(fb.get(4, 0).unwrap().char, '█' as u32);
        assert_eq!(fb.get(5, 0).unwrap().char, '░' as u32);
    }
}
