//! Output buffering and stateful cell emission.
//!
//! [`OutputBuffer`] accumulates a whole frame and flushes it in one write.
//! [`CellWriter`] tracks the terminal's cursor/color/attr state across a
//! frame and emits only the escape codes that actually change something.

use std::io::{self, Write};

use super::ansi;
use crate::types::{Attr, Cell, Rgba};

// =============================================================================
// OutputBuffer
// =============================================================================

/// Byte buffer flushed to the terminal in a single syscall per frame.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(16 * 1024),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.data.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    #[inline]
    pub fn write_codepoint(&mut self, cp: u32) {
        if let Some(c) = char::from_u32(cp) {
            self.write_char(c);
        }
    }

    /// Flush the buffered frame into `sink` (stdout in production, a capture
    /// buffer in tests), clearing this buffer.
    pub fn flush_to<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        sink.write_all(&self.data)?;
        sink.flush()?;
        self.data.clear();
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// CellWriter
// =============================================================================

/// Emits cells while tracking cursor position, colors and attributes so that
/// unchanged state produces no bytes. Horizontally sequential cells skip the
/// cursor move entirely.
#[derive(Debug)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<Rgba>,
    last_bg: Option<Rgba>,
    last_attrs: Attr,
}

impl CellWriter {
    pub fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::NONE,
        }
    }

    /// Forget all tracked state; call at the start of every frame.
    pub fn reset(&mut self) {
        self.last_x = -1;
        self.last_y = -1;
        self.last_fg = None;
        self.last_bg = None;
        self.last_attrs = Attr::NONE;
    }

    fn emit_style(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if cell.attrs != self.last_attrs {
            // Reset clears colors too; force them to re-emit.
            ansi::reset(out).ok();
            if !cell.attrs.is_empty() {
                ansi::attrs(out, cell.attrs).ok();
            }
            self.last_fg = None;
            self.last_bg = None;
            self.last_attrs = cell.attrs;
        }
        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }
        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }
    }

    /// Positioned write used by the diff renderer.
    pub fn write_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        // Continuation half of a wide glyph: the glyph itself covers it.
        if cell.char == 0 {
            self.last_x = x as i32;
            self.last_y = y as i32;
            return;
        }

        if y as i32 != self.last_y || x as i32 != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }
        self.emit_style(out, cell);
        out.write_codepoint(cell.char);
        self.last_x = x as i32;
        self.last_y = y as i32;
    }

    /// Sequential write used by the inline/append renderers (no cursor
    /// addressing; rows are separated by newlines).
    pub fn write_cell_sequential(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if cell.char == 0 {
            return;
        }
        self.emit_style(out, cell);
        out.write_codepoint(cell.char);
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}
