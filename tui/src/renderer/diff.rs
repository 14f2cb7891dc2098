//! Diff renderer for fullscreen mode.
//!
//! Keeps the previous frame and writes only cells that differ, wrapped in a
//! synchronized-output block and flushed in one write. `invalidate()` drops
//! the previous frame so the next render repaints everything (first frame,
//! resize, corrupted screen recovery).

use std::io::{self, Write};

use super::ansi;
use super::buffer::FrameBuffer;
use super::output::{CellWriter, OutputBuffer};

pub struct DiffRenderer {
    sink: Box<dyn Write>,
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    /// Render into an arbitrary sink (tests use a byte buffer).
    pub fn with_sink(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `buffer` against the previous frame and emit the changes.
    /// Returns the number of cells written.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<usize> {
        ansi::begin_sync(&mut self.output)?;
        self.writer.reset();

        let same_size = self
            .previous
            .as_ref()
            .is_some_and(|p| p.width() == buffer.width() && p.height() == buffer.height());

        let mut written = 0usize;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let cell = buffer.get(x, y).expect("in-bounds cell");
                let unchanged = same_size
                    && self
                        .previous
                        .as_ref()
                        .and_then(|p| p.get(x, y))
                        .is_some_and(|prev| prev == cell);
                if unchanged {
                    continue;
                }
                written += 1;
                self.writer.write_cell(&mut self.output, x, y, cell);
            }
        }

        ansi::end_sync(&mut self.output)?;
        self.output.flush_to(&mut self.sink)?;
        self.previous = Some(buffer.clone());
        Ok(written)
    }

    /// Forget the previous frame; next render repaints every cell.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Enter the alternate screen, clear, hide the cursor.
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        ansi::enter_alt_screen(&mut self.output)?;
        ansi::cursor_hide(&mut self.output)?;
        ansi::clear_screen(&mut self.output)?;
        self.output.flush_to(&mut self.sink)?;
        self.invalidate();
        Ok(())
    }

    /// Restore attributes and cursor, leave the alternate screen.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        ansi::reset(&mut self.output)?;
        ansi::cursor_show(&mut self.output)?;
        ansi::exit_alt_screen(&mut self.output)?;
        self.output.flush_to(&mut self.sink)
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, Cell, Rgba};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared byte sink to observe renderer output.
    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn renderer_with_capture() -> (DiffRenderer, Capture) {
        let capture = Capture::default();
        let renderer = DiffRenderer::with_sink(Box::new(capture.clone()));
        (renderer, capture)
    }

    #[test]
    fn first_frame_writes_every_cell() {
        let (mut renderer, _capture) = renderer_with_capture();
        let fb = FrameBuffer::new(4, 2);
        let written = renderer.render(&fb).unwrap();
        assert_eq!(written, 8);
        assert!(renderer.has_previous());
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let (mut renderer, capture) = renderer_with_capture();
        let fb = FrameBuffer::new(4, 2);
        renderer.render(&fb).unwrap();
        capture.0.borrow_mut().clear();

        let written = renderer.render(&fb).unwrap();
        assert_eq!(written, 0, "identical frame: zero cells");
        // Only the sync envelope goes out.
        let bytes = capture.0.borrow().clone();
        assert_eq!(bytes, b"\x1b[?2026h\x1b[?2026l");
    }

    #[test]
    fn diff_writes_exactly_changed_cells() {
        let (mut renderer, _capture) = renderer_with_capture();
        let mut fb = FrameBuffer::new(4, 2);
        renderer.render(&fb).unwrap();

        fb.set_cell(2, 1, 'X' as u32, Rgba::WHITE, Rgba::BLACK, Attr::NONE, None);
        let written = renderer.render(&fb).unwrap();
        assert_eq!(written, 1);
    }

    #[test]
    fn invalidate_forces_full_redraw() {
        let (mut renderer, _capture) = renderer_with_capture();
        let fb = FrameBuffer::new(3, 1);
        renderer.render(&fb).unwrap();
        renderer.invalidate();
        assert!(!renderer.has_previous());
        let written = renderer.render(&fb).unwrap();
        assert_eq!(written, 3);
    }

    #[test]
    fn resize_repaints_everything() {
        let (mut renderer, _capture) = renderer_with_capture();
        renderer.render(&FrameBuffer::new(4, 2)).unwrap();
        let written = renderer.render(&FrameBuffer::new(5, 2)).unwrap();
        assert_eq!(written, 10);
    }

    #[test]
    fn fullscreen_envelope() {
        let (mut renderer, capture) = renderer_with_capture();
        renderer.enter_fullscreen().unwrap();
        let entered = String::from_utf8(capture.0.borrow().clone()).unwrap();
        assert!(entered.contains("\x1b[?1049h"));
        assert!(entered.contains("\x1b[?25l"));

        capture.0.borrow_mut().clear();
        renderer.exit_fullscreen().unwrap();
        let exited = String::from_utf8(capture.0.borrow().clone()).unwrap();
        assert!(exited.contains("\x1b[?1049l"));
        assert!(exited.contains("\x1b[?25h"));
    }
}
