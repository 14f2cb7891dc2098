//! Inline renderer: content-height frames in the normal screen buffer.
//!
//! Each frame erases the previously drawn region (height tracked), rewrites
//! every row sequentially without absolute cursor moves, and leaves the
//! cursor on the last row. Scrollback above the region is untouched.

use std::io::{self, Write};

use super::ansi;
use super::buffer::FrameBuffer;
use super::output::{CellWriter, OutputBuffer};

pub struct InlineRenderer {
    sink: Box<dyn Write>,
    output: OutputBuffer,
    writer: CellWriter,
    previous_height: u16,
}

impl InlineRenderer {
    pub fn new() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    pub fn with_sink(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous_height: 0,
        }
    }

    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        ansi::begin_sync(&mut self.output)?;

        if self.previous_height > 0 {
            ansi::cursor_up(&mut self.output, self.previous_height.saturating_sub(1))?;
            ansi::cursor_column_zero(&mut self.output)?;
            ansi::erase_down(&mut self.output)?;
        }

        self.writer.reset();
        for y in 0..buffer.height() {
            for cell in buffer.row(y) {
                self.writer.write_cell_sequential(&mut self.output, cell);
            }
            if y + 1 < buffer.height() {
                self.output.write_char('\n');
            }
        }

        ansi::reset(&mut self.output)?;
        ansi::end_sync(&mut self.output)?;
        self.output.flush_to(&mut self.sink)?;
        self.previous_height = buffer.height();
        Ok(())
    }

    /// Erase the drawn region and forget it.
    pub fn clear(&mut self) -> io::Result<()> {
        if self.previous_height > 0 {
            ansi::cursor_up(&mut self.output, self.previous_height.saturating_sub(1))?;
            ansi::cursor_column_zero(&mut self.output)?;
            ansi::erase_down(&mut self.output)?;
            self.output.flush_to(&mut self.sink)?;
            self.previous_height = 0;
        }
        Ok(())
    }

    pub fn previous_height(&self) -> u16 {
        self.previous_height
    }
}

impl Default for InlineRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, Rgba};
    use std::cell::RefCell;
    use std::rc::Rc;

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

    #[test]
    fn tracks_height_and_erases_previous() {
        let capture = Capture::default();
        let mut renderer = InlineRenderer::with_sink(Box::new(capture.clone()));

        let mut fb = FrameBuffer::new(3, 2);
        fb.set_cell(0, 0, 'a' as u32, Rgba::WHITE, Rgba::TERMINAL_DEFAULT, Attr::NONE, None);
        renderer.render(&fb).unwrap();
        assert_eq!(renderer.previous_height(), 2);

        capture.0.borrow_mut().clear();
        renderer.render(&fb).unwrap();
        let s = String::from_utf8(capture.0.borrow().clone()).unwrap();
        assert!(s.contains("\x1b[1A"), "moves up over the previous frame");
        assert!(s.contains("\x1b[J"), "erases the previous region");
    }

    #[test]
    fn no_absolute_cursor_moves() {
        let capture = Capture::default();
        let mut renderer = InlineRenderer::with_sink(Box::new(capture.clone()));
        renderer.render(&FrameBuffer::new(3, 2)).unwrap();
        let s = String::from_utf8(capture.0.borrow().clone()).unwrap();
        assert!(!s.contains(';'), "inline mode never addresses cells");
    }
}
