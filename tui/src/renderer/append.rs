//! Append renderer: two-region output for CLI-style applications.
//!
//! The frame is split at `static_height`:
//!
//! - rows `[0, static_height)` are committed to the terminal's normal flow
//!   exactly once and become scrollback, never rewritten;
//! - rows `[static_height, height)` are the reactive region, erased and
//!   repainted every frame.
//!
//! `committed_lines` only advances. When `static_height` shrinks the
//! committed content stays in scrollback; the reactive region simply starts
//! at the committed mark.

use std::io::{self, Write};

use super::ansi;
use super::buffer::FrameBuffer;
use super::output::{CellWriter, OutputBuffer};

pub struct AppendRenderer {
    sink: Box<dyn Write>,
    output: OutputBuffer,
    writer: CellWriter,
    committed_lines: u16,
    previous_active_height: u16,
}

impl AppendRenderer {
    pub fn new() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    pub fn with_sink(sink: Box<dyn Write>) -> Self {
        Self {
            sink,
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            committed_lines: 0,
            previous_active_height: 0,
        }
    }

    /// Static lines committed to scrollback so far. Monotone.
    pub fn committed_lines(&self) -> u16 {
        self.committed_lines
    }

    /// Render a frame split at `static_height`.
    pub fn render(&mut self, buffer: &FrameBuffer, static_height: u16) -> io::Result<()> {
        ansi::begin_sync(&mut self.output)?;
        self.erase_active_region()?;
        self.writer.reset();

        // Commit newly revealed static rows once; a shrinking static_height
        // never retracts what is already in scrollback.
        let commit_to = static_height.min(buffer.height()).max(self.committed_lines);
        for y in self.committed_lines..commit_to {
            self.write_row(buffer, y);
            self.output.write_char('\n');
        }
        self.committed_lines = commit_to;

        // Reactive region below the committed mark.
        let mut active_rows = 0u16;
        for y in self.committed_lines..buffer.height() {
            self.write_row(buffer, y);
            self.output.write_char('\n');
            active_rows += 1;
        }
        self.previous_active_height = active_rows;

        ansi::reset(&mut self.output)?;
        ansi::end_sync(&mut self.output)?;
        self.output.flush_to(&mut self.sink)
    }

    /// Synchronously append a fully rendered sub-frame to scrollback, above
    /// the reactive region. Used by `render_to_history`.
    pub fn append_history_frame(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        ansi::begin_sync(&mut self.output)?;
        self.erase_active_region()?;
        self.writer.reset();
        for y in 0..buffer.height() {
            self.write_row(buffer, y);
            self.output.write_char('\n');
        }
        self.previous_active_height = 0;
        ansi::reset(&mut self.output)?;
        ansi::end_sync(&mut self.output)?;
        self.output.flush_to(&mut self.sink)
    }

    /// Erase the reactive region without painting a new one.
    pub fn erase_active(&mut self) -> io::Result<()> {
        if self.previous_active_height > 0 {
            ansi::begin_sync(&mut self.output)?;
            self.erase_active_region()?;
            ansi::end_sync(&mut self.output)?;
            self.output.flush_to(&mut self.sink)?;
        }
        Ok(())
    }

    fn erase_active_region(&mut self) -> io::Result<()> {
        if self.previous_active_height > 0 {
            ansi::cursor_up(&mut self.output, self.previous_active_height)?;
            ansi::cursor_column_zero(&mut self.output)?;
            ansi::erase_down(&mut self.output)?;
            self.previous_active_height = 0;
        }
        Ok(())
    }

    fn write_row(&mut self, buffer: &FrameBuffer, y: u16) {
        for cell in buffer.row(y) {
            self.writer.write_cell_sequential(&mut self.output, cell);
        }
    }
}

impl Default for AppendRenderer {
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

    fn frame(rows: &[&str], width: u16) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, rows.len() as u16);
        for (y, row) in rows.iter().enumerate() {
            fb.draw_text(
                0,
                y as u16,
                row,
                Rgba::TERMINAL_DEFAULT,
                None,
                Attr::NONE,
                None,
            );
        }
        fb
    }

    #[test]
    fn committed_lines_are_monotone() {
        let capture = Capture::default();
        let mut renderer = AppendRenderer::with_sink(Box::new(capture.clone()));

        let fb = frame(&["one", "two", "act"], 3);
        renderer.render(&fb, 2).unwrap();
        assert_eq!(renderer.committed_lines(), 2);

        // Shrinking static_height never retracts.
        renderer.render(&fb, 1).unwrap();
        assert_eq!(renderer.committed_lines(), 2);

        renderer.render(&fb, 3).unwrap();
        assert_eq!(renderer.committed_lines(), 3);
    }

    #[test]
    fn static_rows_written_once() {
        let capture = Capture::default();
        let mut renderer = AppendRenderer::with_sink(Box::new(capture.clone()));

        let fb = frame(&["one", "act"], 3);
        renderer.render(&fb, 1).unwrap();
        renderer.render(&fb, 1).unwrap();
        renderer.render(&fb, 1).unwrap();

        let s = String::from_utf8(capture.0.borrow().clone()).unwrap();
        assert_eq!(s.matches("one").count(), 1, "static row committed once");
        assert_eq!(s.matches("act").count(), 3, "active row repainted each frame");
    }

    #[test]
    fn history_frame_goes_above_active() {
        let capture = Capture::default();
        let mut renderer = AppendRenderer::with_sink(Box::new(capture.clone()));

        renderer.render(&frame(&["act"], 3), 0).unwrap();
        renderer.append_history_frame(&frame(&["log"], 3)).unwrap();

        let s = String::from_utf8(capture.0.borrow().clone()).unwrap();
        // The history write erases the active region first.
        let log_pos = s.rfind("log").unwrap();
        let erase_pos = s[..log_pos].rfind("\x1b[J").unwrap();
        assert!(erase_pos < log_pos);
    }
}
