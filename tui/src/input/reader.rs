//! Raw stdin ownership: raw mode guard and the byte pump.
//!
//! The byte source is a trait so tests (and embedders) can substitute an
//! in-memory stream for stdin. The pump reads a chunk, decodes it, routes
//! the events, and polls the terminal size so resizes propagate even
//! without a signal handler.

use std::io::{self, Read};

use super::parser::InputParser;
use super::router;
use crate::pipeline::terminal;

/// A blocking byte source. Implemented for anything `Read`.
pub trait ByteSource {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: Read> ByteSource for R {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Enables terminal raw mode for its lifetime.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }

    pub fn disable(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

/// Decodes a byte stream and routes the events.
pub struct InputPump {
    parser: InputParser,
    buf: [u8; 1024],
}

impl InputPump {
    pub fn new() -> Self {
        Self {
            parser: InputParser::new(),
            buf: [0; 1024],
        }
    }

    /// Feed raw bytes directly (tests, embedders). Routes every decoded
    /// event and returns how many were routed.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let events = self.parser.parse(bytes);
        let count = events.len();
        for event in events {
            router::route(event);
        }
        count
    }

    /// The stream went quiet with bytes pending (lone ESC): flush them.
    pub fn flush_pending(&mut self) -> usize {
        let events = self.parser.flush_pending();
        let count = events.len();
        for event in events {
            router::route(event);
        }
        count
    }

    /// One blocking read-decode-route cycle. Returns `Ok(false)` on EOF.
    ///
    /// Also refreshes the terminal-size signals, so an application driving
    /// this loop picks up resizes without SIGWINCH plumbing.
    pub fn pump(&mut self, source: &mut dyn ByteSource) -> io::Result<bool> {
        let n = source.read_bytes(&mut self.buf)?;
        if n == 0 {
            self.flush_pending();
            return Ok(false);
        }
        terminal::detect_terminal_size();
        self.feed_slice(n);
        Ok(true)
    }

    fn feed_slice(&mut self, n: usize) {
        let chunk: Vec<u8> = self.buf[..n].to_vec();
        self.feed(&chunk);
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}
