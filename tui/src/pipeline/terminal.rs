//! Terminal state signals: size and render mode.
//!
//! These are the root inputs of the pipeline; resizing the terminal writes
//! them and everything downstream recomputes.

use weft_signals::{signal, Signal};

use std::cell::RefCell;

/// How frames reach the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Alternate screen, diff rendering, terminal-height frames.
    #[default]
    Fullscreen,
    /// Normal buffer, content-height frames erased and redrawn in place.
    Inline,
    /// Two regions: committed scrollback above, reactive region below.
    Append,
}

thread_local! {
    static TERMINAL_WIDTH: RefCell<Signal<u16>> = RefCell::new(signal(80));
    static TERMINAL_HEIGHT: RefCell<Signal<u16>> = RefCell::new(signal(24));
    static RENDER_MODE: RefCell<Signal<RenderMode>> = RefCell::new(signal(RenderMode::Fullscreen));
}

pub fn terminal_width() -> u16 {
    TERMINAL_WIDTH.with(|w| w.borrow().get())
}

pub fn terminal_height() -> u16 {
    TERMINAL_HEIGHT.with(|h| h.borrow().get())
}

/// Write the terminal size signals (resize events, tests).
/// Zero dimensions are treated as 1.
pub fn set_terminal_size(width: u16, height: u16) {
    TERMINAL_WIDTH.with(|w| w.borrow().set(width.max(1)));
    TERMINAL_HEIGHT.with(|h| h.borrow().set(height.max(1)));
}

pub fn terminal_width_signal() -> Signal<u16> {
    TERMINAL_WIDTH.with(|w| w.borrow().clone())
}

pub fn terminal_height_signal() -> Signal<u16> {
    TERMINAL_HEIGHT.with(|h| h.borrow().clone())
}

pub fn render_mode() -> RenderMode {
    RENDER_MODE.with(|m| m.borrow().get())
}

pub fn set_render_mode(mode: RenderMode) {
    RENDER_MODE.with(|m| m.borrow().set(mode));
}

pub fn render_mode_signal() -> Signal<RenderMode> {
    RENDER_MODE.with(|m| m.borrow().clone())
}

/// Query the real terminal and seed the size signals.
pub fn detect_terminal_size() {
    if let Ok((width, height)) = crossterm::terminal::size() {
        set_terminal_size(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_roundtrip() {
        set_terminal_size(120, 40);
        assert_eq!(terminal_width(), 120);
        assert_eq!(terminal_height(), 40);
        set_terminal_size(80, 24);
    }

    #[test]
    fn zero_size_clamps_to_one() {
        set_terminal_size(0, 0);
        assert_eq!(terminal_width(), 1);
        assert_eq!(terminal_height(), 1);
        set_terminal_size(80, 24);
    }

    #[test]
    fn mode_roundtrip() {
        set_render_mode(RenderMode::Inline);
        assert_eq!(render_mode(), RenderMode::Inline);
        set_render_mode(RenderMode::Fullscreen);
    }
}
