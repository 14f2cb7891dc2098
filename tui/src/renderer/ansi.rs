//! ANSI escape sequences: cursor, screen, colors, attributes, protocols.
//!
//! All output the engine emits flows through these helpers, keeping the wire
//! protocol in one place. Sequences are written into any `io::Write` (the
//! renderers pass an [`super::output::OutputBuffer`]).

use std::io::{self, Write};

use crate::types::{Attr, Rgba};

// =============================================================================
// Cursor
// =============================================================================

/// Move to `(x, y)` zero-based; emits the 1-based `CSI r;c H` form.
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

#[inline]
pub fn cursor_up<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 {
        write!(w, "\x1b[{}A", n)?;
    }
    Ok(())
}

#[inline]
pub fn cursor_column_zero<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[G")
}

#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25l")
}

#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25h")
}

// =============================================================================
// Screen
// =============================================================================

#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049l")
}

/// Clear the screen and home the cursor.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J\x1b[H")
}

#[inline]
pub fn erase_line<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2K")
}

/// Erase from the cursor to the end of the screen.
#[inline]
pub fn erase_down<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[J")
}

// =============================================================================
// Synchronized output
// =============================================================================

#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026h")
}

#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026l")
}

// =============================================================================
// Colors and attributes
// =============================================================================

#[inline]
pub fn reset<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[0m")
}

/// Foreground: default / 16-color / 256-color / truecolor per the sentinel.
#[inline]
pub fn fg<W: Write>(w: &mut W, color: Rgba) -> io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "\x1b[39m")
    } else if color.is_ansi() {
        let index = color.ansi_index();
        if index < 8 {
            write!(w, "\x1b[{}m", 30 + index)
        } else if index < 16 {
            write!(w, "\x1b[{}m", 90 + index - 8)
        } else {
            write!(w, "\x1b[38;5;{}m", index)
        }
    } else {
        write!(w, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
    }
}

/// Background counterpart of [`fg`].
#[inline]
pub fn bg<W: Write>(w: &mut W, color: Rgba) -> io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "\x1b[49m")
    } else if color.is_ansi() {
        let index = color.ansi_index();
        if index < 8 {
            write!(w, "\x1b[{}m", 40 + index)
        } else if index < 16 {
            write!(w, "\x1b[{}m", 100 + index - 8)
        } else {
            write!(w, "\x1b[48;5;{}m", index)
        }
    } else {
        write!(w, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
    }
}

/// SGR attribute codes for a bitfield, e.g. bold+underline → `CSI 1;4 m`.
pub fn attrs<W: Write>(w: &mut W, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }
    let codes: [(Attr, u8); 8] = [
        (Attr::BOLD, 1),
        (Attr::DIM, 2),
        (Attr::ITALIC, 3),
        (Attr::UNDERLINE, 4),
        (Attr::BLINK, 5),
        (Attr::INVERSE, 7),
        (Attr::HIDDEN, 8),
        (Attr::STRIKETHROUGH, 9),
    ];
    write!(w, "\x1b[")?;
    let mut first = true;
    for (flag, code) in codes {
        if attr.contains(flag) {
            if !first {
                write!(w, ";")?;
            }
            write!(w, "{}", code)?;
            first = false;
        }
    }
    write!(w, "m")
}

// =============================================================================
// Input protocols
// =============================================================================

/// Button + motion tracking with SGR encoding.
#[inline]
pub fn enable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1000h\x1b[?1002h\x1b[?1006h")
}

#[inline]
pub fn disable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1006l\x1b[?1002l\x1b[?1000l")
}

#[inline]
pub fn enable_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[>1u")
}

#[inline]
pub fn disable_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[<u")
}

#[inline]
pub fn enable_bracketed_paste<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2004l")
}

#[inline]
pub fn enable_focus_reporting<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1004h")
}

#[inline]
pub fn disable_focus_reporting<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1004l")
}
