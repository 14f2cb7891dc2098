//! Escape-sequence decoder for terminal input.
//!
//! Turns raw stdin bytes into structured events:
//!
//! - control bytes and UTF-8 text
//! - ESC disambiguation (lone Escape vs. sequence start, via the pending
//!   buffer and [`InputParser::flush_pending`])
//! - CSI keys (arrows, Home/End, PageUp/Down, Insert/Delete, F1-F12,
//!   Shift-Tab) with modifier parameters
//! - SS3 keys (application-mode arrows, F1-F4)
//! - SGR mouse (press/release/move/scroll with modifiers)
//! - Kitty keyboard protocol (`CSI codepoint;mods:state u`)
//! - bracketed paste and focus in/out reports

use bitflags::bitflags;

// =============================================================================
// Event types
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseInput),
    Paste(String),
    FocusGained,
    FocusLost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifier,
    pub state: KeyPhase,
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifier: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const META  = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseInputKind {
    Press(MouseButtonCode),
    Release(MouseButtonCode),
    Move,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonCode {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseInput {
    pub kind: MouseInputKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifier,
}

// =============================================================================
// Parser
// =============================================================================

enum Step {
    Event(Option<InputEvent>),
    Incomplete,
}

/// Stateful byte-stream decoder. Feed chunks with [`parse`](Self::parse);
/// when the stream goes quiet with bytes pending (a lone ESC), drain them
/// with [`flush_pending`](Self::flush_pending).
pub struct InputParser {
    buf: Vec<u8>,
    in_paste: bool,
    paste: Vec<u8>,
}

impl InputParser {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            in_paste: false,
            paste: Vec::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Decode as many complete events as `data` allows.
    pub fn parse(&mut self, data: &[u8]) -> Vec<InputEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        loop {
            if self.buf.is_empty() {
                break;
            }
            if self.in_paste {
                match self.take_paste_chunk() {
                    Some(Some(event)) => events.push(event),
                    Some(None) => {}
                    None => break, // waiting for the paste terminator
                }
                continue;
            }
            match self.step() {
                Step::Event(Some(event)) => events.push(event),
                Step::Event(None) => {}
                Step::Incomplete => break,
            }
        }
        events
    }

    /// A quiet period ended with bytes still buffered: emit the lone ESC
    /// (or stray bytes) as key events.
    pub fn flush_pending(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while !self.buf.is_empty() {
            let byte = self.buf.remove(0);
            let code = match byte {
                0x1B => KeyCode::Escape,
                b => KeyCode::Char(b as char),
            };
            events.push(InputEvent::Key(KeyEvent {
                code,
                modifiers: Modifier::NONE,
                state: KeyPhase::Press,
                raw: vec![byte],
            }));
        }
        events
    }

    fn consume(&mut self, n: usize) -> Vec<u8> {
        self.buf.drain(..n).collect()
    }

    fn key(&mut self, n: usize, code: KeyCode, modifiers: Modifier) -> Step {
        let raw = self.consume(n);
        Step::Event(Some(InputEvent::Key(KeyEvent {
            code,
            modifiers,
            state: KeyPhase::Press,
            raw,
        })))
    }

    fn step(&mut self) -> Step {
        let first = self.buf[0];
        match first {
            0x1B => self.parse_escape(),
            // Ctrl+letter (excluding the bytes with dedicated meanings).
            0x01..=0x07 | 0x0B..=0x0C | 0x0E..=0x1A => {
                let ch = (first - 1 + b'a') as char;
                self.key(1, KeyCode::Char(ch), Modifier::CTRL)
            }
            0x08 => self.key(1, KeyCode::Backspace, Modifier::CTRL),
            0x09 => self.key(1, KeyCode::Tab, Modifier::NONE),
            0x0A | 0x0D => self.key(1, KeyCode::Enter, Modifier::NONE),
            0x7F => self.key(1, KeyCode::Backspace, Modifier::NONE),
            0x20..=0x7E => self.key(1, KeyCode::Char(first as char), Modifier::NONE),
            0x80..=0xFF => self.parse_utf8(),
            _ => {
                self.consume(1);
                Step::Event(None)
            }
        }
    }

    fn parse_utf8(&mut self) -> Step {
        let len = match self.buf[0] {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => {
                self.consume(1);
                return Step::Event(None);
            }
        };
        if self.buf.len() < len {
            return Step::Incomplete;
        }
        match std::str::from_utf8(&self.buf[..len]) {
            Ok(s) => {
                let ch = s.chars().next().expect("non-empty utf8");
                self.key(len, KeyCode::Char(ch), Modifier::NONE)
            }
            Err(_) => {
                self.consume(1);
                Step::Event(None)
            }
        }
    }

    fn parse_escape(&mut self) -> Step {
        if self.buf.len() < 2 {
            return Step::Incomplete;
        }
        match self.buf[1] {
            b'[' => self.parse_csi(),
            b'O' => self.parse_ss3(),
            0x1B => self.key(2, KeyCode::Escape, Modifier::ALT),
            0x20..=0x7E => {
                let ch = self.buf[1] as char;
                self.key(2, KeyCode::Char(ch), Modifier::ALT)
            }
            _ => self.key(1, KeyCode::Escape, Modifier::NONE),
        }
    }

    fn parse_ss3(&mut self) -> Step {
        if self.buf.len() < 3 {
            return Step::Incomplete;
        }
        let code = match self.buf[2] {
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            b'P' => Some(KeyCode::F(1)),
            b'Q' => Some(KeyCode::F(2)),
            b'R' => Some(KeyCode::F(3)),
            b'S' => Some(KeyCode::F(4)),
            _ => None,
        };
        match code {
            Some(code) => self.key(3, code, Modifier::NONE),
            None => {
                self.consume(3);
                Step::Event(None)
            }
        }
    }

    fn parse_csi(&mut self) -> Step {
        if self.buf.len() < 3 {
            return Step::Incomplete;
        }

        if self.buf[2] == b'<' {
            return self.parse_sgr_mouse();
        }
        if self.buf[2] == b'I' {
            self.consume(3);
            return Step::Event(Some(InputEvent::FocusGained));
        }
        if self.buf[2] == b'O' {
            self.consume(3);
            return Step::Event(Some(InputEvent::FocusLost));
        }

        // Find the final byte of the sequence.
        let mut end = 2;
        while end < self.buf.len() && !(0x40..=0x7E).contains(&self.buf[end]) {
            end += 1;
        }
        if end >= self.buf.len() {
            return Step::Incomplete;
        }

        let final_byte = self.buf[end];
        let params_raw = String::from_utf8_lossy(&self.buf[2..end]).to_string();
        let consumed = end + 1;

        // Bracketed paste: 200~ starts, 201~ ends.
        if final_byte == b'~' && params_raw == "200" {
            self.consume(consumed);
            self.in_paste = true;
            return Step::Event(None);
        }

        // Kitty keyboard: CSI codepoint;mods:state u
        if final_byte == b'u' {
            let raw = self.consume(consumed);
            return Step::Event(self.kitty_key(&params_raw, raw));
        }

        let params: Vec<u32> = params_raw
            .split(';')
            .map(|s| s.split(':').next().unwrap_or("0").parse().unwrap_or(0))
            .collect();
        let modifiers = params
            .get(1)
            .copied()
            .filter(|&m| m > 0)
            .map(decode_modifier)
            .unwrap_or(Modifier::NONE);

        let code = match final_byte {
            b'A' => Some((KeyCode::Up, modifiers)),
            b'B' => Some((KeyCode::Down, modifiers)),
            b'C' => Some((KeyCode::Right, modifiers)),
            b'D' => Some((KeyCode::Left, modifiers)),
            b'H' => Some((KeyCode::Home, modifiers)),
            b'F' => Some((KeyCode::End, modifiers)),
            b'P' => Some((KeyCode::F(1), modifiers)),
            b'Q' => Some((KeyCode::F(2), modifiers)),
            b'S' => Some((KeyCode::F(4), modifiers)),
            b'Z' => Some((KeyCode::Tab, Modifier::SHIFT)),
            b'~' => match params.first().copied().unwrap_or(0) {
                1 | 7 => Some((KeyCode::Home, modifiers)),
                2 => Some((KeyCode::Insert, modifiers)),
                3 => Some((KeyCode::Delete, modifiers)),
                4 | 8 => Some((KeyCode::End, modifiers)),
                5 => Some((KeyCode::PageUp, modifiers)),
                6 => Some((KeyCode::PageDown, modifiers)),
                15 => Some((KeyCode::F(5), modifiers)),
                17 => Some((KeyCode::F(6), modifiers)),
                18 => Some((KeyCode::F(7), modifiers)),
                19 => Some((KeyCode::F(8), modifiers)),
                20 => Some((KeyCode::F(9), modifiers)),
                21 => Some((KeyCode::F(10), modifiers)),
                23 => Some((KeyCode::F(11), modifiers)),
                24 => Some((KeyCode::F(12), modifiers)),
                _ => None,
            },
            _ => None,
        };

        match code {
            Some((code, modifiers)) => self.key(consumed, code, modifiers),
            None => {
                self.consume(consumed);
                Step::Event(None)
            }
        }
    }

    fn kitty_key(&mut self, params: &str, raw: Vec<u8>) -> Option<InputEvent> {
        // codepoint[;modifiers[:state]]
        let mut parts = params.split(';');
        let codepoint: u32 = parts.next()?.split(':').next()?.parse().ok()?;
        let (modifiers, state) = match parts.next() {
            Some(rest) => {
                let mut sub = rest.split(':');
                let mods = sub.next().and_then(|m| m.parse().ok()).unwrap_or(1);
                let state = match sub.next().and_then(|s| s.parse::<u32>().ok()) {
                    Some(2) => KeyPhase::Repeat,
                    Some(3) => KeyPhase::Release,
                    _ => KeyPhase::Press,
                };
                (decode_modifier(mods), state)
            }
            None => (Modifier::NONE, KeyPhase::Press),
        };

        let code = match codepoint {
            13 => KeyCode::Enter,
            9 => KeyCode::Tab,
            27 => KeyCode::Escape,
            127 => KeyCode::Backspace,
            cp => KeyCode::Char(char::from_u32(cp)?),
        };
        Some(InputEvent::Key(KeyEvent {
            code,
            modifiers,
            state,
            raw,
        }))
    }

    fn parse_sgr_mouse(&mut self) -> Step {
        // CSI < Pb ; Px ; Py (M = press/move, m = release)
        let start = 3;
        let mut end = start;
        while end < self.buf.len() && self.buf[end] != b'M' && self.buf[end] != b'm' {
            end += 1;
        }
        if end >= self.buf.len() {
            return Step::Incomplete;
        }

        let is_release = self.buf[end] == b'm';
        let params: Vec<u16> = String::from_utf8_lossy(&self.buf[start..end])
            .split(';')
            .map(|s| s.parse().unwrap_or(0))
            .collect();
        self.consume(end + 1);

        if params.len() < 3 {
            return Step::Event(None);
        }
        let cb = params[0];
        let x = params[1].saturating_sub(1);
        let y = params[2].saturating_sub(1);

        let mut modifiers = Modifier::NONE;
        if cb & 4 != 0 {
            modifiers |= Modifier::SHIFT;
        }
        if cb & 8 != 0 {
            modifiers |= Modifier::ALT;
        }
        if cb & 16 != 0 {
            modifiers |= Modifier::CTRL;
        }

        let kind = if cb & 64 != 0 {
            if cb & 1 != 0 {
                MouseInputKind::ScrollDown
            } else {
                MouseInputKind::ScrollUp
            }
        } else if cb & 32 != 0 {
            MouseInputKind::Move
        } else {
            let button = match cb & 3 {
                0 => MouseButtonCode::Left,
                1 => MouseButtonCode::Middle,
                2 => MouseButtonCode::Right,
                // `cb & 3 == 3` is "no button" motion; treat as move.
                _ => {
                    return Step::Event(Some(InputEvent::Mouse(MouseInput {
                        kind: MouseInputKind::Move,
                        x,
                        y,
                        modifiers,
                    })))
                }
            };
            if is_release {
                MouseInputKind::Release(button)
            } else {
                MouseInputKind::Press(button)
            }
        };

        Step::Event(Some(InputEvent::Mouse(MouseInput {
            kind,
            x,
            y,
            modifiers,
        })))
    }

    /// Accumulate paste bytes until `CSI 201~`; returns
    /// `Some(Some(event))` when the paste completes, `Some(None)` when bytes
    /// were consumed, `None` when more input is needed.
    fn take_paste_chunk(&mut self) -> Option<Option<InputEvent>> {
        const END: &[u8] = b"\x1b[201~";
        if let Some(pos) = find_subsequence(&self.buf, END) {
            self.paste.extend_from_slice(&self.buf[..pos]);
            self.buf.drain(..pos + END.len());
            self.in_paste = false;
            let text = String::from_utf8_lossy(&std::mem::take(&mut self.paste)).into_owned();
            return Some(Some(InputEvent::Paste(text)));
        }
        // Keep a tail that could be a partial terminator.
        if self.buf.len() > END.len() {
            let keep = self.buf.len() - END.len();
            self.paste.extend_from_slice(&self.buf[..keep]);
            self.buf.drain(..keep);
            return Some(None);
        }
        None
    }
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new()
    }
}

/// xterm modifier parameter: value - 1 is a bitfield of shift/alt/ctrl/meta.
fn decode_modifier(param: u32) -> Modifier {
    let bits = param.saturating_sub(1) as u8;
    let mut m = Modifier::NONE;
    if bits & 1 != 0 {
        m |= Modifier::SHIFT;
    }
    if bits & 2 != 0 {
        m |= Modifier::ALT;
    }
    if bits & 4 != 0 {
        m |= Modifier::CTRL;
    }
    if bits & 8 != 0 {
        m |= Modifier::META;
    }
    m
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
