//! Text measurement in terminal cells.
//!
//! Widths follow Unicode display width: narrow=1, wide (CJK/emoji)=2,
//! combining=0, ambiguous treated as narrow. Wrapping is word-aware: break
//! on whitespace when possible, hard-break tokens wider than the line.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::types::TextWrap;

/// Display width of one character in cells.
#[inline]
pub fn char_display_width(c: char) -> u16 {
    UnicodeWidthChar::width(c).unwrap_or(0) as u16
}

/// Display width of a string in cells.
#[inline]
pub fn display_width(s: &str) -> u16 {
    UnicodeWidthStr::width(s) as u16
}

/// Width of the widest explicit line.
pub fn max_line_width(s: &str) -> u16 {
    s.lines().map(display_width).max().unwrap_or(0)
}

/// Number of rows `text` occupies at `available_width` under `wrap`.
///
/// Empty text measures 0; non-empty text at least 1.
pub fn measure_text_height(text: &str, available_width: u16, wrap: TextWrap) -> u16 {
    if text.is_empty() {
        return 0;
    }
    match wrap {
        TextWrap::NoWrap | TextWrap::Truncate => text.lines().count().max(1) as u16,
        TextWrap::Wrap => wrap_text(text, available_width).len().max(1) as u16,
    }
}

/// Word-wrap `text` to `width` cells per line.
///
/// Explicit newlines always break. A token wider than `width` is hard-broken
/// at column boundaries (never splitting a wide glyph).
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        wrap_one_line(raw_line, width, &mut lines);
    }
    lines
}

fn wrap_one_line(line: &str, width: u16, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0u16;

    for word in line.split(' ') {
        let word_width = display_width(word);
        let sep = if current.is_empty() { 0 } else { 1 };

        if current_width + sep + word_width <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += sep + word_width;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
        } else {
            // Token wider than the line: hard-break at column boundaries.
            for c in word.chars() {
                let cw = char_display_width(c);
                if current_width + cw > width && current_width > 0 {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += cw;
            }
        }
    }

    out.push(current);
}

/// Truncate to `width` cells, appending `…` when content was cut.
pub fn truncate_text(text: &str, width: u16) -> String {
    if width == 0 {
        return String::new();
    }
    if display_width(text) <= width {
        return text.to_string();
    }

    let target = width.saturating_sub(1);
    let mut result = String::new();
    let mut used = 0u16;
    for c in text.chars() {
        let cw = char_display_width(c);
        if used + cw > target {
            break;
        }
        result.push(c);
        used += cw;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width(""), 0);
        assert_eq!(display_width("中文"), 4);
        assert_eq!(display_width("a中b"), 4);
    }

    #[test]
    fn wrap_breaks_on_whitespace() {
        let lines = wrap_text("hello world foo", 10);
        assert_eq!(lines, vec!["hello", "world foo"]);
    }

    #[test]
    fn wrap_hard_breaks_long_tokens() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_honors_explicit_newlines() {
        let lines = wrap_text("a\nb", 10);
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn measure_height_modes() {
        assert_eq!(measure_text_height("hello", 10, TextWrap::Wrap), 1);
        assert_eq!(measure_text_height("hello world foo", 10, TextWrap::Wrap), 2);
        assert_eq!(
            measure_text_height("hello world foo", 10, TextWrap::NoWrap),
            1
        );
        assert_eq!(measure_text_height("a\nb\nc", 10, TextWrap::Wrap), 3);
        assert_eq!(measure_text_height("", 10, TextWrap::Wrap), 0);
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 6), "hello…");
        assert_eq!(truncate_text("hello", 4), "hel…");
        assert_eq!(truncate_text("", 5), "");
    }

    #[test]
    fn wide_glyphs_never_split() {
        let lines = wrap_text("中文中", 3);
        // Each CJK glyph is 2 cells; 3-cell lines fit one glyph each.
        assert_eq!(lines, vec!["中", "文", "中"]);
    }
}
