//! Color and opacity inheritance along the parent chain.

use crate::engine::arrays::{core, visual};
use crate::types::Rgba;

/// Nearest ancestor-or-self foreground that is not terminal-default.
pub fn inherited_fg(index: usize) -> Rgba {
    let mut current = Some(index);
    while let Some(idx) = current {
        let fg = visual::get_fg_color(idx);
        if !fg.is_terminal_default() {
            return fg;
        }
        current = core::get_parent_index(idx);
    }
    Rgba::TERMINAL_DEFAULT
}

/// Nearest ancestor-or-self background that is not terminal-default.
pub fn inherited_bg(index: usize) -> Rgba {
    let mut current = Some(index);
    while let Some(idx) = current {
        let bg = visual::get_bg_color(idx);
        if !bg.is_terminal_default() {
            return bg;
        }
        current = core::get_parent_index(idx);
    }
    Rgba::TERMINAL_DEFAULT
}

/// Nearest ancestor-or-self border color that is not terminal-default.
pub fn inherited_border_color(index: usize) -> Rgba {
    let mut current = Some(index);
    while let Some(idx) = current {
        let color = visual::get_border_color(idx);
        if !color.is_terminal_default() {
            return color;
        }
        current = core::get_parent_index(idx);
    }
    Rgba::TERMINAL_DEFAULT
}

/// Product of opacities from the component up to its root, in [0, 1].
pub fn effective_opacity(index: usize) -> f32 {
    let mut opacity = 1.0f32;
    let mut current = Some(index);
    while let Some(idx) = current {
        opacity *= visual::get_opacity(idx) as f32 / 255.0;
        current = core::get_parent_index(idx);
    }
    opacity.clamp(0.0, 1.0)
}

/// Alpha-scale a color; sentinels pass through untouched.
pub fn apply_opacity(color: Rgba, opacity: f32) -> Rgba {
    if opacity >= 1.0 || color.is_terminal_default() || color.is_ansi() {
        return color;
    }
    Rgba {
        a: ((color.a as f32 * opacity).round()).clamp(0.0, 255.0) as i16,
        ..color
    }
}
