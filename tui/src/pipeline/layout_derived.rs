//! The layout derived: reactive wrapper around the flex solver.
//!
//! Depends on terminal size, render mode, the live set, and every layout
//! slot the solver actually reads. Unchanged inputs return the cached
//! `ComputedLayout` without recomputation.

use weft_signals::{derived, Derived};

use super::terminal::{
    render_mode_signal, terminal_height_signal, terminal_width_signal, RenderMode,
};
use crate::layout::{compute_layout, ComputedLayout};

pub fn create_layout_derived() -> Derived<ComputedLayout, impl Fn() -> ComputedLayout> {
    let width = terminal_width_signal();
    let height = terminal_height_signal();
    let mode = render_mode_signal();

    derived(move || {
        let tw = width.get();
        let th = height.get();
        // Only fullscreen pins root height to the terminal.
        let constrain_height = mode.get() == RenderMode::Fullscreen;
        compute_layout(tw, th, constrain_height)
    })
}
