//! Scroll metrics and wheel handling.
//!
//! The layout derived computes `scrollable`/`max_scroll_*` per index; the
//! render effect publishes them here as plain (non-reactive) mirrors so the
//! input path can clamp offsets without re-entering the reactive graph.

use std::cell::RefCell;

use crate::engine::arrays::{core, interaction};
use crate::layout::ComputedLayout;

#[derive(Default)]
struct Metrics {
    scrollable: Vec<u8>,
    max_scroll_x: Vec<u16>,
    max_scroll_y: Vec<u16>,
}

thread_local! {
    static METRICS: RefCell<Metrics> = RefCell::new(Metrics::default());
}

/// Mirror the latest layout's scroll data. Also applies stick-to-bottom:
/// a component that was scrolled to the bottom follows content growth.
pub fn publish_metrics(layout: &ComputedLayout) {
    let mut followups: Vec<(usize, u16)> = Vec::new();

    METRICS.with(|m| {
        let mut m = m.borrow_mut();
        let old_max_y = std::mem::take(&mut m.max_scroll_y);
        m.scrollable = layout.scrollable.clone();
        m.max_scroll_x = layout.max_scroll_x.clone();
        m.max_scroll_y = layout.max_scroll_y.clone();

        for (index, &new_max) in m.max_scroll_y.iter().enumerate() {
            if new_max == 0 {
                continue;
            }
            let old_max = old_max_y.get(index).copied().unwrap_or(0);
            if new_max > old_max
                && weft_signals::untracked(|| {
                    interaction::get_stick_to_bottom(index)
                        && interaction::get_scroll_offset_y(index) >= old_max
                })
            {
                followups.push((index, new_max));
            }
        }
    });

    // Writes happen after the metrics borrow is released; they re-trigger
    // the frame-buffer derived on the next flush.
    for (index, max) in followups {
        interaction::set_scroll_offset_y(index, max);
    }
}

pub fn is_scrollable(index: usize) -> bool {
    METRICS.with(|m| m.borrow().scrollable.get(index).copied().unwrap_or(0) == 1)
}

pub fn max_scroll_x(index: usize) -> u16 {
    METRICS.with(|m| m.borrow().max_scroll_x.get(index).copied().unwrap_or(0))
}

pub fn max_scroll_y(index: usize) -> u16 {
    METRICS.with(|m| m.borrow().max_scroll_y.get(index).copied().unwrap_or(0))
}

/// Nearest scrollable ancestor-or-self of `index`.
pub fn scroll_target(index: usize) -> Option<usize> {
    let mut current = Some(index);
    while let Some(i) = current {
        if is_scrollable(i) {
            return Some(i);
        }
        current = weft_signals::untracked(|| core::get_parent_index(i));
    }
    None
}

/// Scroll `index` by `delta` rows (positive = down), clamped to the range.
/// Returns true when the offset changed.
pub fn scroll_by(index: usize, delta: i32) -> bool {
    let max = max_scroll_y(index);
    let current = weft_signals::untracked(|| interaction::get_scroll_offset_y(index));
    let next = (current as i32 + delta).clamp(0, max as i32) as u16;
    if next != current {
        interaction::set_scroll_offset_y(index, next);
        true
    } else {
        false
    }
}

/// Horizontal counterpart of [`scroll_by`].
pub fn scroll_by_x(index: usize, delta: i32) -> bool {
    let max = max_scroll_x(index);
    let current = weft_signals::untracked(|| interaction::get_scroll_offset_x(index));
    let next = (current as i32 + delta).clamp(0, max as i32) as u16;
    if next != current {
        interaction::set_scroll_offset_x(index, next);
        true
    } else {
        false
    }
}

pub fn reset_scroll_state() {
    METRICS.with(|m| *m.borrow_mut() = Metrics::default());
}
