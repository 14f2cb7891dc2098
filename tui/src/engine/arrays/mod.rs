//! Parallel component arrays, grouped by concern.
//!
//! All component state lives in these columnar arrays indexed by component
//! index. Every cell is a reactive slot, so a derived that reads index `i`
//! only re-runs when index `i` changes.
//!
//! - [`core`] — type, parent link, visibility
//! - [`visual`] — colors, opacity, borders, z-index
//! - [`text`] — content and text styling
//! - [`interaction`] — focus, cursor, scroll, pointer state
//!
//! Layout properties live on [`super::layout_node::LayoutNode`] slots rather
//! than in arrays here; the solver reads them through the node registry.

pub mod core;
pub mod interaction;
pub mod text;
pub mod visual;

/// Grow every array to hold `index`. Called by the registry on allocation.
pub fn ensure_all_capacity(index: usize) {
    core::ensure_capacity(index);
    visual::ensure_capacity(index);
    text::ensure_capacity(index);
    interaction::ensure_capacity(index);
}

/// Reset every cell at `index` to its default. Called on release.
pub fn clear_all_at_index(index: usize) {
    core::clear_at_index(index);
    visual::clear_at_index(index);
    text::clear_at_index(index);
    interaction::clear_at_index(index);
}

/// Release all array storage. Runs automatically when the live set empties.
pub fn reset_all_arrays() {
    core::reset();
    visual::reset();
    text::reset();
    interaction::reset();
}
