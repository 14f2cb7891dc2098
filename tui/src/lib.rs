//! # weft-tui
//!
//! A reactive terminal UI engine. Applications declare a component tree of
//! boxes and text; the engine computes a flex layout over parallel arrays,
//! paints a cell grid, and diffs successive frames into minimal escape-code
//! output - updating only what changed, even for very large trees mutating
//! at interactive rates.
//!
//! ## Architecture
//!
//! Components are indices into columnar arrays rather than objects. Every
//! array cell is a reactive slot (see [`weft_signals`]) that can hold a
//! literal, follow a signal, or evaluate a getter. The pipeline is two
//! deriveds and one effect:
//!
//! ```text
//! component tree → layout-node slots → layout derived
//!                → frame-buffer derived → render effect → stdout
//! ```
//!
//! A signal write marks exactly the slots it touches; the layout derived
//! revalidates lazily, the frame-buffer derived repaints only when layout or
//! a visual input changed, and the renderer diffs cell-by-cell.
//!
//! Everything is single-threaded and cooperative. Multi-threaded access is
//! undefined without external synchronization.
//!
//! ## Modules
//!
//! - [`types`] - colors, cells, dimensions, layout enums
//! - [`engine`] - component registry, layout nodes, parallel arrays
//! - [`layout`] - flex solver and text measurement
//! - [`pipeline`] - terminal signals, deriveds, mount
//! - [`renderer`] - frame buffer, ANSI output, the three render modes
//! - [`input`] - stdin decoding and routing
//! - [`state`] - keyboard/mouse/focus/scroll state
//! - [`primitives`] - box/text/input/select/progress, show/each/when,
//!   context and lifecycle hooks

pub mod engine;
pub mod error;
pub mod input;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

pub use types::*;

pub use engine::{
    allocate_index, create_layout_node, destroy_layout_node, get_allocated_indices, get_id,
    get_index, get_layout_node, is_allocated, release_index, reset_registry, LayoutNode,
};

pub use layout::{
    compute_layout, display_width, measure_text_height, reset_layout_scratch, truncate_text,
    wrap_text, ComputedLayout,
};

pub use renderer::{AppendRenderer, DiffRenderer, FrameBuffer, InlineRenderer, OutputBuffer};

pub use pipeline::{
    create_frame_buffer_derived, create_layout_derived, detect_terminal_size, handle_resize,
    mount, render_mode, set_render_mode, set_terminal_size, terminal_height, terminal_width,
    FrameBufferResult, HitRegion, MountHandle, MountOptions, RenderMode,
};

pub use primitives::{
    box_primitive, create_context, each, on_destroy, on_mount, progress, provide, select, show,
    text, use_context, when, AsyncState, BoxProps, Cleanup, Context, CursorConfig, InputProps,
    ProgressProps, PropValue, SelectProps, TextProps, WhenOptions,
};
pub use primitives::input::input;

pub use state::focus::{
    blur, focus, focus_next, focus_previous, focused_index_signal, get_focused_index, has_focus,
    is_focused,
};
pub use state::keyboard::{KeyState, KeyboardEvent, Modifiers};
pub use state::mouse::{HitGrid, MouseAction, MouseButton, MouseEvent, ScrollDirection};

pub use error::{set_reporter, EngineError};

// Re-export the reactive substrate so applications need a single import.
pub use weft_signals::{
    batch, derived, derived_eq, effect, effect_scope, flush_sync, on_scope_dispose, signal,
    untracked, Derived, EffectScope, ReactiveMap, ReactiveSet, Signal, Slot, TrackedSlotArray,
};
