//! Component primitives: constructors, control flow, lifecycle, context.

pub mod box_primitive;
pub mod context;
pub mod control_flow;
pub mod input;
pub mod lifecycle;
pub mod text;
pub mod types;
pub mod widgets;

pub use box_primitive::box_primitive;
pub use context::{create_context, provide, use_context, Context};
pub use control_flow::{each, show, when, AsyncState, WhenOptions};
pub use input::input;
pub use lifecycle::{on_destroy, on_mount};
pub use text::text;
pub use types::{
    BoxProps, Cleanup, CursorConfig, InputProps, ProgressProps, PropValue, SelectProps, TextProps,
};
pub use widgets::{progress, select};
