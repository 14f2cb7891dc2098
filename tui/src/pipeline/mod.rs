//! The reactive pipeline: terminal signals → layout → frame buffer → render.

pub mod frame_buffer_derived;
pub mod inheritance;
pub mod layout_derived;
pub mod mount;
pub mod terminal;

pub use frame_buffer_derived::{create_frame_buffer_derived, FrameBufferResult, HitRegion};
pub use layout_derived::create_layout_derived;
pub use mount::{handle_resize, mount, MountHandle, MountOptions};
pub use terminal::{
    detect_terminal_size, render_mode, set_render_mode, set_terminal_size, terminal_height,
    terminal_width, RenderMode,
};
