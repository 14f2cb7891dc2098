//! Interaction state: keyboard, mouse, focus and scroll.

pub mod focus;
pub mod keyboard;
pub mod mouse;
pub mod scroll;
