//! Terminal renderers: frame buffer, escape output, and the three modes.

pub mod ansi;
pub mod append;
pub mod buffer;
pub mod diff;
pub mod inline;
pub mod output;

pub use append::AppendRenderer;
pub use buffer::{BorderSides, FrameBuffer};
pub use diff::DiffRenderer;
pub use inline::InlineRenderer;
pub use output::{CellWriter, OutputBuffer};
