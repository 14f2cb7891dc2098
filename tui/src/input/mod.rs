//! Input: stdin decoding and event routing.

pub mod parser;
pub mod reader;
pub mod router;

pub use parser::{InputEvent, InputParser, KeyCode, KeyPhase, Modifier};
pub use reader::{ByteSource, InputPump, RawModeGuard};
pub use router::{on_paste, route};
