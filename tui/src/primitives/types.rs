//! Prop types shared by the primitives.
//!
//! Every visual/layout prop is a [`PropValue`]: a literal, a signal, or a
//! getter closure. Binding a prop to a slot preserves the reactive
//! connection, so a signal write flows straight into layout or paint.

use std::rc::Rc;

use weft_signals::Signal;

use crate::state::keyboard::KeyboardEvent;
use crate::state::mouse::MouseEvent;
use crate::types::{Attr, BorderStyle, Dimension, Rgba, TextAlign, TextWrap};

/// Cleanup closure returned by every primitive; calling it unmounts the
/// component (and its subtree) and releases all resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callbacks
// =============================================================================

/// Non-consuming mouse callback.
pub type MouseCallback = Rc<dyn Fn(&MouseEvent)>;

/// Consuming mouse callback; return true to stop propagation to global
/// handlers.
pub type MouseCallbackConsuming = Rc<dyn Fn(&MouseEvent) -> bool>;

/// Keyboard callback; return true to consume.
pub type KeyCallback = Rc<dyn Fn(&KeyboardEvent) -> bool>;

pub type FocusCallback = Rc<dyn Fn()>;
pub type BlurCallback = Rc<dyn Fn()>;

pub type InputChangeCallback = Rc<dyn Fn(&str)>;
pub type InputSubmitCallback = Rc<dyn Fn(&str)>;
pub type InputCancelCallback = Rc<dyn Fn()>;

// =============================================================================
// PropValue
// =============================================================================

/// A prop that is a literal, follows a signal, or evaluates a getter.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    Static(T),
    Signal(Signal<T>),
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Immediate (tracked) read.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl From<u16> for PropValue<Dimension> {
    fn from(value: u16) -> Self {
        PropValue::Static(Dimension::from(value))
    }
}

impl From<i32> for PropValue<Dimension> {
    fn from(value: i32) -> Self {
        PropValue::Static(Dimension::from(value))
    }
}

impl From<&str> for PropValue<String> {
    fn from(value: &str) -> Self {
        PropValue::Static(value.to_string())
    }
}

// =============================================================================
// BoxProps
// =============================================================================

/// Props for the box container. Everything is optional; unset props keep
/// the layout-node defaults.
#[derive(Default)]
pub struct BoxProps {
    pub id: Option<String>,
    pub visible: Option<PropValue<bool>>,

    // Container layout
    pub flex_direction: Option<PropValue<u8>>,
    pub flex_wrap: Option<PropValue<u8>>,
    pub justify_content: Option<PropValue<u8>>,
    pub align_items: Option<PropValue<u8>>,

    // Item layout
    pub grow: Option<PropValue<f32>>,
    pub shrink: Option<PropValue<f32>>,
    pub flex_basis: Option<PropValue<Dimension>>,
    pub align_self: Option<PropValue<u8>>,
    pub order: Option<PropValue<i32>>,

    // Dimensions
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub min_width: Option<PropValue<Dimension>>,
    pub max_width: Option<PropValue<Dimension>>,
    pub min_height: Option<PropValue<Dimension>>,
    pub max_height: Option<PropValue<Dimension>>,

    // Spacing
    pub margin: Option<PropValue<u16>>,
    pub margin_top: Option<PropValue<u16>>,
    pub margin_right: Option<PropValue<u16>>,
    pub margin_bottom: Option<PropValue<u16>>,
    pub margin_left: Option<PropValue<u16>>,
    pub padding: Option<PropValue<u16>>,
    pub padding_top: Option<PropValue<u16>>,
    pub padding_right: Option<PropValue<u16>>,
    pub padding_bottom: Option<PropValue<u16>>,
    pub padding_left: Option<PropValue<u16>>,
    pub gap: Option<PropValue<u16>>,

    // Positioning
    pub position: Option<PropValue<u8>>,
    pub top: Option<PropValue<i32>>,
    pub right: Option<PropValue<i32>>,
    pub bottom: Option<PropValue<i32>>,
    pub left: Option<PropValue<i32>>,
    pub overflow: Option<PropValue<u8>>,
    /// Follow content growth while scrolled to the bottom (log views).
    pub stick_to_bottom: bool,

    // Border
    pub border: Option<PropValue<BorderStyle>>,
    pub border_top: Option<PropValue<BorderStyle>>,
    pub border_right: Option<PropValue<BorderStyle>>,
    pub border_bottom: Option<PropValue<BorderStyle>>,
    pub border_left: Option<PropValue<BorderStyle>>,
    pub border_color: Option<PropValue<Rgba>>,

    // Visual
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub opacity: Option<PropValue<u8>>,
    pub z_index: Option<PropValue<i32>>,

    // Interaction
    pub focusable: Option<bool>,
    pub tab_index: Option<i32>,

    // Callbacks
    pub on_click: Option<MouseCallbackConsuming>,
    pub on_mouse_down: Option<MouseCallback>,
    pub on_mouse_up: Option<MouseCallback>,
    pub on_mouse_enter: Option<MouseCallback>,
    pub on_mouse_leave: Option<MouseCallback>,
    pub on_scroll: Option<MouseCallbackConsuming>,
    pub on_key: Option<KeyCallback>,
    pub on_focus: Option<FocusCallback>,
    pub on_blur: Option<BlurCallback>,

    /// Children closure; components created inside get this box as parent.
    pub children: Option<Box<dyn FnOnce()>>,
}

// =============================================================================
// TextProps
// =============================================================================

/// Props for the text leaf. `content` is required; the rest optional.
#[derive(Default)]
pub struct TextProps {
    pub id: Option<String>,
    pub content: PropValue<String>,
    pub visible: Option<PropValue<bool>>,

    pub attrs: Option<PropValue<Attr>>,
    pub align: Option<PropValue<TextAlign>>,
    pub wrap: Option<PropValue<TextWrap>>,

    pub grow: Option<PropValue<f32>>,
    pub shrink: Option<PropValue<f32>>,
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub max_width: Option<PropValue<Dimension>>,
    pub max_height: Option<PropValue<Dimension>>,

    pub padding: Option<PropValue<u16>>,

    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub opacity: Option<PropValue<u8>>,
    pub z_index: Option<PropValue<i32>>,

    pub focusable: Option<bool>,
    pub tab_index: Option<i32>,
    pub on_click: Option<MouseCallbackConsuming>,
    pub on_key: Option<KeyCallback>,
}

// =============================================================================
// InputProps
// =============================================================================

/// Cursor appearance for the input primitive.
#[derive(Clone, Default)]
pub struct CursorConfig {
    /// Custom cursor glyph; the default is an inverse block over the
    /// character under the cursor.
    pub char: Option<char>,
    /// Glyph drawn during the blink off-phase; unset skips drawing.
    pub alt_char: Option<char>,
}

/// Props for the single-line input. `value` is a two-way bound signal.
pub struct InputProps {
    pub id: Option<String>,
    pub value: Signal<String>,
    pub placeholder: Option<String>,
    pub max_length: Option<usize>,
    pub password: bool,
    pub mask_char: Option<char>,
    pub auto_focus: bool,
    pub cursor: Option<CursorConfig>,

    pub visible: Option<PropValue<bool>>,
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub padding: Option<PropValue<u16>>,
    pub border: Option<PropValue<BorderStyle>>,
    pub border_color: Option<PropValue<Rgba>>,
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub attrs: Option<PropValue<Attr>>,

    pub tab_index: Option<i32>,
    pub on_change: Option<InputChangeCallback>,
    pub on_submit: Option<InputSubmitCallback>,
    pub on_cancel: Option<InputCancelCallback>,
    pub on_focus: Option<FocusCallback>,
    pub on_blur: Option<BlurCallback>,
}

impl InputProps {
    /// `value` is required; everything else starts unset.
    pub fn new(value: Signal<String>) -> Self {
        Self {
            id: None,
            value,
            placeholder: None,
            max_length: None,
            password: false,
            mask_char: None,
            auto_focus: false,
            cursor: None,
            visible: None,
            width: None,
            height: None,
            padding: None,
            border: None,
            border_color: None,
            fg: None,
            bg: None,
            attrs: None,
            tab_index: None,
            on_change: None,
            on_submit: None,
            on_cancel: None,
            on_focus: None,
            on_blur: None,
        }
    }
}

// =============================================================================
// SelectProps / ProgressProps
// =============================================================================

/// Props for the dropdown-style select.
pub struct SelectProps {
    pub id: Option<String>,
    pub options: PropValue<Vec<String>>,
    /// Two-way bound index into `options`.
    pub selected: Signal<usize>,
    pub visible: Option<PropValue<bool>>,
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
    pub border: Option<PropValue<BorderStyle>>,
    pub tab_index: Option<i32>,
    pub on_change: Option<Rc<dyn Fn(usize, &str)>>,
}

impl SelectProps {
    pub fn new(options: impl Into<PropValue<Vec<String>>>, selected: Signal<usize>) -> Self {
        Self {
            id: None,
            options: options.into(),
            selected,
            visible: None,
            width: None,
            height: None,
            fg: None,
            bg: None,
            border: None,
            tab_index: None,
            on_change: None,
        }
    }
}

/// Props for the progress bar; `value` is a ratio in [0, 1].
#[derive(Default)]
pub struct ProgressProps {
    pub id: Option<String>,
    pub value: PropValue<f32>,
    pub visible: Option<PropValue<bool>>,
    pub width: Option<PropValue<Dimension>>,
    pub height: Option<PropValue<Dimension>>,
    pub fg: Option<PropValue<Rgba>>,
    pub bg: Option<PropValue<Rgba>>,
}
