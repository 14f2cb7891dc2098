//! Text arrays: content, attributes, alignment, wrap mode.

use weft_signals::{Signal, TrackedSlotArray};

use crate::types::{Attr, TextAlign, TextWrap};

thread_local! {
    static TEXT_CONTENT: TrackedSlotArray<String> = TrackedSlotArray::new(Some(String::new()));

    /// Attr bits.
    static TEXT_ATTRS: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(0));

    /// TextAlign as u8.
    static TEXT_ALIGN: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(0));

    /// TextWrap as u8 (default Wrap).
    static TEXT_WRAP: TrackedSlotArray<u8> = TrackedSlotArray::new(Some(TextWrap::Wrap as u8));
}

pub fn ensure_capacity(index: usize) {
    TEXT_CONTENT.with(|arr| {
        let _ = arr.peek(index);
    });
    TEXT_ATTRS.with(|arr| {
        let _ = arr.peek(index);
    });
    TEXT_ALIGN.with(|arr| {
        let _ = arr.peek(index);
    });
    TEXT_WRAP.with(|arr| {
        let _ = arr.peek(index);
    });
}

pub fn clear_at_index(index: usize) {
    TEXT_CONTENT.with(|arr| arr.clear(index));
    TEXT_ATTRS.with(|arr| arr.clear(index));
    TEXT_ALIGN.with(|arr| arr.clear(index));
    TEXT_WRAP.with(|arr| arr.clear(index));
}

pub fn reset() {
    TEXT_CONTENT.with(|arr| arr.clear_all());
    TEXT_ATTRS.with(|arr| arr.clear_all());
    TEXT_ALIGN.with(|arr| arr.clear_all());
    TEXT_WRAP.with(|arr| arr.clear_all());
}

// -----------------------------------------------------------------------------
// Content
// -----------------------------------------------------------------------------

pub fn get_text_content(index: usize) -> String {
    TEXT_CONTENT.with(|arr| arr.get(index))
}

pub fn set_text_content(index: usize, content: String) {
    TEXT_CONTENT.with(|arr| arr.set_value(index, content));
}

pub fn set_text_content_getter(index: usize, getter: impl Fn() -> String + 'static) {
    TEXT_CONTENT.with(|arr| arr.set_getter(index, getter));
}

pub fn set_text_content_signal(index: usize, signal: Signal<String>) {
    TEXT_CONTENT.with(|arr| arr.set_signal(index, signal));
}

// -----------------------------------------------------------------------------
// Attributes
// -----------------------------------------------------------------------------

pub fn get_text_attrs(index: usize) -> Attr {
    Attr::from_bits_truncate(TEXT_ATTRS.with(|arr| arr.get(index)))
}

pub fn set_text_attrs(index: usize, attrs: Attr) {
    TEXT_ATTRS.with(|arr| arr.set_value(index, attrs.bits()));
}

pub fn set_text_attrs_getter(index: usize, getter: impl Fn() -> Attr + 'static) {
    TEXT_ATTRS.with(|arr| arr.set_getter(index, move || getter().bits()));
}

// -----------------------------------------------------------------------------
// Alignment
// -----------------------------------------------------------------------------

pub fn get_text_align(index: usize) -> TextAlign {
    TextAlign::from(TEXT_ALIGN.with(|arr| arr.get(index)))
}

pub fn set_text_align(index: usize, align: TextAlign) {
    TEXT_ALIGN.with(|arr| arr.set_value(index, align as u8));
}

pub fn set_text_align_getter(index: usize, getter: impl Fn() -> TextAlign + 'static) {
    TEXT_ALIGN.with(|arr| arr.set_getter(index, move || getter() as u8));
}

// -----------------------------------------------------------------------------
// Wrap mode
// -----------------------------------------------------------------------------

pub fn get_text_wrap(index: usize) -> TextWrap {
    TextWrap::from(TEXT_WRAP.with(|arr| arr.get(index)))
}

pub fn set_text_wrap(index: usize, wrap: TextWrap) {
    TEXT_WRAP.with(|arr| arr.set_value(index, wrap as u8));
}

pub fn set_text_wrap_getter(index: usize, getter: impl Fn() -> TextWrap + 'static) {
    TEXT_WRAP.with(|arr| arr.set_getter(index, move || getter() as u8));
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_signals::signal;

    #[test]
    fn content_roundtrip() {
        reset();
        assert_eq!(get_text_content(0), "");
        set_text_content(0, "hello".into());
        assert_eq!(get_text_content(0), "hello");
    }

    #[test]
    fn content_follows_signal() {
        reset();
        let content = signal("a".to_string());
        set_text_content_signal(1, content.clone());
        assert_eq!(get_text_content(1), "a");
        content.set("b".to_string());
        assert_eq!(get_text_content(1), "b");
    }

    #[test]
    fn attrs_and_modes() {
        reset();
        set_text_attrs(0, Attr::BOLD | Attr::ITALIC);
        assert_eq!(get_text_attrs(0), Attr::BOLD | Attr::ITALIC);

        assert_eq!(get_text_wrap(0), TextWrap::Wrap);
        set_text_wrap(0, TextWrap::Truncate);
        assert_eq!(get_text_wrap(0), TextWrap::Truncate);

        set_text_align(0, TextAlign::Center);
        assert_eq!(get_text_align(0), TextAlign::Center);
    }
}
