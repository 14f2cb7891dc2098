//! Routing from decoded input events to the state registries.
//!
//! Key events are normalized to the engine's key names and pushed through
//! the keyboard priority chain; mouse events go to the hit-grid dispatcher;
//! paste lands in its own handler list (falling back to the focused
//! component's key handlers one character at a time).

use std::cell::RefCell;

use super::parser::{InputEvent, KeyCode, KeyEvent, KeyPhase, Modifier, MouseInput, MouseInputKind};
use crate::state::keyboard::{self, KeyState, KeyboardEvent, Modifiers};
use crate::state::mouse::{self, MouseAction, MouseButton, MouseEvent, ScrollDirection};

/// Normalized key name for an event (`"a"`, `"Enter"`, `"ArrowUp"`, ...).
pub fn key_name(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Escape => "Escape".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
    }
}

fn convert_modifiers(m: Modifier) -> Modifiers {
    Modifiers {
        ctrl: m.contains(Modifier::CTRL),
        alt: m.contains(Modifier::ALT),
        shift: m.contains(Modifier::SHIFT),
        meta: m.contains(Modifier::META),
    }
}

fn convert_key(event: &KeyEvent) -> KeyboardEvent {
    KeyboardEvent {
        key: key_name(&event.code),
        modifiers: convert_modifiers(event.modifiers),
        state: match event.state {
            KeyPhase::Press => KeyState::Press,
            KeyPhase::Repeat => KeyState::Repeat,
            KeyPhase::Release => KeyState::Release,
        },
        raw: Some(event.raw.clone()),
    }
}

fn convert_mouse(event: &MouseInput) -> MouseEvent {
    let (action, button, scroll) = match event.kind {
        MouseInputKind::Press(b) => (MouseAction::Down, convert_button(b), None),
        MouseInputKind::Release(b) => (MouseAction::Up, convert_button(b), None),
        MouseInputKind::Move => (MouseAction::Move, MouseButton::None, None),
        MouseInputKind::ScrollUp => (
            MouseAction::Scroll,
            MouseButton::None,
            Some((ScrollDirection::Up, 1)),
        ),
        MouseInputKind::ScrollDown => (
            MouseAction::Scroll,
            MouseButton::None,
            Some((ScrollDirection::Down, 1)),
        ),
    };
    let mut out = match scroll {
        Some((direction, delta)) => MouseEvent::wheel(event.x, event.y, direction, delta),
        None => MouseEvent::new(action, button, event.x, event.y),
    };
    out.modifiers = convert_modifiers(event.modifiers);
    out
}

fn convert_button(b: super::parser::MouseButtonCode) -> MouseButton {
    match b {
        super::parser::MouseButtonCode::Left => MouseButton::Left,
        super::parser::MouseButtonCode::Middle => MouseButton::Middle,
        super::parser::MouseButtonCode::Right => MouseButton::Right,
    }
}

// =============================================================================
// Paste handlers
// =============================================================================

thread_local! {
    static PASTE_HANDLERS: RefCell<Vec<(usize, Box<dyn Fn(&str) -> bool>)>> =
        RefCell::new(Vec::new());
    static NEXT_PASTE_ID: RefCell<usize> = const { RefCell::new(0) };
}

/// Subscribe to bracketed-paste text. Returns a cleanup closure.
pub fn on_paste<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&str) -> bool + 'static,
{
    let id = NEXT_PASTE_ID.with(|n| {
        let mut n = n.borrow_mut();
        let id = *n;
        *n += 1;
        id
    });
    PASTE_HANDLERS.with(|h| h.borrow_mut().push((id, Box::new(handler))));
    move || {
        PASTE_HANDLERS.with(|h| h.borrow_mut().retain(|(i, _)| *i != id));
    }
}

fn route_paste(text: &str) {
    let consumed = PASTE_HANDLERS.with(|handlers| {
        let handlers = handlers.borrow();
        for (_, handler) in handlers.iter() {
            if handler(text) {
                return true;
            }
        }
        false
    });
    if !consumed {
        // Fallback: deliver as individual key presses so focused inputs
        // receive the text without a dedicated paste handler.
        for ch in text.chars() {
            keyboard::route_event(KeyboardEvent::new(ch.to_string()));
        }
    }
}

/// Route one decoded event to the appropriate subsystem.
pub fn route(event: InputEvent) {
    match event {
        InputEvent::Key(key) => {
            keyboard::route_event(convert_key(&key));
        }
        InputEvent::Mouse(m) => {
            mouse::dispatch(convert_mouse(&m));
        }
        InputEvent::Paste(text) => route_paste(&text),
        // Terminal focus reports update nothing by default; applications can
        // watch `keyboard::last_event` for key flow instead.
        InputEvent::FocusGained | InputEvent::FocusLost => {}
    }
}

/// Reset the paste registry (test isolation).
pub fn reset_router_state() {
    PASTE_HANDLERS.with(|h| h.borrow_mut().clear());
}
