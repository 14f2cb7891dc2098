//! Mouse state: the hit grid, handler registries, and dispatch.
//!
//! The hit grid maps screen cells to component indices for O(1) hit tests.
//! Dispatch resolves the component under the pointer, maintains hover state
//! (enter/leave derived from moves), detects clicks (down and up on the same
//! component and button), and falls back to scrolling the nearest scrollable
//! ancestor for unconsumed wheel events.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use weft_signals::{signal, Signal};

use super::keyboard::Modifiers;
use super::{focus, scroll};
use crate::engine::arrays::{core, interaction};

// =============================================================================
// Event types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollInfo {
    pub direction: ScrollDirection,
    pub delta: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
    pub scroll: Option<ScrollInfo>,
    /// Component under the pointer; resolved by dispatch via the hit grid.
    pub component_index: Option<usize>,
}

impl MouseEvent {
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
            scroll: None,
            component_index: None,
        }
    }

    pub fn down(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Down, button, x, y)
    }

    pub fn up(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Up, button, x, y)
    }

    pub fn move_to(x: u16, y: u16) -> Self {
        Self::new(MouseAction::Move, MouseButton::None, x, y)
    }

    pub fn wheel(x: u16, y: u16, direction: ScrollDirection, delta: u16) -> Self {
        Self {
            scroll: Some(ScrollInfo { direction, delta }),
            ..Self::new(MouseAction::Scroll, MouseButton::None, x, y)
        }
    }
}

// =============================================================================
// HitGrid
// =============================================================================

/// Screen-sized grid of topmost component indices (`usize::MAX` = empty).
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<usize>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![usize::MAX; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.resize(width as usize * height as usize, usize::MAX);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.fill(usize::MAX);
    }

    /// Later fills overwrite earlier ones; out-of-range parts are dropped.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, index: usize) {
        for dy in 0..height {
            let row = y + dy;
            if row >= self.height {
                break;
            }
            for dx in 0..width {
                let col = x + dx;
                if col >= self.width {
                    break;
                }
                self.cells[row as usize * self.width as usize + col as usize] = index;
            }
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let value = self.cells[y as usize * self.width as usize + x as usize];
        if value == usize::MAX {
            None
        } else {
            Some(value)
        }
    }
}

thread_local! {
    static HIT_GRID: RefCell<HitGrid> = RefCell::new(HitGrid::new(80, 24));
}

pub fn resize_hit_grid(width: u16, height: u16) {
    HIT_GRID.with(|g| g.borrow_mut().resize(width, height));
}

pub fn clear_hit_grid() {
    HIT_GRID.with(|g| g.borrow_mut().clear());
}

pub fn fill_hit_rect(x: u16, y: u16, width: u16, height: u16, index: usize) {
    HIT_GRID.with(|g| g.borrow_mut().fill_rect(x, y, width, height, index));
}

/// Topmost component at `(x, y)`.
pub fn hit_test(x: u16, y: u16) -> Option<usize> {
    HIT_GRID.with(|g| g.borrow().get(x, y))
}

pub fn hit_grid_size() -> (u16, u16) {
    HIT_GRID.with(|g| {
        let g = g.borrow();
        (g.width(), g.height())
    })
}

// =============================================================================
// Reactive state
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<MouseEvent>> = signal(None);
    static MOUSE_X: Signal<u16> = signal(0);
    static MOUSE_Y: Signal<u16> = signal(0);
    static IS_MOUSE_DOWN: Signal<bool> = signal(false);
    static HOVERED: Signal<Option<usize>> = signal(None);
    static PRESSED: Signal<Option<usize>> = signal(None);
    static PRESSED_BUTTON: Signal<MouseButton> = signal(MouseButton::None);
}

pub fn last_event() -> Option<MouseEvent> {
    LAST_EVENT.with(|s| s.get())
}

pub fn mouse_position() -> (u16, u16) {
    (MOUSE_X.with(|s| s.get()), MOUSE_Y.with(|s| s.get()))
}

pub fn is_mouse_down() -> bool {
    IS_MOUSE_DOWN.with(|s| s.get())
}

pub fn hovered_component() -> Option<usize> {
    HOVERED.with(|s| s.get())
}

// =============================================================================
// Handlers
// =============================================================================

/// Per-component handler set, attached when a primitive declares callbacks.
#[derive(Default)]
pub struct MouseHandlers {
    pub on_mouse_down: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_mouse_up: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_click: Option<Rc<dyn Fn(&MouseEvent) -> bool>>,
    pub on_mouse_enter: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_mouse_leave: Option<Rc<dyn Fn(&MouseEvent)>>,
    pub on_scroll: Option<Rc<dyn Fn(&MouseEvent) -> bool>>,
}

pub type GlobalMouseHandler = Box<dyn Fn(&MouseEvent) -> bool>;

#[derive(Default)]
struct Registry {
    component: HashMap<usize, MouseHandlers>,
    global_down: Vec<(usize, GlobalMouseHandler)>,
    global_up: Vec<(usize, GlobalMouseHandler)>,
    global_click: Vec<(usize, GlobalMouseHandler)>,
    global_scroll: Vec<(usize, GlobalMouseHandler)>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// Attach component handlers. Returns a cleanup closure.
pub fn on_component(index: usize, handlers: MouseHandlers) -> impl FnOnce() {
    REGISTRY.with(|reg| {
        reg.borrow_mut().component.insert(index, handlers);
    });
    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut().component.remove(&index);
        });
    }
}

macro_rules! global_registry {
    ($fn_name:ident, $field:ident) => {
        /// Register a global handler; return true to consume. Returns a
        /// cleanup closure.
        pub fn $fn_name<F>(handler: F) -> impl FnOnce()
        where
            F: Fn(&MouseEvent) -> bool + 'static,
        {
            let id = REGISTRY.with(|reg| {
                let mut reg = reg.borrow_mut();
                let id = reg.next_id;
                reg.next_id += 1;
                reg.$field.push((id, Box::new(handler)));
                id
            });
            move || {
                REGISTRY.with(|reg| {
                    reg.borrow_mut().$field.retain(|(h, _)| *h != id);
                });
            }
        }
    };
}

global_registry!(on_mouse_down, global_down);
global_registry!(on_mouse_up, global_up);
global_registry!(on_click, global_click);
global_registry!(on_scroll, global_scroll);

fn with_component_handlers<R>(index: usize, f: impl FnOnce(&MouseHandlers) -> R) -> Option<R> {
    // Take the set out while user code runs so handlers may register/remove.
    let handlers = REGISTRY.with(|reg| reg.borrow_mut().component.remove(&index))?;
    let result = f(&handlers);
    REGISTRY.with(|reg| {
        reg.borrow_mut().component.entry(index).or_insert(handlers);
    });
    Some(result)
}

#[derive(Clone, Copy)]
enum GlobalKind {
    Down,
    Up,
    Click,
    Scroll,
}

fn run_globals(event: &MouseEvent, kind: GlobalKind) -> bool {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        let list = match kind {
            GlobalKind::Down => &reg.global_down,
            GlobalKind::Up => &reg.global_up,
            GlobalKind::Click => &reg.global_click,
            GlobalKind::Scroll => &reg.global_scroll,
        };
        for (_, handler) in list {
            if handler(event) {
                return true;
            }
        }
        false
    })
}

// =============================================================================
// Dispatch
// =============================================================================

/// Dispatch a raw mouse event. Returns true when a handler consumed it.
pub fn dispatch(mut event: MouseEvent) -> bool {
    event.component_index = hit_test(event.x, event.y);

    LAST_EVENT.with(|s| s.set(Some(event.clone())));
    MOUSE_X.with(|s| s.set(event.x));
    MOUSE_Y.with(|s| s.set(event.y));
    match event.action {
        MouseAction::Down => IS_MOUSE_DOWN.with(|s| s.set(true)),
        MouseAction::Up => IS_MOUSE_DOWN.with(|s| s.set(false)),
        _ => {}
    }

    update_hover(&event);

    match event.action {
        MouseAction::Scroll => dispatch_scroll(&event),
        MouseAction::Down => dispatch_down(&event),
        MouseAction::Up => dispatch_up(&event),
        MouseAction::Move => false,
    }
}

/// Enter/leave are derived from the component under the pointer changing.
fn update_hover(event: &MouseEvent) {
    let previous = HOVERED.with(|s| s.peek());
    let current = event.component_index;
    if previous == current {
        return;
    }

    if let Some(prev) = previous {
        let mut leave_event = event.clone();
        leave_event.component_index = Some(prev);
        with_component_handlers(prev, |h| {
            if let Some(on_leave) = &h.on_mouse_leave {
                on_leave(&leave_event);
            }
        });
        interaction::set_hovered(prev, false);
    }
    if let Some(next) = current {
        with_component_handlers(next, |h| {
            if let Some(on_enter) = &h.on_mouse_enter {
                on_enter(event);
            }
        });
        interaction::set_hovered(next, true);
    }
    HOVERED.with(|s| s.set(current));
}

fn dispatch_scroll(event: &MouseEvent) -> bool {
    // Component handler may consume.
    if let Some(index) = event.component_index {
        let consumed = with_component_handlers(index, |h| {
            h.on_scroll.as_ref().map(|f| f(event)).unwrap_or(false)
        })
        .unwrap_or(false);
        if consumed {
            return true;
        }
    }

    if run_globals(event, GlobalKind::Scroll) {
        return true;
    }

    // Default behavior: scroll the nearest scrollable ancestor.
    if let (Some(index), Some(info)) = (event.component_index, event.scroll) {
        if let Some(target) = scroll::scroll_target(index) {
            let delta = info.delta.max(1) as i32;
            return match info.direction {
                ScrollDirection::Up => scroll::scroll_by(target, -delta),
                ScrollDirection::Down => scroll::scroll_by(target, delta),
                ScrollDirection::Left => scroll::scroll_by_x(target, -delta),
                ScrollDirection::Right => scroll::scroll_by_x(target, delta),
            };
        }
    }
    false
}

fn dispatch_down(event: &MouseEvent) -> bool {
    PRESSED.with(|s| s.set(event.component_index));
    PRESSED_BUTTON.with(|s| s.set(event.button));
    if let Some(index) = event.component_index {
        interaction::set_pressed(index, true);
        with_component_handlers(index, |h| {
            if let Some(on_down) = &h.on_mouse_down {
                on_down(event);
            }
        });
    }
    run_globals(event, GlobalKind::Down)
}

fn dispatch_up(event: &MouseEvent) -> bool {
    let pressed = PRESSED.with(|s| s.peek());
    let pressed_button = PRESSED_BUTTON.with(|s| s.peek());
    if let Some(index) = pressed {
        interaction::set_pressed(index, false);
    }

    if let Some(index) = event.component_index {
        with_component_handlers(index, |h| {
            if let Some(on_up) = &h.on_mouse_up {
                on_up(event);
            }
        });
    }

    let mut consumed = run_globals(event, GlobalKind::Up);

    // Click: press and release on the same component with the same button.
    if pressed.is_some() && pressed == event.component_index && pressed_button == event.button {
        let clicked = event.component_index.expect("pressed is some");

        // Component click bubbles up the parent chain to the first handler.
        let mut click_consumed = false;
        let mut cursor = Some(clicked);
        while let Some(index) = cursor {
            let handled = with_component_handlers(index, |h| {
                h.on_click.as_ref().map(|f| f(event))
            })
            .flatten();
            if let Some(result) = handled {
                click_consumed = result;
                break;
            }
            cursor = weft_signals::untracked(|| core::get_parent_index(index));
        }

        // Click-to-focus runs after the component's own handler, regardless
        // of consumption. Scroll containers are implicitly focusable.
        let focusable = weft_signals::untracked(|| interaction::get_focusable(clicked))
            || scroll::is_scrollable(clicked);
        if focusable {
            focus::focus(clicked);
        }

        if click_consumed || run_globals(event, GlobalKind::Click) {
            consumed = true;
        }
    }

    PRESSED.with(|s| s.set(None));
    PRESSED_BUTTON.with(|s| s.set(MouseButton::None));
    consumed
}

// =============================================================================
// Cleanup
// =============================================================================

/// Drop handlers and pointer state for a released component.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().component.remove(&index);
    });
    if HOVERED.with(|s| s.peek()) == Some(index) {
        HOVERED.with(|s| s.set(None));
    }
    if PRESSED.with(|s| s.peek()) == Some(index) {
        PRESSED.with(|s| s.set(None));
        PRESSED_BUTTON.with(|s| s.set(MouseButton::None));
    }
}

/// Reset every registry, signal and the hit grid (test isolation).
pub fn reset_mouse_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = Registry::default());
    LAST_EVENT.with(|s| s.set(None));
    MOUSE_X.with(|s| s.set(0));
    MOUSE_Y.with(|s| s.set(0));
    IS_MOUSE_DOWN.with(|s| s.set(false));
    HOVERED.with(|s| s.set(None));
    PRESSED.with(|s| s.set(None));
    PRESSED_BUTTON.with(|s| s.set(MouseButton::None));
    HIT_GRID.with(|g| g.borrow_mut().resize(80, 24));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, reset_registry};
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> usize {
        reset_registry();
        reset_mouse_state();
        focus::reset_focus_state();
        scroll::reset_scroll_state();
        let index = allocate_index(None);
        fill_hit_rect(0, 0, 10, 5, index);
        index
    }

    #[test]
    fn hit_grid_roundtrip() {
        let mut grid = HitGrid::new(10, 10);
        assert_eq!(grid.get(5, 5), None);
        grid.fill_rect(2, 2, 4, 4, 42);
        assert_eq!(grid.get(3, 3), Some(42));
        assert_eq!(grid.get(0, 0), None);
        grid.fill_rect(3, 3, 1, 1, 7);
        assert_eq!(grid.get(3, 3), Some(7), "later region wins");
        grid.clear();
        assert_eq!(grid.get(3, 3), None);
    }

    #[test]
    fn hit_grid_resize_clears() {
        let mut grid = HitGrid::new(10, 10);
        grid.fill_rect(0, 0, 5, 5, 1);
        grid.resize(20, 20);
        assert_eq!(grid.get(2, 2), None);
        assert_eq!((grid.width(), grid.height()), (20, 20));
    }

    #[test]
    fn dispatch_resolves_component() {
        let index = setup();
        dispatch(MouseEvent::move_to(3, 3));
        assert_eq!(last_event().unwrap().component_index, Some(index));
        assert_eq!(mouse_position(), (3, 3));
    }

    #[test]
    fn click_requires_down_and_up_on_same_component() {
        let index = setup();
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        let _cleanup = on_component(
            index,
            MouseHandlers {
                on_click: Some(Rc::new(move |_| {
                    c.set(c.get() + 1);
                    false
                })),
                ..Default::default()
            },
        );

        dispatch(MouseEvent::down(MouseButton::Left, 2, 2));
        dispatch(MouseEvent::up(MouseButton::Left, 4, 4));
        assert_eq!(clicks.get(), 1, "down and up on the same component");

        dispatch(MouseEvent::down(MouseButton::Left, 2, 2));
        dispatch(MouseEvent::up(MouseButton::Left, 20, 20));
        assert_eq!(clicks.get(), 1, "release elsewhere is not a click");
    }

    #[test]
    fn enter_and_leave_fire_on_hover_change() {
        let index = setup();
        let entered = Rc::new(Cell::new(0));
        let left = Rc::new(Cell::new(0));
        let (e, l) = (entered.clone(), left.clone());
        let _cleanup = on_component(
            index,
            MouseHandlers {
                on_mouse_enter: Some(Rc::new(move |_| e.set(e.get() + 1))),
                on_mouse_leave: Some(Rc::new(move |_| l.set(l.get() + 1))),
                ..Default::default()
            },
        );

        dispatch(MouseEvent::move_to(1, 1));
        assert_eq!((entered.get(), left.get()), (1, 0));
        dispatch(MouseEvent::move_to(2, 2)); // same component: nothing
        assert_eq!((entered.get(), left.get()), (1, 0));
        dispatch(MouseEvent::move_to(50, 20)); // off the component
        assert_eq!((entered.get(), left.get()), (1, 1));
    }

    #[test]
    fn click_focuses_focusable_after_handler() {
        let index = setup();
        interaction::set_focusable(index, true);

        let was_focused_in_handler = Rc::new(Cell::new(true));
        let w = was_focused_in_handler.clone();
        let _cleanup = on_component(
            index,
            MouseHandlers {
                on_click: Some(Rc::new(move |_| {
                    w.set(focus::has_focus());
                    false
                })),
                ..Default::default()
            },
        );

        dispatch(MouseEvent::down(MouseButton::Left, 1, 1));
        dispatch(MouseEvent::up(MouseButton::Left, 1, 1));

        assert!(focus::is_focused(index));
        assert!(
            !was_focused_in_handler.get(),
            "focus is applied after on_click runs"
        );
    }

    #[test]
    fn consumed_component_scroll_skips_default() {
        let index = setup();
        crate::state::scroll::publish_metrics(&{
            let mut l = crate::layout::ComputedLayout::with_capacity(index + 1);
            l.scrollable[index] = 1;
            l.max_scroll_y[index] = 5;
            l
        });

        let _cleanup = on_component(
            index,
            MouseHandlers {
                on_scroll: Some(Rc::new(|_| true)),
                ..Default::default()
            },
        );

        assert!(dispatch(MouseEvent::wheel(1, 1, ScrollDirection::Down, 1)));
        assert_eq!(interaction::get_scroll_offset_y(index), 0, "default skipped");
    }

    #[test]
    fn unconsumed_scroll_moves_scrollable_ancestor() {
        let index = setup();
        crate::state::scroll::publish_metrics(&{
            let mut l = crate::layout::ComputedLayout::with_capacity(index + 1);
            l.scrollable[index] = 1;
            l.max_scroll_y[index] = 5;
            l
        });

        dispatch(MouseEvent::wheel(1, 1, ScrollDirection::Down, 2));
        assert_eq!(interaction::get_scroll_offset_y(index), 2);
        dispatch(MouseEvent::wheel(1, 1, ScrollDirection::Up, 1));
        assert_eq!(interaction::get_scroll_offset_y(index), 1);
    }
}
