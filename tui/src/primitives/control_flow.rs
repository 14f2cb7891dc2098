//! Control flow primitives: show, each, when.
//!
//! All three follow the same shape: an [`EffectScope`] owns an effect that
//! watches a reactive input; branch swaps clean up the previous subtree
//! before building the next one, and stopping the scope (the returned
//! cleanup) guarantees the current subtree is released. Components created
//! inside a branch get the parent that was active when the primitive was
//! called.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

use weft_signals::{effect, effect_scope, on_scope_dispose, signal, Signal};

use super::types::Cleanup;
use crate::engine::{get_current_parent_index, pop_parent_context, push_parent_context};
use crate::error::{self, EngineError};

// =============================================================================
// show
// =============================================================================

/// Render `then_fn` while `condition` is true, the optional `else_fn`
/// otherwise. The previous branch is fully released before the next one is
/// built. Returns a cleanup that releases the active branch.
///
/// # Example
///
/// ```ignore
/// let visible = signal(true);
/// let v = visible.clone();
/// let cleanup = show(
///     move || v.get(),
///     || text(TextProps { content: "on".into(), ..Default::default() }),
///     None::<fn() -> Cleanup>,
/// );
/// ```
pub fn show<ThenF, ElseF, ThenR, ElseR>(
    condition: impl Fn() -> bool + 'static,
    then_fn: ThenF,
    else_fn: Option<ElseF>,
) -> Cleanup
where
    ThenF: Fn() -> ThenR + 'static,
    ElseF: Fn() -> ElseR + 'static,
    ThenR: Into<Cleanup>,
    ElseR: Into<Cleanup>,
{
    let parent_index = get_current_parent_index();
    let active: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let last_state: Rc<Cell<Option<bool>>> = Rc::new(Cell::new(None));
    let scope = effect_scope();

    let active_for_effect = active.clone();
    let active_for_dispose = active.clone();

    scope.run(move || {
        let _stop = effect(move || {
            let state = condition();
            if last_state.get() == Some(state) {
                return;
            }
            last_state.set(Some(state));

            // Old branch released before the new one allocates.
            if let Some(cleanup) = active_for_effect.borrow_mut().take() {
                cleanup();
            }

            if let Some(parent) = parent_index {
                push_parent_context(parent);
            }
            let next = if state {
                Some(then_fn().into())
            } else {
                else_fn.as_ref().map(|f| f().into())
            };
            if parent_index.is_some() {
                pop_parent_context();
            }
            *active_for_effect.borrow_mut() = next;
        });

        on_scope_dispose(move || {
            if let Some(cleanup) = active_for_dispose.borrow_mut().take() {
                cleanup();
            }
        });
    });

    Box::new(move || scope.stop())
}

// =============================================================================
// each
// =============================================================================

/// Render one component per item, tracked by key.
///
/// On list changes: new keys build components, removed keys release theirs,
/// surviving keys only have their per-item signal updated (no rebuild).
/// Duplicate keys are reported and skipped. Returns a cleanup releasing
/// every item.
pub fn each<T, K, RenderF, R>(
    items_getter: impl Fn() -> Vec<T> + 'static,
    render_fn: RenderF,
    key_fn: impl Fn(&T) -> K + 'static,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
    K: Clone + Eq + Hash + std::fmt::Debug + 'static,
    RenderF: Fn(Rc<dyn Fn() -> T>, K) -> R + Clone + 'static,
    R: Into<Cleanup>,
{
    let parent_index = get_current_parent_index();
    let scope = effect_scope();

    let cleanups: Rc<RefCell<HashMap<K, Cleanup>>> = Rc::new(RefCell::new(HashMap::new()));
    let item_signals: Rc<RefCell<HashMap<K, Signal<T>>>> = Rc::new(RefCell::new(HashMap::new()));

    let cleanups_effect = cleanups.clone();
    let signals_effect = item_signals.clone();
    let cleanups_dispose = cleanups.clone();
    let signals_dispose = item_signals.clone();

    scope.run(move || {
        let _stop = effect(move || {
            let items = items_getter();
            let mut seen: HashSet<K> = HashSet::new();

            if let Some(parent) = parent_index {
                push_parent_context(parent);
            }

            for item in &items {
                let key = key_fn(item);
                if !seen.insert(key.clone()) {
                    log::warn!("each(): duplicate key {:?}; item skipped", key);
                    continue;
                }

                let existing = signals_effect.borrow().get(&key).cloned();
                match existing {
                    Some(sig) => {
                        // Surviving key: fine-grained update only.
                        sig.set(item.clone());
                    }
                    None => {
                        let item_signal = signal(item.clone());
                        signals_effect
                            .borrow_mut()
                            .insert(key.clone(), item_signal.clone());
                        let getter: Rc<dyn Fn() -> T> = Rc::new(move || item_signal.get());
                        let cleanup = (render_fn.clone())(getter, key.clone()).into();
                        cleanups_effect.borrow_mut().insert(key, cleanup);
                    }
                }
            }

            if parent_index.is_some() {
                pop_parent_context();
            }

            // Release removed keys.
            let removed: Vec<K> = cleanups_effect
                .borrow()
                .keys()
                .filter(|k| !seen.contains(k))
                .cloned()
                .collect();
            for key in removed {
                if let Some(cleanup) = cleanups_effect.borrow_mut().remove(&key) {
                    cleanup();
                }
                signals_effect.borrow_mut().remove(&key);
            }
        });

        on_scope_dispose(move || {
            let cleanups: Vec<Cleanup> = cleanups_dispose
                .borrow_mut()
                .drain()
                .map(|(_, c)| c)
                .collect();
            for cleanup in cleanups {
                cleanup();
            }
            signals_dispose.borrow_mut().clear();
        });
    });

    Box::new(move || scope.stop())
}

// =============================================================================
// when
// =============================================================================

/// State of an asynchronous source, modeled as a reactive state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncState<T, E> {
    Pending,
    Resolved(T),
    Rejected(E),
}

/// Branch renderers for [`when`].
pub struct WhenOptions<T, E> {
    pub pending: Option<Box<dyn Fn() -> Cleanup>>,
    pub then: Box<dyn Fn(&T) -> Cleanup>,
    pub catch: Option<Box<dyn Fn(&E) -> Cleanup>>,
}

/// Render branches following an async state machine.
///
/// A rejected state without a `catch` branch is reported through the error
/// channel and the pending content stays visible. Returns a cleanup
/// releasing the active branch.
pub fn when<T, E>(
    state_getter: impl Fn() -> AsyncState<T, E> + 'static,
    options: WhenOptions<T, E>,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
    E: Clone + PartialEq + std::fmt::Display + 'static,
{
    let parent_index = get_current_parent_index();
    let active: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let last_state: Rc<RefCell<Option<AsyncState<T, E>>>> = Rc::new(RefCell::new(None));
    let scope = effect_scope();

    let active_for_effect = active.clone();
    let active_for_dispose = active.clone();

    scope.run(move || {
        let _stop = effect(move || {
            let state = state_getter();
            if last_state.borrow().as_ref() == Some(&state) {
                return;
            }

            // Unhandled rejection: report and keep whatever is on screen.
            if let AsyncState::Rejected(error) = &state {
                if options.catch.is_none() {
                    error::report(&EngineError::UnhandledRejection {
                        message: error.to_string(),
                    });
                    *last_state.borrow_mut() = Some(state);
                    return;
                }
            }
            *last_state.borrow_mut() = Some(state.clone());

            if let Some(cleanup) = active_for_effect.borrow_mut().take() {
                cleanup();
            }

            if let Some(parent) = parent_index {
                push_parent_context(parent);
            }
            let next = match &state {
                AsyncState::Pending => options.pending.as_ref().map(|f| f()),
                AsyncState::Resolved(value) => Some((options.then)(value)),
                AsyncState::Rejected(error) => options.catch.as_ref().map(|f| f(error)),
            };
            if parent_index.is_some() {
                pop_parent_context();
            }
            *active_for_effect.borrow_mut() = next;
        });

        on_scope_dispose(move || {
            if let Some(cleanup) = active_for_dispose.borrow_mut().take() {
                cleanup();
            }
        });
    });

    Box::new(move || scope.stop())
}
