//! Mount: application lifecycle and the single render effect.
//!
//! `mount` builds the root component tree, wires the reactive pipeline
//! (layout derived → frame-buffer derived → render effect), acquires the
//! terminal (raw mode, protocols, alternate screen in fullscreen), and
//! returns a handle whose `cleanup` releases everything on any exit path.
//!
//! The render effect is the only writer of stdout and the only mutator of
//! the hit grid; everything it consumes arrives as data from the deriveds.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use weft_signals::{batch, effect, untracked};

use super::frame_buffer_derived::{create_frame_buffer_derived, paint_subtree, FrameBufferResult};
use super::layout_derived::create_layout_derived;
use super::terminal::{detect_terminal_size, set_render_mode, terminal_width, RenderMode};
use crate::engine::get_allocated_indices;
use crate::engine::arrays::core;
use crate::error::{self, EngineError};
use crate::input::RawModeGuard;
use crate::layout::compute_layout;
use crate::primitives::Cleanup;
use crate::renderer::{ansi, AppendRenderer, DiffRenderer, InlineRenderer, OutputBuffer};
use crate::state::{mouse, scroll};

// =============================================================================
// Options
// =============================================================================

/// Terminal acquisition and rendering options for [`mount`].
pub struct MountOptions {
    pub mode: RenderMode,
    /// Mouse tracking. Leave off in append mode so native selection works.
    pub mouse: bool,
    /// Kitty keyboard protocol opt-in.
    pub kitty_keyboard: bool,
    pub bracketed_paste: bool,
    pub focus_reporting: bool,
    /// Append mode: rows `[0, get_static_height())` are committed to
    /// scrollback once and never rewritten.
    pub get_static_height: Option<Rc<dyn Fn() -> u16>>,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Fullscreen,
            mouse: true,
            kitty_keyboard: false,
            bracketed_paste: true,
            focus_reporting: false,
            get_static_height: None,
        }
    }
}

impl MountOptions {
    pub fn fullscreen() -> Self {
        Self::default()
    }

    pub fn inline() -> Self {
        Self {
            mode: RenderMode::Inline,
            mouse: false,
            ..Self::default()
        }
    }

    pub fn append() -> Self {
        Self {
            mode: RenderMode::Append,
            mouse: false,
            ..Self::default()
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

enum ActiveRenderer {
    Fullscreen(Rc<RefCell<DiffRenderer>>),
    Inline(Rc<RefCell<InlineRenderer>>),
    Append(Rc<RefCell<AppendRenderer>>),
}

/// Handle returned by [`mount`]; dropping it (or calling
/// [`cleanup`](Self::cleanup)) stops the render effect, releases the
/// component tree and restores the terminal.
pub struct MountHandle {
    stop_effect: Option<Box<dyn FnOnce()>>,
    root_cleanup: Option<Cleanup>,
    renderer: Option<ActiveRenderer>,
    raw_mode: Option<RawModeGuard>,
    options_teardown: TeardownFlags,
}

#[derive(Clone, Copy, Default)]
struct TeardownFlags {
    mouse: bool,
    kitty_keyboard: bool,
    bracketed_paste: bool,
    focus_reporting: bool,
}

impl MountHandle {
    /// Unmount: stop rendering, release the tree, restore the terminal.
    pub fn cleanup(mut self) {
        self.do_cleanup();
    }

    /// Append mode only: synchronously render a sub-tree into scrollback.
    ///
    /// The closure builds components (they become temporary roots), the
    /// sub-frame is committed above the reactive region, and the components
    /// are released again.
    pub fn render_to_history(&self, build: impl FnOnce() -> Cleanup) {
        let Some(ActiveRenderer::Append(renderer)) = &self.renderer else {
            log::warn!("render_to_history is only available in append mode");
            return;
        };

        batch(|| {
            let existing_roots: Vec<usize> = untracked(|| {
                get_allocated_indices()
                    .into_iter()
                    .filter(|&i| core::peek_parent_index(i).is_none())
                    .collect()
            });

            let sub_cleanup = build();

            let new_roots: Vec<usize> = untracked(|| {
                get_allocated_indices()
                    .into_iter()
                    .filter(|&i| {
                        core::peek_parent_index(i).is_none() && !existing_roots.contains(&i)
                    })
                    .collect()
            });

            if !new_roots.is_empty() {
                let width = untracked(terminal_width);
                let layout = untracked(|| compute_layout(width, u16::MAX, false));
                let frame = untracked(|| paint_subtree(&layout, &new_roots, width));
                if let Err(e) = renderer.borrow_mut().append_history_frame(&frame) {
                    error::report(&EngineError::RenderWrite(e));
                }
            }

            sub_cleanup();
        });
        // The batch end flushes the render effect, repainting the active
        // region below the new history lines.
    }

    fn do_cleanup(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        if let Some(root) = self.root_cleanup.take() {
            root();
        }

        // Reverse the protocol enables, then leave the screen mode.
        let mut out = OutputBuffer::new();
        let flags = self.options_teardown;
        if flags.mouse {
            let _ = ansi::disable_mouse(&mut out);
        }
        if flags.kitty_keyboard {
            let _ = ansi::disable_kitty_keyboard(&mut out);
        }
        if flags.bracketed_paste {
            let _ = ansi::disable_bracketed_paste(&mut out);
        }
        if flags.focus_reporting {
            let _ = ansi::disable_focus_reporting(&mut out);
        }
        let _ = out.flush_to(&mut io::stdout());

        match self.renderer.take() {
            Some(ActiveRenderer::Fullscreen(renderer)) => {
                if let Err(e) = renderer.borrow_mut().exit_fullscreen() {
                    error::report(&EngineError::RenderWrite(e));
                }
            }
            Some(ActiveRenderer::Inline(_)) | Some(ActiveRenderer::Append(_)) | None => {}
        }

        if let Some(mut guard) = self.raw_mode.take() {
            let _ = guard.disable();
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.do_cleanup();
    }
}

// =============================================================================
// Mount
// =============================================================================

/// Mount an application: build the tree from `root`, start the pipeline,
/// acquire the terminal per `options`.
pub fn mount(root: impl FnOnce() -> Cleanup, options: MountOptions) -> io::Result<MountHandle> {
    set_render_mode(options.mode);
    detect_terminal_size();

    // Raw mode is best-effort: a pipe or test harness has no tty.
    let raw_mode = match RawModeGuard::enable() {
        Ok(guard) => Some(guard),
        Err(e) => {
            log::warn!("raw mode unavailable: {e}");
            None
        }
    };

    // Protocol enables, mirrored by teardown.
    let mut out = OutputBuffer::new();
    let flags = TeardownFlags {
        mouse: options.mouse,
        kitty_keyboard: options.kitty_keyboard,
        bracketed_paste: options.bracketed_paste,
        focus_reporting: options.focus_reporting,
    };
    if flags.mouse {
        ansi::enable_mouse(&mut out)?;
    }
    if flags.kitty_keyboard {
        ansi::enable_kitty_keyboard(&mut out)?;
    }
    if flags.bracketed_paste {
        ansi::enable_bracketed_paste(&mut out)?;
    }
    if flags.focus_reporting {
        ansi::enable_focus_reporting(&mut out)?;
    }
    out.flush_to(&mut io::stdout())?;

    // Build the tree before the first frame.
    let root_cleanup = batch(root);

    let layout_derived = create_layout_derived();
    let fb_derived = create_frame_buffer_derived(layout_derived.clone());

    // Seed the hit grid at the current size.
    {
        let (tw, th) = untracked(|| fb_derived.get()).terminal_size;
        mouse::resize_hit_grid(tw, th);
    }

    let get_static_height = options.get_static_height.clone();
    let mut last_size = mouse::hit_grid_size();
    let mut write_error_reported = false;

    let (renderer, stop): (ActiveRenderer, Box<dyn FnOnce()>) = match options.mode {
        RenderMode::Fullscreen => {
            let renderer = Rc::new(RefCell::new(DiffRenderer::new()));
            renderer.borrow_mut().enter_fullscreen()?;

            let r = renderer.clone();
            let stop = effect(move || {
                let result = fb_derived.get();
                let layout = layout_derived.get();
                scroll::publish_metrics(&layout);
                apply_hit_regions(&result, &mut last_size, || {
                    r.borrow_mut().invalidate();
                });
                let outcome = r.borrow_mut().render(&result.buffer).map(|_| ());
                note_write_outcome(outcome, &mut write_error_reported);
            });
            (ActiveRenderer::Fullscreen(renderer), Box::new(stop))
        }
        RenderMode::Inline => {
            let renderer = Rc::new(RefCell::new(InlineRenderer::new()));
            let r = renderer.clone();
            let stop = effect(move || {
                let result = fb_derived.get();
                let layout = layout_derived.get();
                scroll::publish_metrics(&layout);
                apply_hit_regions(&result, &mut last_size, || {});
                let outcome = r.borrow_mut().render(&result.buffer);
                note_write_outcome(outcome, &mut write_error_reported);
            });
            (ActiveRenderer::Inline(renderer), Box::new(stop))
        }
        RenderMode::Append => {
            let renderer = Rc::new(RefCell::new(AppendRenderer::new()));
            let r = renderer.clone();
            let stop = effect(move || {
                let result = fb_derived.get();
                let layout = layout_derived.get();
                scroll::publish_metrics(&layout);
                apply_hit_regions(&result, &mut last_size, || {});
                let static_height = get_static_height.as_ref().map(|f| f()).unwrap_or(0);
                let outcome = r.borrow_mut().render(&result.buffer, static_height);
                note_write_outcome(outcome, &mut write_error_reported);
            });
            (ActiveRenderer::Append(renderer), Box::new(stop))
        }
    };

    Ok(MountHandle {
        stop_effect: Some(stop),
        root_cleanup: Some(root_cleanup),
        renderer: Some(renderer),
        raw_mode,
        options_teardown: flags,
    })
}

/// Resize/clear the hit grid and write this frame's regions into it.
fn apply_hit_regions(
    result: &FrameBufferResult,
    last_size: &mut (u16, u16),
    on_resize: impl FnOnce(),
) {
    let size = result.terminal_size;
    if *last_size != size {
        mouse::resize_hit_grid(size.0, size.1);
        *last_size = size;
        on_resize();
    } else {
        mouse::clear_hit_grid();
    }
    for region in &result.hit_regions {
        mouse::fill_hit_rect(
            region.x,
            region.y,
            region.width,
            region.height,
            region.component_index,
        );
    }
}

/// Report the first write failure, reset on recovery; the effect simply
/// retries on the next frame either way.
fn note_write_outcome(outcome: io::Result<()>, reported: &mut bool) {
    match outcome {
        Ok(()) => *reported = false,
        Err(e) => {
            if !*reported {
                *reported = true;
                error::report(&EngineError::RenderWrite(e));
            }
        }
    }
}

/// Re-read the terminal size into the signals; in fullscreen the diff
/// renderer is invalidated by the size change on the next frame.
pub fn handle_resize() {
    detect_terminal_size();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_allocated_count, reset_registry};
    use crate::pipeline::terminal::set_terminal_size;
    use crate::primitives::{box_primitive, BoxProps};

    #[test]
    fn mount_inline_builds_and_cleans_up() {
        reset_registry();
        crate::state::mouse::reset_mouse_state();
        set_terminal_size(40, 10);

        let handle = mount(
            || {
                box_primitive(BoxProps {
                    width: Some(10u16.into()),
                    height: Some(2u16.into()),
                    ..Default::default()
                })
            },
            MountOptions {
                bracketed_paste: false,
                ..MountOptions::inline()
            },
        )
        .unwrap();

        assert_eq!(get_allocated_count(), 1);
        handle.cleanup();
        assert_eq!(get_allocated_count(), 0);
    }
}
