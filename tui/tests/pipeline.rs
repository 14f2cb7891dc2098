//! End-to-end pipeline scenarios and engine-wide properties.
//!
//! Each test drives the public API only: primitives build the tree, the
//! deriveds compute layout and frames, signals mutate state. Thread-local
//! engine state gives every test (thread) an isolated engine.

use std::cell::Cell;
use std::rc::Rc;

use weft_tui::{
    allocate_index, box_primitive, create_frame_buffer_derived, create_layout_derived,
    get_allocated_indices, on_destroy, release_index, reset_registry, set_render_mode,
    set_terminal_size, show, signal, text, BorderStyle, BoxProps, Cleanup, RenderMode, Rgba,
    TextProps,
};

fn setup(mode: RenderMode, width: u16, height: u16) {
    reset_registry();
    weft_tui::state::mouse::reset_mouse_state();
    weft_tui::state::keyboard::reset_keyboard_state();
    weft_tui::state::focus::reset_focus_state();
    weft_tui::state::scroll::reset_scroll_state();
    set_render_mode(mode);
    set_terminal_size(width, height);
}

// =============================================================================
// S1: box + text in inline mode
// =============================================================================

#[test]
fn s1_bordered_box_with_text_inline() {
    setup(RenderMode::Inline, 40, 24);

    let _cleanup = box_primitive(BoxProps {
        width: Some(10u16.into()),
        height: Some(3u16.into()),
        border: Some(BorderStyle::Single.into()),
        children: Some(Box::new(|| {
            let _text = text(TextProps {
                content: "Hi".into(),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let layout = create_layout_derived();
    let computed = layout.get();
    assert_eq!(computed.rect(0), (0, 0, 10, 3), "root fills its box");
    assert_eq!(computed.rect(1), (1, 1, 8, 1), "text sits inside the border");

    let fb = create_frame_buffer_derived(layout);
    let result = fb.get();
    assert_eq!(result.buffer.height(), 3, "inline frames are content-height");

    assert_eq!(result.hit_regions.len(), 2);
    let root_hit = &result.hit_regions[0];
    assert_eq!(
        (root_hit.x, root_hit.y, root_hit.width, root_hit.height, root_hit.component_index),
        (0, 0, 10, 3, 0)
    );
    let text_hit = &result.hit_regions[1];
    assert_eq!(
        (text_hit.x, text_hit.y, text_hit.width, text_hit.height, text_hit.component_index),
        (1, 1, 8, 1, 1)
    );

    assert_eq!(result.buffer.get(0, 0).unwrap().char, '┌' as u32);
    assert_eq!(result.buffer.get(1, 1).unwrap().char, 'H' as u32);
}

// =============================================================================
// S2: justify space-between
// =============================================================================

#[test]
fn s2_flex_row_space_between() {
    setup(RenderMode::Fullscreen, 80, 24);

    let _cleanup = box_primitive(BoxProps {
        width: Some(20u16.into()),
        height: Some(1u16.into()),
        flex_direction: Some(1u8.into()),
        justify_content: Some(3u8.into()),
        children: Some(Box::new(|| {
            for _ in 0..3 {
                let _child = box_primitive(BoxProps {
                    width: Some(4u16.into()),
                    height: Some(1u16.into()),
                    ..Default::default()
                });
            }
        })),
        ..Default::default()
    });

    let layout = create_layout_derived();
    let computed = layout.get();
    assert_eq!([computed.x[1], computed.x[2], computed.x[3]], [0, 8, 16]);
    assert_eq!([computed.y[1], computed.y[2], computed.y[3]], [0, 0, 0]);
    assert!([1, 2, 3].iter().all(|&i| computed.width[i] == 4));
}

// =============================================================================
// S3: flex grow
// =============================================================================

#[test]
fn s3_flex_grow_fills_line() {
    setup(RenderMode::Fullscreen, 80, 24);

    let _cleanup = box_primitive(BoxProps {
        width: Some(30u16.into()),
        height: Some(1u16.into()),
        flex_direction: Some(1u8.into()),
        children: Some(Box::new(|| {
            for grow in [1.0f32, 2.0, 1.0] {
                let _child = box_primitive(BoxProps {
                    grow: Some(grow.into()),
                    height: Some(1u16.into()),
                    ..Default::default()
                });
            }
        })),
        ..Default::default()
    });

    let computed = create_layout_derived().get();
    let widths = [computed.width[1], computed.width[2], computed.width[3]];
    assert_eq!(widths.iter().sum::<u16>(), 30, "grow must consume the line");
    // 1:2:1 within a cell, residue on the last item.
    assert_eq!(widths, [7, 15, 8]);
}

// =============================================================================
// S4: text wrap re-measurement
// =============================================================================

#[test]
fn s4_text_height_remeasured_after_width_known() {
    setup(RenderMode::Inline, 40, 24);

    let _cleanup = box_primitive(BoxProps {
        width: Some(10u16.into()),
        children: Some(Box::new(|| {
            let _text = text(TextProps {
                content: "hello world foo".into(),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let computed = create_layout_derived().get();
    assert_eq!(computed.width[1], 10);
    assert_eq!(computed.height[1], 2, "wraps into two lines at width 10");
    assert_eq!(
        computed.height[0], 2,
        "intrinsic parent height follows the wrapped text"
    );
}

// =============================================================================
// S5: scroll detection
// =============================================================================

#[test]
fn s5_overflow_scroll_ranges() {
    setup(RenderMode::Fullscreen, 80, 24);

    let _cleanup = box_primitive(BoxProps {
        width: Some(10u16.into()),
        height: Some(5u16.into()),
        overflow: Some(2u8.into()),
        children: Some(Box::new(|| {
            for i in 0..12 {
                let _row = text(TextProps {
                    content: format!("row {i}").into(),
                    height: Some(1u16.into()),
                    ..Default::default()
                });
            }
        })),
        ..Default::default()
    });

    let computed = create_layout_derived().get();
    assert_eq!(computed.scrollable[0], 1);
    assert_eq!(computed.max_scroll_y[0], 7, "12 rows in a 5-row viewport");
    assert_eq!(computed.max_scroll_x[0], 0);
}

// =============================================================================
// S6: show branch swap cleans up
// =============================================================================

#[test]
fn s6_show_swap_releases_subtree_and_fires_destroy_once() {
    setup(RenderMode::Fullscreen, 80, 24);

    let destroys = Rc::new(Cell::new(0));
    let visible = signal(true);

    let v = visible.clone();
    let d = destroys.clone();
    let _cleanup = show(
        move || v.get(),
        move || {
            let d = d.clone();
            box_primitive(BoxProps {
                children: Some(Box::new(move || {
                    let d = d.clone();
                    on_destroy(move || d.set(d.get() + 1));
                    let _label = text(TextProps {
                        content: "branch".into(),
                        ..Default::default()
                    });
                })),
                ..Default::default()
            })
        },
        None::<fn() -> Cleanup>,
    );

    assert_eq!(get_allocated_indices().len(), 2, "box plus text");
    assert_eq!(destroys.get(), 0);

    visible.set(false);
    assert_eq!(get_allocated_indices().len(), 0, "branch fully released");
    assert_eq!(destroys.get(), 1, "destroy callback fired exactly once");

    visible.set(true);
    assert_eq!(get_allocated_indices().len(), 2, "branch rebuilt");
    assert_eq!(destroys.get(), 1);

    visible.set(false);
    assert_eq!(destroys.get(), 2, "once per branch exit");
}

// =============================================================================
// Universal properties
// =============================================================================

#[test]
fn parent_traversal_terminates_for_live_indices() {
    setup(RenderMode::Fullscreen, 80, 24);

    let _cleanup = box_primitive(BoxProps {
        children: Some(Box::new(|| {
            let _a = box_primitive(BoxProps {
                children: Some(Box::new(|| {
                    let _b = box_primitive(BoxProps::default());
                })),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let live = get_allocated_indices();
    let bound = live.len();
    for &start in &live {
        let mut steps = 0;
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            cursor = weft_tui::engine::arrays::core::peek_parent_index(i);
            steps += 1;
            assert!(steps <= bound, "parent chain must terminate within n steps");
        }
    }
}

#[test]
fn idempotent_allocation_by_id() {
    setup(RenderMode::Fullscreen, 80, 24);
    let first = allocate_index(Some("status-bar"));
    let second = allocate_index(Some("status-bar"));
    assert_eq!(first, second);
    release_index(first);
}

#[test]
fn release_removes_all_descendants() {
    setup(RenderMode::Fullscreen, 80, 24);

    let cleanup = box_primitive(BoxProps {
        children: Some(Box::new(|| {
            for _ in 0..3 {
                let _child = box_primitive(BoxProps {
                    children: Some(Box::new(|| {
                        let _leaf = text(TextProps {
                            content: "leaf".into(),
                            ..Default::default()
                        });
                    })),
                    ..Default::default()
                });
            }
        })),
        ..Default::default()
    });

    assert_eq!(get_allocated_indices().len(), 7);
    cleanup();
    assert!(get_allocated_indices().is_empty());
}

#[test]
fn empty_reset_reuses_index_zero() {
    setup(RenderMode::Fullscreen, 80, 24);

    for _ in 0..3 {
        let cleanup = box_primitive(BoxProps {
            children: Some(Box::new(|| {
                let _a = box_primitive(BoxProps::default());
                let _b = text(TextProps {
                    content: "x".into(),
                    ..Default::default()
                });
            })),
            ..Default::default()
        });
        cleanup();
        assert!(get_allocated_indices().is_empty());
        // After the empty-reset the next tree starts again at index 0.
        let probe = allocate_index(None);
        assert_eq!(probe, 0);
        release_index(probe);
    }
}

#[test]
fn layout_is_cached_between_identical_reads() {
    setup(RenderMode::Fullscreen, 80, 24);

    // A content getter doubles as a recompute counter: the solver reads
    // text content during measurement, so each full pass bumps it.
    let reads = Rc::new(Cell::new(0));
    let r = reads.clone();
    let _cleanup = box_primitive(BoxProps {
        width: Some(20u16.into()),
        children: Some(Box::new(move || {
            let r = r.clone();
            let _t = text(TextProps {
                content: weft_tui::PropValue::Getter(Rc::new(move || {
                    r.set(r.get() + 1);
                    "counted".to_string()
                })),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let layout = create_layout_derived();
    let _ = layout.get();
    let after_first = reads.get();
    assert!(after_first > 0);

    let _ = layout.get();
    let _ = layout.get();
    assert_eq!(reads.get(), after_first, "no recompute without input changes");

    set_terminal_size(81, 24);
    let _ = layout.get();
    assert!(reads.get() > after_first, "resize invalidates the layout");
}

#[test]
fn framebuffer_is_pure_between_identical_reads() {
    setup(RenderMode::Fullscreen, 60, 20);

    let _cleanup = box_primitive(BoxProps {
        width: Some(12u16.into()),
        height: Some(4u16.into()),
        bg: Some(Rgba::BLUE.into()),
        border: Some(BorderStyle::Rounded.into()),
        children: Some(Box::new(|| {
            let _t = text(TextProps {
                content: "pure".into(),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let fb = create_frame_buffer_derived(create_layout_derived());
    let a = fb.get();
    let b = fb.get();
    assert_eq!(a, b, "value-equal buffers and hit regions");
}

#[test]
fn reactive_update_changes_exactly_the_text() {
    setup(RenderMode::Fullscreen, 40, 10);

    let label = signal("aa".to_string());
    let l = label.clone();
    let _cleanup = box_primitive(BoxProps {
        width: Some(10u16.into()),
        height: Some(1u16.into()),
        children: Some(Box::new(move || {
            let l = l.clone();
            let _t = text(TextProps {
                content: weft_tui::PropValue::Signal(l),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let fb = create_frame_buffer_derived(create_layout_derived());
    let before = fb.get();
    assert_eq!(before.buffer.get(0, 0).unwrap().char, 'a' as u32);

    label.set("zz".to_string());
    let after = fb.get();
    assert_eq!(after.buffer.get(0, 0).unwrap().char, 'z' as u32);
    assert_eq!(after.buffer.get(1, 0).unwrap().char, 'z' as u32);
}

#[test]
fn no_leaks_across_create_release_cycles() {
    setup(RenderMode::Fullscreen, 80, 24);

    for _cycle in 0..50 {
        let cleanup = box_primitive(BoxProps {
            children: Some(Box::new(|| {
                for i in 0..20 {
                    let _row = text(TextProps {
                        content: format!("row {i}").into(),
                        ..Default::default()
                    });
                }
            })),
            ..Default::default()
        });
        assert_eq!(get_allocated_indices().len(), 21);
        cleanup();
        assert!(get_allocated_indices().is_empty());
    }

    // The empty-reset keeps indices dense across cycles.
    let probe = allocate_index(None);
    assert_eq!(probe, 0);
    release_index(probe);
}

#[test]
fn deep_tree_release_does_not_recurse() {
    setup(RenderMode::Fullscreen, 80, 24);

    // 600 nested levels: an iterative release must handle this without
    // blowing the call stack.
    fn nest(depth: u32) -> Cleanup {
        box_primitive(BoxProps {
            children: if depth == 0 {
                None
            } else {
                Some(Box::new(move || {
                    let _inner = nest(depth - 1);
                }))
            },
            ..Default::default()
        })
    }

    let cleanup = nest(600);
    assert_eq!(get_allocated_indices().len(), 601);
    cleanup();
    assert!(get_allocated_indices().is_empty());
}

#[test]
fn event_consumption_stops_the_chain() {
    setup(RenderMode::Fullscreen, 80, 24);

    use weft_tui::state::keyboard;

    let order: Rc<std::cell::RefCell<Vec<&'static str>>> =
        Rc::new(std::cell::RefCell::new(Vec::new()));

    let o = order.clone();
    let _key = keyboard::on_key("Enter", move || {
        o.borrow_mut().push("key");
        true
    });
    let o = order.clone();
    let _global = keyboard::on(move |_| {
        o.borrow_mut().push("global");
        false
    });

    keyboard::route_event(weft_tui::KeyboardEvent::new("Enter"));
    assert_eq!(*order.borrow(), vec!["key"], "consumed before global");

    keyboard::route_event(weft_tui::KeyboardEvent::new("x"));
    assert_eq!(*order.borrow(), vec!["key", "global"]);
}

#[test]
fn hit_grid_resolves_topmost_component() {
    setup(RenderMode::Fullscreen, 40, 10);

    let _cleanup = box_primitive(BoxProps {
        width: Some(20u16.into()),
        height: Some(5u16.into()),
        children: Some(Box::new(|| {
            let _inner = box_primitive(BoxProps {
                width: Some(5u16.into()),
                height: Some(2u16.into()),
                ..Default::default()
            });
        })),
        ..Default::default()
    });

    let fb = create_frame_buffer_derived(create_layout_derived());
    let result = fb.get();

    // Apply regions the way the render effect does.
    weft_tui::state::mouse::resize_hit_grid(40, 10);
    for region in &result.hit_regions {
        weft_tui::state::mouse::fill_hit_rect(
            region.x,
            region.y,
            region.width,
            region.height,
            region.component_index,
        );
    }

    // Children emitted after parents overwrite in the grid.
    assert_eq!(weft_tui::state::mouse::hit_test(2, 1), Some(1));
    assert_eq!(weft_tui::state::mouse::hit_test(10, 4), Some(0));
    assert_eq!(weft_tui::state::mouse::hit_test(30, 9), None);
}
