use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use sampmap_shared::{Business, ClickOutcome, ClickTarget, DisplayPoint, DragKind, MapConfig, MapSession};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlImageElement, MouseEvent, PointerEvent, WheelEvent};

use crate::images::BusinessIcon;
use crate::render::{HANDLE_RADIUS, Scene, draw_scene, icon_at, marker_pin_at};
use crate::render_loop::FrameScheduler;
use crate::viewport::Viewport;

/// Pointer travel (CSS px) after which a press counts as a drag, not a click.
const CLICK_SLOP: f64 = 5.0;

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn bind_resize(on_resize: impl Fn() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };

    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old._handler.as_ref().unchecked_ref());
        }
    });

    let handler = Closure::<dyn Fn()>::new(on_resize);
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

/// Map surface: background image, business icons, ruler overlay and marker pin on one
/// Canvas 2D layer. Pointer input is routed into the shared [`MapSession`].
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let session: RwSignal<MapSession> = expect_context();
    let map_config: RwSignal<Option<MapConfig>> = expect_context();
    let businesses: RwSignal<Vec<Business>> = expect_context();
    let map_image: RwSignal<Option<HtmlImageElement>> = expect_context();
    let icons: RwSignal<Vec<BusinessIcon>> = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let pressed = Rc::new(Cell::new(false));
    let panning = Rc::new(Cell::new(false));
    let moved = Rc::new(Cell::new(false));
    let dragged = Rc::new(Cell::new(false));
    let down_x = Rc::new(Cell::new(0.0f64));
    let down_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));
    // Display-space offset from the pointer to the marker anchor while dragging the pin.
    let grab_offset = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let fitted = Rc::new(Cell::new(false));

    let scheduler = Rc::new(FrameScheduler::new({
        let fitted = fitted.clone();
        move || {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let width = canvas.client_width() as f64;
            let height = canvas.client_height() as f64;
            if width <= 0.0 || height <= 0.0 {
                return;
            }
            let dpr = device_pixel_ratio();
            let px_w = (width * dpr).round() as u32;
            let px_h = (height * dpr).round() as u32;
            if canvas.width() != px_w || canvas.height() != px_h {
                canvas.set_width(px_w);
                canvas.set_height(px_h);
            }

            // A resize may leave the view outside the pan bounds.
            viewport.maybe_update(|vp| vp.set_canvas_size(width, height));

            if !fitted.get()
                && let Some(config) = map_config.get_untracked()
            {
                fitted.set(true);
                let restored = session.with_untracked(|s| {
                    s.marker()
                        .current()
                        .filter(|m| !m.draggable)
                        .map(|m| (m.position, m.link.zoom))
                });
                viewport.update_untracked(|vp| match restored {
                    Some((at, zoom)) => vp.center_on(at, zoom, width, height),
                    None => vp.fit_map(config.map_size, width, height),
                });
            }

            let Some(ctx) = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into::<web_sys::CanvasRenderingContext2d>().ok())
            else {
                return;
            };

            viewport.with_untracked(|vp| {
                session.with_untracked(|s| {
                    businesses.with_untracked(|list| {
                        icons.with_untracked(|icons| {
                            map_image.with_untracked(|image| {
                                let scene = Scene {
                                    vp,
                                    session: s,
                                    businesses: list,
                                    map_image: image.as_ref(),
                                    icons,
                                    width,
                                    height,
                                };
                                draw_scene(&ctx, &scene, dpr);
                            });
                        });
                    });
                });
            });
        }
    }));

    // Redraw whenever anything visible changes.
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            viewport.track();
            session.track();
            map_config.track();
            businesses.track();
            map_image.track();
            icons.track();
            scheduler.request();
        }
    });

    // Keep the canvas backing store in step with the window size.
    bind_resize({
        let scheduler = scheduler.clone();
        move || scheduler.request()
    });

    let local_point = move |client_x: f64, client_y: f64| -> (f64, f64) {
        canvas_ref
            .get_untracked()
            .map(|el| {
                let rect = el.get_bounding_client_rect();
                (client_x - rect.left(), client_y - rect.top())
            })
            .unwrap_or((client_x, client_y))
    };

    let on_pointer_down = {
        let pressed = pressed.clone();
        let panning = panning.clone();
        let moved = moved.clone();
        let dragged = dragged.clone();
        let down_x = down_x.clone();
        let down_y = down_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let grab_offset = grab_offset.clone();
        move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            let (cx, cy) = (e.client_x() as f64, e.client_y() as f64);
            pressed.set(true);
            moved.set(false);
            dragged.set(false);
            down_x.set(cx);
            down_y.set(cy);
            last_x.set(cx);
            last_y.set(cy);

            let (sx, sy) = local_point(cx, cy);
            let vp = viewport.get_untracked();
            let mut p = vp.screen_to_display(sx, sy);
            let radius = HANDLE_RADIUS / vp.scale;

            // The pin head sits above its anchor; grab the anchor and remember the offset.
            let on_pin = session.with_untracked(|s| marker_pin_at(&vp, s, sx, sy));
            grab_offset.set((0.0, 0.0));
            if on_pin
                && let Some(anchor) = session.with_untracked(|s| s.marker().current().map(|m| m.position))
            {
                grab_offset.set((anchor.row - p.row, anchor.col - p.col));
                p = anchor;
            }

            // Ruler segments are not draggable on touch screens.
            let touch = e.pointer_type() == "touch";
            let skip = touch && session.with_untracked(|s| s.ruler().is_finished());
            if !skip {
                session.maybe_update(|s| s.pointer_down(p, radius));
            }
            let captured = session.with_untracked(|s| s.drag().is_some());
            panning.set(!captured);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                if !captured {
                    el.style().set_property("cursor", "grabbing").ok();
                }
            }
        }
    };

    let on_pointer_move = {
        let pressed = pressed.clone();
        let panning = panning.clone();
        let moved = moved.clone();
        let down_x = down_x.clone();
        let down_y = down_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let grab_offset = grab_offset.clone();
        move |e: PointerEvent| {
            let (cx, cy) = (e.client_x() as f64, e.client_y() as f64);
            if pressed.get()
                && ((cx - down_x.get()).abs() > CLICK_SLOP || (cy - down_y.get()).abs() > CLICK_SLOP)
            {
                moved.set(true);
            }

            if panning.get() && !session.with_untracked(|s| s.pan_locked()) {
                let dx = cx - last_x.get();
                let dy = cy - last_y.get();
                last_x.set(cx);
                last_y.set(cy);
                viewport.update(|vp| vp.pan(dx, dy));
                return;
            }
            last_x.set(cx);
            last_y.set(cy);

            // A drag whose release never arrived must not follow a free pointer.
            if !pressed.get() && session.with_untracked(|s| s.drag().is_some()) {
                let zoom = viewport.with_untracked(|vp| vp.zoom_level());
                session.maybe_update(|s| s.pointer_up(zoom));
            }

            let (sx, sy) = local_point(cx, cy);
            let p = viewport.with_untracked(|vp| vp.screen_to_display(sx, sy));
            let p = match session.with_untracked(|s| s.drag()) {
                Some(DragKind::Marker) => {
                    let (d_row, d_col) = grab_offset.get();
                    p.offset(d_row, d_col)
                }
                _ => p,
            };
            session.maybe_update(|s| s.pointer_move(p));

            if !pressed.get()
                && let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                let cursor = hover_cursor(&viewport.get_untracked(), &session, p, sx, sy);
                el.style().set_property("cursor", cursor).ok();
            }
        }
    };

    // Ends the press whether the pointer was released, cancelled or left the canvas.
    let end_gesture = {
        let pressed = pressed.clone();
        let panning = panning.clone();
        let dragged = dragged.clone();
        move |e: &PointerEvent| {
            pressed.set(false);
            panning.set(false);
            if session.with_untracked(|s| s.drag().is_some()) {
                dragged.set(true);
                let zoom = viewport.with_untracked(|vp| vp.zoom_level());
                session.maybe_update(|s| s.pointer_up(zoom));
            }

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "").ok();
            }
        }
    };

    let on_pointer_up = {
        let end_gesture = end_gesture.clone();
        move |e: PointerEvent| end_gesture(&e)
    };

    let on_pointer_cancel = {
        let end_gesture = end_gesture.clone();
        move |e: PointerEvent| end_gesture(&e)
    };

    let on_pointer_leave = {
        let pressed = pressed.clone();
        move |e: PointerEvent| {
            // Captured presses keep receiving events outside the canvas.
            if pressed.get() && session.with_untracked(|s| s.drag().is_some()) {
                return;
            }
            end_gesture(&e)
        }
    };

    let on_click = {
        let moved = moved.clone();
        let dragged = dragged.clone();
        move |e: MouseEvent| {
            // A press that panned or dragged something is not a click.
            if moved.replace(false) || dragged.replace(false) {
                return;
            }
            let (sx, sy) = local_point(e.client_x() as f64, e.client_y() as f64);
            let vp = viewport.get_untracked();
            let p = vp.screen_to_display(sx, sy);
            let zoom = vp.zoom_level();

            let target = session.with_untracked(|s| {
                businesses.with_untracked(|list| {
                    let scene = Scene {
                        vp: &vp,
                        session: s,
                        businesses: list,
                        map_image: None,
                        icons: &[],
                        width: 0.0,
                        height: 0.0,
                    };
                    if icon_at(&scene, sx, sy) {
                        ClickTarget::Icon
                    } else {
                        ClickTarget::Surface
                    }
                })
            });

            let mut outcome = ClickOutcome::Ignored;
            session.maybe_update(|s| {
                outcome = s.handle_click(p, target, zoom);
                outcome != ClickOutcome::Ignored
            });
            if outcome.holds_click_lock() {
                // Release once this event-loop turn has finished.
                gloo_timers::callback::Timeout::new(0, move || {
                    session.update_untracked(|s| s.release_click_lock());
                })
                .forget();
            }
        }
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let (sx, sy) = local_point(e.client_x() as f64, e.client_y() as f64);
        viewport.update(|vp| vp.zoom_at(e.delta_y(), sx, sy));
    };

    view! {
        <canvas
            node_ref=canvas_ref
            class="map-canvas"
            style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none;"
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointercancel=on_pointer_cancel
            on:pointerleave=on_pointer_leave
            on:click=on_click
            on:wheel=on_wheel
        />
    }
}

fn hover_cursor(
    vp: &Viewport,
    session: &RwSignal<MapSession>,
    p: DisplayPoint,
    sx: f64,
    sy: f64,
) -> &'static str {
    let radius = HANDLE_RADIUS / vp.scale;
    session.with_untracked(|s| {
        let ruler = s.ruler();
        if ruler.handle_at(p, radius).is_some() || ruler.segment_hit(p, radius) {
            "move"
        } else if marker_pin_at(vp, s, sx, sy) && s.marker().current().is_some_and(|m| m.draggable) {
            "pointer"
        } else {
            ""
        }
    })
}
