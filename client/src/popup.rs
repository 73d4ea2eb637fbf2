use leptos::prelude::*;
use sampmap_shared::link::format_coord;
use sampmap_shared::{CopyState, MapSession};
use web_sys::MouseEvent;

use crate::clipboard::copy_text;
use crate::share::share_url;
use crate::viewport::Viewport;

/// Gap between the marker anchor and the popup's bottom edge, clearing the pin.
const POPUP_LIFT: f64 = 34.0;

/// Coordinate popup anchored above the share marker.
#[component]
pub fn MarkerPopupView() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let session: RwSignal<MapSession> = expect_context();

    let popup = Memo::new(move |_| session.with(|s| s.marker().popup()));
    let anchor = Memo::new(move |_| {
        session.with(|s| {
            s.marker()
                .current()
                .filter(|m| m.popup_open())
                .map(|m| m.position)
        })
    });
    let screen_pos = move || {
        let p = anchor.get()?;
        Some(viewport.with(|vp| vp.display_to_screen(p)))
    };

    let button_ref = NodeRef::<leptos::html::Button>::new();
    // Share URL bound to the mounted copy button, tagged with its popup generation.
    let bound: RwSignal<Option<(u64, String)>> = RwSignal::new(None);

    // Post-render hook: runs once the copy button node exists.
    Effect::new(move || {
        let Some(current) = popup.get() else {
            bound.set(None);
            return;
        };
        if button_ref.get().is_none() {
            return;
        }
        let url = session
            .with_untracked(|s| s.popup_rendered(current.generation))
            .and_then(|link| share_url(&link));
        bound.set(url.map(|url| (current.generation, url)));
    });

    let on_copy = move |e: MouseEvent| {
        e.stop_propagation();
        let Some((generation, url)) = bound.get_untracked() else {
            return;
        };
        copy_text(&url);
        session.maybe_update(|s| s.mark_copied(generation));
    };

    let on_close = move |e: MouseEvent| {
        e.stop_propagation();
        session.maybe_update(|s| s.close_popup());
    };

    view! {
        <div
            class="marker-popup"
            style="position: absolute; z-index: 20; transform: translate(-50%, -100%); min-width: 180px; padding: 10px 12px; background: #13161f; color: #e2e0d8; border: 1px solid #282c3e; border-radius: 6px; box-shadow: 0 4px 16px rgba(0,0,0,0.5); font-family: 'JetBrains Mono', monospace; font-size: 0.82rem; line-height: 1.5;"
            style:display=move || if screen_pos().is_some() { "block" } else { "none" }
            style:left=move || screen_pos().map(|(x, _)| format!("{x}px")).unwrap_or_default()
            style:top=move || screen_pos().map(|(_, y)| format!("{}px", y - POPUP_LIFT)).unwrap_or_default()
        >
            <button
                class="popup-close"
                style="position: absolute; top: 2px; right: 6px; background: none; border: none; color: #5a5860; cursor: pointer; font-size: 1rem;"
                on:click=on_close
            >
                "×"
            </button>
            {move || {
                popup
                    .get()
                    .map(|p| {
                        let copied = p.copy_state == CopyState::Copied;
                        view! {
                            <b>"Coordinates"</b>
                            <br />
                            {format!("X: {}", format_coord(p.coord.x))}
                            <br />
                            {format!("Y: {}", format_coord(p.coord.y))}
                            {p
                                .copy_button
                                .then(|| {
                                    view! {
                                        <br />
                                        <button
                                            node_ref=button_ref
                                            class="copy-link"
                                            class:copied=copied
                                            attr:data-copied=copied.then_some("1")
                                            style="margin-top: 8px; display: flex; align-items: center; gap: 6px; padding: 4px 8px; background: #1b1f2c; color: inherit; border: 1px solid #282c3e; border-radius: 4px; cursor: pointer; font: inherit;"
                                            on:click=on_copy
                                        >
                                            <img
                                                class="copy-icon"
                                                src={if copied { "assets/img/complete.gif" } else { "assets/img/copy.gif" }}
                                                style="width: 16px; height: 16px;"
                                            />
                                            {if copied { "Copied" } else { "Copy coordinates" }}
                                        </button>
                                    }
                                })}
                        }
                    })
            }}
        </div>
    }
}
