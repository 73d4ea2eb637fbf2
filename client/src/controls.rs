use leptos::prelude::*;
use sampmap_shared::MapSession;

use crate::app::canvas_dimensions;
use crate::viewport::Viewport;

const BUTTON_STYLE: &str = "width: 32px; height: 30px; background: #13161f; color: #e2e0d8; border: 1px solid #282c3e; border-radius: 6px; cursor: pointer; font-size: 16px; display: flex; align-items: center; justify-content: center;";

/// Top-left map controls: zoom, recenter and the ruler toggle.
#[component]
pub fn MapControls() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let session: RwSignal<MapSession> = expect_context();

    let ruler_active = Memo::new(move |_| session.with(|s| s.ruler().is_active()));

    let zoom_by = move |steps: i32| {
        let (w, h) = canvas_dimensions();
        viewport.update(|vp| vp.step_zoom(steps, w / 2.0, h / 2.0));
    };

    let on_center = move |_| {
        let (w, h) = canvas_dimensions();
        let center = session.with_untracked(|s| s.projection().center());
        viewport.update(|vp| vp.recenter(center, w, h));
    };

    let on_ruler = move |_| {
        session.update(|s| {
            s.toggle_ruler();
        });
    };

    view! {
        <div
            class="map-controls"
            style="position: absolute; top: 12px; left: 12px; z-index: 10; display: flex; flex-direction: column; gap: 6px;"
        >
            <button title="Zoom in" style=BUTTON_STYLE on:click=move |_| zoom_by(1)>"+"</button>
            <button title="Zoom out" style=BUTTON_STYLE on:click=move |_| zoom_by(-1)>"−"</button>
            <button title="Center map" style=BUTTON_STYLE on:click=on_center>"📍"</button>
            <button
                title="Ruler"
                class="ruler-btn"
                class:active=move || ruler_active.get()
                style=BUTTON_STYLE
                style:border-color=move || if ruler_active.get() { "#ffcc00" } else { "#282c3e" }
                on:click=on_ruler
            >
                "📏"
            </button>
        </div>
    }
}
