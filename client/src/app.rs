use std::cell::RefCell;

use leptos::prelude::*;
use sampmap_shared::{Business, MapConfig, MapSession, ShareLink};
use web_sys::HtmlImageElement;

use crate::api;
use crate::canvas::MapCanvas;
use crate::controls::MapControls;
use crate::images::{BusinessIcon, load_business_icons, load_map_image};
use crate::popup::MarkerPopupView;
use crate::share;
use crate::viewport::Viewport;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Session for freshly loaded geometry, with the marker from the page's share link placed.
fn initial_session(config: &MapConfig, link: Option<ShareLink>) -> MapSession {
    let mut session = MapSession::new(config.projection());
    if let Some(link) = link {
        session.restore(ShareLink::new(link.coord, config.clamp_zoom(link.zoom)));
    }
    session
}

#[component]
pub fn App() -> impl IntoView {
    let viewport = RwSignal::new(Viewport::default());
    let session = RwSignal::new(MapSession::default());
    let map_config: RwSignal<Option<MapConfig>> = RwSignal::new(None);
    let businesses: RwSignal<Vec<Business>> = RwSignal::new(Vec::new());
    let map_image: RwSignal<Option<HtmlImageElement>> = RwSignal::new(None);
    let icons: RwSignal<Vec<BusinessIcon>> = RwSignal::new(Vec::new());

    provide_context(viewport);
    provide_context(session);
    provide_context(map_config);
    provide_context(businesses);
    provide_context(map_image);
    provide_context(icons);

    // Geometry first: the session, viewport and image all depend on it.
    wasm_bindgen_futures::spawn_local(async move {
        let config = match api::fetch_map_config().await {
            Ok(config) => config,
            Err(err) => {
                web_sys::console::warn_1(
                    &format!("Failed to load map config, using defaults: {err}").into(),
                );
                MapConfig::default()
            }
        };
        load_map_image(config.image_url.clone(), map_image);
        viewport.set(Viewport::for_config(&config));
        session.set(initial_session(&config, share::link_from_location()));
        map_config.set(Some(config));
    });

    wasm_bindgen_futures::spawn_local(async move {
        match api::fetch_businesses().await {
            Ok(list) => businesses.set(list),
            Err(err) => {
                web_sys::console::warn_1(&format!("Failed to load businesses: {err}").into());
            }
        }
    });

    load_business_icons(icons);

    // Global keyboard shortcuts
    Effect::new(move || {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                match e.key().as_str() {
                    "Escape" => {
                        session.update(|s| s.cancel());
                    }
                    "+" | "=" => {
                        let (cw, ch) = canvas_dimensions();
                        viewport.update(|vp| vp.step_zoom(1, cw / 2.0, ch / 2.0));
                    }
                    "-" => {
                        let (cw, ch) = canvas_dimensions();
                        viewport.update(|vp| vp.step_zoom(-1, cw / 2.0, ch / 2.0));
                    }
                    _ => {}
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    let ruler_mode = Memo::new(move |_| session.with(|s| s.ruler().is_active()));

    view! {
        <div
            class="map-shell"
            class:ruler-mode=move || ruler_mode.get()
            style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;"
            style:cursor=move || if ruler_mode.get() { "crosshair" } else { "grab" }
        >
            <MapCanvas />
            <MarkerPopupView />
            <MapControls />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampmap_shared::{GameCoordinate, Orientation};

    #[test]
    fn initial_session_without_link_is_empty() {
        let session = initial_session(&MapConfig::default(), None);
        assert!(!session.marker().exists());
        assert!(!session.ruler().is_active());
    }

    #[test]
    fn initial_session_restores_fixed_marker_with_clamped_zoom() {
        let link = ShareLink::new(GameCoordinate::new(0.0, 1500.0), 9);
        let session = initial_session(&MapConfig::default(), Some(link));
        let marker = session.marker().current().expect("restored marker");
        assert!(!marker.draggable);
        assert_eq!(marker.link.zoom, 2);
        assert_eq!(marker.coord(), GameCoordinate::new(0.0, 1500.0));
        let popup = session.marker().popup().expect("popup open");
        assert!(!popup.copy_button);
    }

    #[test]
    fn initial_session_honors_inverted_orientation() {
        let config = MapConfig {
            orientation: Orientation::InvertedY,
            ..MapConfig::default()
        };
        let link = ShareLink::new(GameCoordinate::new(0.0, 1500.0), 0);
        let session = initial_session(&config, Some(link));
        let marker = session.marker().current().expect("restored marker");
        assert!((marker.position.row - 1536.0).abs() < 1e-9);
    }
}
