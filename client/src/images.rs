use leptos::prelude::*;
use sampmap_shared::BusinessKind;
use web_sys::HtmlImageElement;

/// Decoded icon for one business kind.
#[derive(Clone)]
pub struct BusinessIcon {
    pub kind: BusinessKind,
    pub image: HtmlImageElement,
}

async fn decode_image(src: &str) -> Result<HtmlImageElement, String> {
    let image = HtmlImageElement::new().map_err(|e| format!("create image: {e:?}"))?;
    image.set_src(src);
    wasm_bindgen_futures::JsFuture::from(image.decode())
        .await
        .map_err(|e| format!("decode {src}: {e:?}"))?;
    Ok(image)
}

pub fn load_map_image(src: String, signal: RwSignal<Option<HtmlImageElement>>) {
    wasm_bindgen_futures::spawn_local(async move {
        match decode_image(&src).await {
            Ok(image) => signal.set(Some(image)),
            Err(err) => {
                signal.set(None);
                web_sys::console::warn_1(&format!("Failed to load map image: {err}").into());
            }
        }
    });
}

/// Decode every business icon; kinds whose icon fails to load fall back to a dot.
pub fn load_business_icons(signal: RwSignal<Vec<BusinessIcon>>) {
    for kind in BusinessKind::ALL {
        wasm_bindgen_futures::spawn_local(async move {
            match decode_image(&kind.icon_path()).await {
                Ok(image) => signal.update(|icons| icons.push(BusinessIcon { kind, image })),
                Err(err) => {
                    web_sys::console::warn_1(&format!("Failed to load business icon: {err}").into());
                }
            }
        });
    }
}

pub fn icon_for(icons: &[BusinessIcon], kind: BusinessKind) -> Option<&HtmlImageElement> {
    icons
        .iter()
        .find(|icon| icon.kind == kind)
        .map(|icon| &icon.image)
}
