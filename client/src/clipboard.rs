use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

/// Best-effort copy. Uses the async Clipboard API in secure contexts and the
/// legacy hidden-textarea `execCommand("copy")` path otherwise. Failures are
/// logged and otherwise ignored.
pub fn copy_text(text: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };

    if window.is_secure_context() {
        match write_with_clipboard_api(&window, text) {
            Ok(promise) => {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        web_sys::console::warn_1(&format!("Clipboard write failed: {err:?}").into());
                    }
                });
                return;
            }
            Err(err) => {
                web_sys::console::warn_1(&format!("Clipboard API unavailable: {err:?}").into());
            }
        }
    }

    if let Err(err) = copy_with_textarea(&window, text) {
        web_sys::console::warn_1(&format!("Legacy copy failed: {err:?}").into());
    }
}

fn write_with_clipboard_api(window: &web_sys::Window, text: &str) -> Result<js_sys::Promise, JsValue> {
    let clipboard = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(JsValue::from_str("navigator.clipboard missing"));
    }
    let write_text = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))?
        .dyn_into::<js_sys::Function>()?;
    write_text
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into::<js_sys::Promise>()
}

fn copy_with_textarea(window: &web_sys::Window, text: &str) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let textarea = document
        .create_element("textarea")?
        .dyn_into::<web_sys::HtmlTextAreaElement>()?;
    textarea.set_value(text);
    let style = textarea.style();
    style.set_property("position", "fixed")?;
    style.set_property("left", "-9999px")?;

    body.append_child(&textarea)?;
    textarea.select();
    let copied = document
        .dyn_ref::<web_sys::HtmlDocument>()
        .map(|html| html.exec_command("copy"))
        .transpose();
    body.remove_child(&textarea)?;

    match copied? {
        Some(true) => Ok(()),
        _ => Err(JsValue::from_str("execCommand(\"copy\") was rejected")),
    }
}
