use spine_viewer::{LayoutConfig, SurfaceSize, ViewerConfig, ViewerError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub(crate) fn window() -> Result<web_sys::Window, ViewerError> {
    web_sys::window().ok_or_else(|| ViewerError::MissingElement {
        id: "window".to_string(),
    })
}

pub(crate) fn element_by_id<T: JsCast>(
    document: &web_sys::Document,
    id: &str,
) -> Result<T, ViewerError> {
    optional_element(document, id).ok_or_else(|| ViewerError::MissingElement { id: id.to_string() })
}

/// Controls the page may leave out. A present element of the wrong type counts as missing.
pub(crate) fn optional_element<T: JsCast>(document: &web_sys::Document, id: &str) -> Option<T> {
    let el = document.get_element_by_id(id)?;
    match el.dyn_into::<T>() {
        Ok(el) => Some(el),
        Err(_) => {
            log::warn!("element #{id} has unexpected type");
            None
        }
    }
}

/// Decoded `key=value` pairs of the page URL, in order. `+` reads as a space.
pub(crate) fn query_params(window: &web_sys::Window) -> Vec<(String, String)> {
    let Ok(search) = window.location().search() else {
        return Vec::new();
    };
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    js_sys::decode_uri_component(&raw)
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or(raw)
}

/// Startup configuration from the inline `<script type="application/json" id="viewer-config">`.
/// A missing element yields the defaults; a malformed one is logged and ignored.
pub(crate) fn page_config(document: &web_sys::Document) -> ViewerConfig {
    let Some(text) = document
        .get_element_by_id("viewer-config")
        .and_then(|el| el.text_content())
    else {
        return ViewerConfig::default();
    };
    match ViewerConfig::from_json_str(&text) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ignoring #viewer-config: {e}");
            ViewerConfig::default()
        }
    }
}

pub(crate) fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if window.alert_with_message(message).is_err() {
            log::error!("alert failed: {message}");
        }
    }
}

pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(e) = value.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    if let Some(e) = value.dyn_ref::<web_sys::DomException>() {
        return e.message();
    }
    format!("{value:?}")
}

/// Backing-buffer size of the canvas for the current window.
pub(crate) fn canvas_size(window: &web_sys::Window, layout: &LayoutConfig) -> SurfaceSize {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    layout.canvas_size(width, height, window.device_pixel_ratio())
}

pub(crate) fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
