use std::cell::RefCell;
use std::rc::Rc;

use spine_viewer::{KeyValueStore, Theme, ThemeController};
use wasm_bindgen::prelude::*;

use super::dom::{listen, optional_element};

/// `window.localStorage`; reads and writes are skipped when storage is blocked.
pub(crate) struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStore {
    pub(crate) fn new(window: &web_sys::Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            log::warn!("could not persist {key}={value}");
        }
    }
}

fn prefers_dark(window: &web_sys::Window) -> bool {
    window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .is_some_and(|m| m.matches())
}

fn render(document: &web_sys::Document, toggle: Option<&web_sys::HtmlElement>, theme: Theme) {
    if let Some(body) = document.body() {
        let classes = body.class_list();
        let _ = classes.remove_2(Theme::Dark.body_class(), Theme::Light.body_class());
        let _ = classes.add_1(theme.body_class());
    }
    if let Some(toggle) = toggle {
        toggle.set_inner_html(&format!(r#"<i data-lucide="{}"></i>"#, theme.toggle_icon()));
    }
}

/// Applies the stored or OS-preferred theme and wires `#theme-toggle`.
pub(crate) fn init(window: &web_sys::Window, document: &web_sys::Document) -> Result<(), JsValue> {
    let controller = ThemeController::init(LocalStore::new(window), prefers_dark(window));
    let toggle: Option<web_sys::HtmlElement> = optional_element(document, "theme-toggle");
    render(document, toggle.as_ref(), controller.current());
    log::info!("theme: {}", controller.current().as_str());

    let Some(toggle) = toggle else {
        return Ok(());
    };
    let controller = Rc::new(RefCell::new(controller));
    let document = document.clone();
    let button = toggle.clone();
    listen(&toggle, "click", move |_e| {
        let Ok(mut controller) = controller.try_borrow_mut() else {
            return;
        };
        let theme = controller.toggle();
        render(&document, Some(&button), theme);
    })
}
