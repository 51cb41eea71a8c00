//! Browser entry point: page wiring, render loop and resize handling.

mod dom;
mod files;
mod gpu;
mod theme;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use spine_viewer::{RenderSurface, Viewer, ViewerConfig, ViewerError, global_error_message};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use dom::{alert, element_by_id, js_error_message, listen};
use ui::{App, Controls};

fn to_js(e: ViewerError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Trace);

    let window = dom::window().map_err(to_js)?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;

    let mut config = dom::page_config(&document);
    config.apply_params(dom::query_params(&window));
    log::set_max_level(config.log_level().to_level_filter());

    install_error_handler(&window);
    theme::init(&window, &document)?;

    spawn_local(async move {
        if let Err(e) = run(window, document, config).await {
            let message = js_error_message(&e);
            log::error!("spine-viewer init failed: {message}");
            alert(&message);
        }
    });

    Ok(())
}

/// One alert per uncaught script error.
fn install_error_handler(window: &web_sys::Window) {
    let handler = Closure::wrap(Box::new(
        move |message: JsValue, _source: JsValue, line: JsValue, _column: JsValue, _error: JsValue| {
            let message = message.as_string().unwrap_or_else(|| format!("{message:?}"));
            let line = line.as_f64().unwrap_or(0.0) as u32;
            log::error!("uncaught: {message} (line {line})");
            alert(&global_error_message(&message, line));
            false
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, JsValue, JsValue, JsValue) -> bool>);
    window.set_onerror(Some(handler.as_ref().unchecked_ref()));
    handler.forget();
}

async fn run(
    window: web_sys::Window,
    document: web_sys::Document,
    config: ViewerConfig,
) -> Result<(), JsValue> {
    let canvas: web_sys::HtmlCanvasElement = element_by_id(&document, "canvas").map_err(to_js)?;
    let size = dom::canvas_size(&window, &config.layout);
    let (surface, uploader) = gpu::init(canvas, size).await.map_err(to_js)?;

    let controls = Controls::find(&window, &document).map_err(to_js)?;
    let app = Rc::new(RefCell::new(App {
        viewer: Viewer::new(&config, size),
        surface,
        controls,
        config,
    }));
    {
        let app = app.borrow();
        app.controls.show_play_state(app.viewer.play_state());
    }
    ui::bind(&app, uploader)?;

    {
        let app = app.clone();
        let win = window.clone();
        listen(&window, "resize", move |_e| {
            let Ok(mut guard) = app.try_borrow_mut() else {
                return;
            };
            let app = &mut *guard;
            let size = dom::canvas_size(&win, &app.config.layout);
            let size = app.surface.resize(size);
            app.viewer.resize(size);
        })?;
    }

    start_render_loop(&window, app)
}

fn start_render_loop(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let raf = Rc::new(RefCell::new(None::<Closure<dyn FnMut(f64)>>));
    let raf2 = raf.clone();
    let win = window.clone();
    *raf2.borrow_mut() = Some(Closure::wrap(Box::new(move |ts_ms: f64| {
        // A handler holding the app (snapshot export) skips one frame.
        if let Ok(mut guard) = app.try_borrow_mut() {
            let app = &mut *guard;
            let options = app.view_options();
            if let Err(e) = app.viewer.frame(ts_ms, &mut app.surface, &options) {
                log::error!("frame: {e}");
            }
        }

        if let Some(callback) = raf.borrow().as_ref() {
            if let Err(e) = win.request_animation_frame(callback.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame: {}", js_error_message(&e));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = raf2.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}
