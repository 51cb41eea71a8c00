//! Page controls and their handlers.

use std::cell::RefCell;
use std::rc::Rc;

use spine_viewer::{
    ClearColor, PaddingControl, PlayState, Scene, SelectedFileSet, Snapshot, SnapshotFormat,
    SnapshotOptions, ViewOptions, Viewer, ViewerConfig, ViewerError, load_scene,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::dom::{alert, element_by_id, listen, optional_element};
use super::files::{DomFile, DomFileReader, selected_files};
use super::gpu::{GpuSurface, GpuUploader};
use crate::{SpineBackend, SpineRig};

pub(crate) type WebViewer = Viewer<SpineRig, wgpu::BindGroup>;

pub(crate) struct App {
    pub(crate) viewer: WebViewer,
    pub(crate) surface: GpuSurface,
    pub(crate) controls: Controls,
    pub(crate) config: ViewerConfig,
}

impl App {
    pub(crate) fn view_options(&self) -> ViewOptions {
        self.controls.view_options(self.config.fallback_clear_color)
    }
}

/// Elements the viewer reads from or writes to. Optional controls fall back to defaults.
pub(crate) struct Controls {
    window: web_sys::Window,
    document: web_sys::Document,
    file_input: web_sys::HtmlInputElement,
    play_pause: web_sys::HtmlButtonElement,
    save_snapshot: web_sys::HtmlButtonElement,
    animation_list: web_sys::HtmlSelectElement,
    skin_list: web_sys::HtmlSelectElement,
    animation_controls: Option<web_sys::HtmlElement>,
    snapshot_padding: Option<web_sys::HtmlInputElement>,
    snapshot_padding_slider: Option<web_sys::HtmlInputElement>,
    snapshot_resolution: Option<web_sys::HtmlSelectElement>,
    snapshot_format: Option<web_sys::HtmlSelectElement>,
    pma_checkbox: Option<web_sys::HtmlInputElement>,
    debug_checkbox: Option<web_sys::HtmlInputElement>,
    viewport: Option<web_sys::Element>,
}

impl Controls {
    pub(crate) fn find(
        window: &web_sys::Window,
        document: &web_sys::Document,
    ) -> Result<Self, ViewerError> {
        Ok(Self {
            window: window.clone(),
            document: document.clone(),
            file_input: element_by_id(document, "file-input")?,
            play_pause: element_by_id(document, "play-pause")?,
            save_snapshot: element_by_id(document, "save-snapshot")?,
            animation_list: element_by_id(document, "animation-list")?,
            skin_list: element_by_id(document, "skin-list")?,
            animation_controls: optional_element(document, "animation-controls"),
            snapshot_padding: optional_element(document, "snapshot-padding"),
            snapshot_padding_slider: optional_element(document, "snapshot-padding-slider"),
            snapshot_resolution: optional_element(document, "snapshot-resolution"),
            snapshot_format: optional_element(document, "snapshot-format"),
            pma_checkbox: optional_element(document, "pma-checkbox"),
            debug_checkbox: optional_element(document, "debug-checkbox"),
            viewport: document.query_selector(".viewport").ok().flatten(),
        })
    }

    /// Read once per frame.
    pub(crate) fn view_options(&self, fallback: ClearColor) -> ViewOptions {
        ViewOptions {
            premultiplied_alpha: self.pma_checkbox.as_ref().is_some_and(|c| c.checked()),
            debug_overlay: self.debug_checkbox.as_ref().is_some_and(|c| c.checked()),
            clear_color: self.viewport_color().unwrap_or(fallback),
        }
    }

    fn viewport_color(&self) -> Option<ClearColor> {
        let viewport = self.viewport.as_ref()?;
        let style = self.window.get_computed_style(viewport).ok().flatten()?;
        let value = style.get_property_value("background-color").ok()?;
        ClearColor::from_css(&value)
    }

    /// Read once per export.
    pub(crate) fn snapshot_options(&self, defaults: &SnapshotOptions) -> SnapshotOptions {
        let padding_px = self
            .snapshot_padding
            .as_ref()
            .and_then(|i| parse_leading_u32(&i.value()))
            .unwrap_or(defaults.padding_px);
        let target_long_side = self
            .snapshot_resolution
            .as_ref()
            .and_then(|s| parse_leading_u32(&s.value()))
            .filter(|v| *v > 0)
            .unwrap_or(defaults.target_long_side);
        let format = self
            .snapshot_format
            .as_ref()
            .and_then(|s| SnapshotFormat::parse(&s.value()))
            .unwrap_or(defaults.format);
        SnapshotOptions {
            padding_px,
            target_long_side,
            format,
        }
    }

    pub(crate) fn show_play_state(&self, state: PlayState) {
        let label = state.button_label();
        match self.play_pause.query_selector("span").ok().flatten() {
            Some(span) => span.set_text_content(Some(label)),
            None => self.play_pause.set_text_content(Some(label)),
        }
    }

    /// Fills the selects from a freshly installed scene.
    pub(crate) fn show_scene(&self, scene: &Scene<SpineRig, wgpu::BindGroup>) -> Result<(), JsValue> {
        populate_select(
            &self.document,
            &self.animation_list,
            &scene.animations,
            scene.current_animation.as_deref(),
        )?;
        populate_select(
            &self.document,
            &self.skin_list,
            &scene.skins,
            scene.current_skin.as_deref(),
        )?;
        if let Some(controls) = &self.animation_controls {
            if !scene.animations.is_empty() {
                controls.style().set_property("display", "block")?;
            }
        }
        Ok(())
    }

    pub(crate) fn download(&self, snapshot: &Snapshot) -> Result<(), JsValue> {
        let link: web_sys::HtmlAnchorElement = self
            .document
            .create_element("a")?
            .dyn_into::<web_sys::HtmlAnchorElement>()?;
        link.set_download(&snapshot.file_name);
        link.set_href(&snapshot.data.to_string());
        link.click();
        Ok(())
    }

    fn sync_padding_fill(&self) {
        let Some(slider) = &self.snapshot_padding_slider else {
            return;
        };
        let control = PaddingControl {
            min: slider.min().parse().unwrap_or(0.0),
            max: slider.max().parse().unwrap_or(100.0),
        };
        let value = slider.value().parse().unwrap_or(0.0);
        let fill = control.fill_percent(value);
        if let Err(e) = slider
            .style()
            .set_property("background-size", &format!("{fill}% 100%"))
        {
            log::warn!("slider style: {e:?}");
        }
    }
}

/// `parseInt` semantics: leading digits, anything after them ignored.
fn parse_leading_u32(text: &str) -> Option<u32> {
    let digits = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>();
    digits.parse().ok()
}

fn clear_select(select: &web_sys::HtmlSelectElement) {
    while select.length() > 0 {
        select.remove_with_index(0);
    }
}

fn populate_select(
    document: &web_sys::Document,
    select: &web_sys::HtmlSelectElement,
    names: &[String],
    selected: Option<&str>,
) -> Result<(), JsValue> {
    clear_select(select);
    for name in names {
        let option: web_sys::HtmlOptionElement = document
            .create_element("option")?
            .dyn_into::<web_sys::HtmlOptionElement>()?;
        option.set_value(name);
        option.set_text(name);
        select.append_child(&option)?;
    }
    if let Some(selected) = selected {
        select.set_value(selected);
    }
    Ok(())
}

/// Wires every control to `app`.
pub(crate) fn bind(app: &Rc<RefCell<App>>, uploader: GpuUploader) -> Result<(), JsValue> {
    let (file_input, play_pause, save_snapshot, animation_list, skin_list, slider, padding) = {
        let app = app.borrow();
        let c = &app.controls;
        app.controls.sync_padding_fill();
        (
            c.file_input.clone(),
            c.play_pause.clone(),
            c.save_snapshot.clone(),
            c.animation_list.clone(),
            c.skin_list.clone(),
            c.snapshot_padding_slider.clone(),
            c.snapshot_padding.clone(),
        )
    };

    {
        let app = app.clone();
        let input = file_input.clone();
        listen(&file_input, "change", move |_e| {
            let files = selected_files(&input);
            if files.is_empty() {
                return;
            }
            start_load(app.clone(), uploader.clone(), files);
        })?;
    }

    {
        let app = app.clone();
        listen(&play_pause, "click", move |_e| {
            let Ok(mut app) = app.try_borrow_mut() else {
                return;
            };
            let state = app.viewer.toggle_play();
            app.controls.show_play_state(state);
        })?;
    }

    {
        let app = app.clone();
        let select = animation_list.clone();
        listen(&animation_list, "change", move |_e| {
            let name = select.value();
            if name.is_empty() {
                return;
            }
            let Ok(mut app) = app.try_borrow_mut() else {
                return;
            };
            if let Err(e) = app.viewer.set_animation(&name) {
                log::warn!("set_animation({name}) failed: {e}");
            }
        })?;
    }

    {
        let app = app.clone();
        let select = skin_list.clone();
        listen(&skin_list, "change", move |_e| {
            let name = select.value();
            if name.is_empty() {
                return;
            }
            let Ok(mut app) = app.try_borrow_mut() else {
                return;
            };
            if let Err(e) = app.viewer.set_skin(&name) {
                log::warn!("set_skin({name}) failed: {e}");
            }
        })?;
    }

    {
        let app = app.clone();
        listen(&save_snapshot, "click", move |_e| {
            let Ok(mut app) = app.try_borrow_mut() else {
                return;
            };
            export_snapshot(&mut app);
        })?;
    }

    if let (Some(slider), Some(padding)) = (slider, padding) {
        {
            let app = app.clone();
            let (from, to) = (slider.clone(), padding.clone());
            listen(&slider, "input", move |_e| {
                to.set_value(&from.value());
                if let Ok(app) = app.try_borrow() {
                    app.controls.sync_padding_fill();
                }
            })?;
        }
        {
            let app = app.clone();
            let (from, to) = (padding.clone(), slider.clone());
            listen(&padding, "input", move |_e| {
                let Some(value) = PaddingControl::parse_field(&from.value()) else {
                    return;
                };
                to.set_value(&value.to_string());
                if let Ok(app) = app.try_borrow() {
                    app.controls.sync_padding_fill();
                }
            })?;
        }
    }

    Ok(())
}

fn export_snapshot(app: &mut App) {
    let options = app.controls.snapshot_options(&app.config.snapshot);
    let view = app.view_options();
    let App {
        viewer,
        surface,
        controls,
        ..
    } = app;

    match viewer.export_snapshot(surface, &options, &view) {
        Ok(snapshot) => {
            if let Err(e) = controls.download(&snapshot) {
                log::error!("download failed: {e:?}");
            }
        }
        Err(ViewerError::NoScene) => {}
        Err(e) => alert(&format!("Failed to save the snapshot.\n{e}")),
    }
    controls.show_play_state(viewer.play_state());
}

/// Resolves the selection and loads it in the background. A newer selection supersedes this one.
fn start_load(app: Rc<RefCell<App>>, mut uploader: GpuUploader, files: Vec<DomFile>) {
    let files = match SelectedFileSet::resolve(files) {
        Ok(files) => files,
        Err(e) => {
            log::warn!("{e}");
            alert(&capitalized(&e.to_string()));
            return;
        }
    };
    let ticket = match app.try_borrow() {
        Ok(app) => app.viewer.begin_load(),
        Err(_) => {
            log::warn!("viewer busy, selection ignored");
            return;
        }
    };

    spawn_local(async move {
        let result = load_scene(&SpineBackend, &files, &DomFileReader, &mut uploader, &ticket).await;

        let Ok(mut guard) = app.try_borrow_mut() else {
            log::warn!("viewer busy, load #{} dropped", ticket.id());
            return;
        };
        let app = &mut *guard;
        let installed = result.and_then(|scene| app.viewer.install(&ticket, scene));
        match installed {
            Ok(scene) => {
                if let Err(e) = app.controls.show_scene(scene) {
                    log::warn!("update selects failed: {e:?}");
                }
                app.controls.show_play_state(PlayState::Playing);
            }
            Err(e) if !e.is_user_facing() => log::info!("load #{}: {e}", ticket.id()),
            Err(e) => {
                log::error!("load #{} failed: {e}", ticket.id());
                alert(&format!("Error loading Spine data: {e}"));
            }
        }
    });
}

fn capitalized(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
