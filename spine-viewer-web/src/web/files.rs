//! `<input type="file">` selections behind the core's reader seam.

use spine_viewer::{DataUrl, FileReader, NamedFile, ViewerError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::dom::js_error_message;

pub(crate) struct DomFile {
    name: String,
    file: web_sys::File,
}

impl NamedFile for DomFile {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Every file currently selected in `input`, in selection order.
pub(crate) fn selected_files(input: &web_sys::HtmlInputElement) -> Vec<DomFile> {
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|file| DomFile {
            name: file.name(),
            file,
        })
        .collect()
}

#[derive(Copy, Clone)]
enum ReadAs {
    Text,
    ArrayBuffer,
    DataUrl,
}

/// Wraps the DOM `FileReader` in a promise per read.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct DomFileReader;

impl DomFileReader {
    async fn read(&self, file: &DomFile, kind: ReadAs) -> Result<JsValue, ViewerError> {
        let read_error = |e: &JsValue| ViewerError::Read {
            file: file.name.clone(),
            message: js_error_message(e),
        };

        let reader = web_sys::FileReader::new().map_err(|e| read_error(&e))?;
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let loaded = reader.clone();
            let onload = Closure::once_into_js(move |_e: web_sys::Event| {
                let result = loaded.result().unwrap_or(JsValue::NULL);
                let _ = resolve.call1(&JsValue::NULL, &result);
            });
            let failed = reader.clone();
            let onerror = Closure::once_into_js(move |_e: web_sys::Event| {
                let message = failed
                    .error()
                    .map(|e| e.message())
                    .unwrap_or_else(|| "read failed".to_string());
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str(&message));
            });
            reader.set_onload(Some(onload.unchecked_ref()));
            reader.set_onerror(Some(onerror.unchecked_ref()));
        });

        match kind {
            ReadAs::Text => reader.read_as_text(&file.file),
            ReadAs::ArrayBuffer => reader.read_as_array_buffer(&file.file),
            ReadAs::DataUrl => reader.read_as_data_url(&file.file),
        }
        .map_err(|e| read_error(&e))?;

        JsFuture::from(promise).await.map_err(|e| read_error(&e))
    }
}

impl FileReader for DomFileReader {
    type File = DomFile;

    async fn read_text(&self, file: &DomFile) -> Result<String, ViewerError> {
        self.read(file, ReadAs::Text)
            .await?
            .as_string()
            .ok_or_else(|| ViewerError::Read {
                file: file.name.clone(),
                message: "reader did not return text".to_string(),
            })
    }

    async fn read_bytes(&self, file: &DomFile) -> Result<Vec<u8>, ViewerError> {
        let buffer = self.read(file, ReadAs::ArrayBuffer).await?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }

    async fn read_data_url(&self, file: &DomFile) -> Result<DataUrl, ViewerError> {
        let url = self
            .read(file, ReadAs::DataUrl)
            .await?
            .as_string()
            .ok_or_else(|| ViewerError::Read {
                file: file.name.clone(),
                message: "reader did not return a data URL".to_string(),
            })?;
        DataUrl::parse(&url)
    }
}
