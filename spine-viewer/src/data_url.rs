use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::ViewerError;

/// A base64 `data:` URL, as produced by `FileReader.readAsDataURL` and `canvas.toDataURL`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataUrl {
    mime: String,
    payload: String,
}

impl DataUrl {
    pub fn parse(input: &str) -> Result<Self, ViewerError> {
        let rest = input
            .strip_prefix("data:")
            .ok_or_else(|| ViewerError::DataUrl {
                message: "missing 'data:' prefix".to_string(),
            })?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| ViewerError::DataUrl {
            message: "missing ',' separator".to_string(),
        })?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim();
        if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(ViewerError::DataUrl {
                message: "payload is not base64".to_string(),
            });
        }
        let mime = if mime.is_empty() {
            "text/plain"
        } else {
            mime
        };

        Ok(Self {
            mime: mime.to_ascii_lowercase(),
            payload: payload.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn decode(&self) -> Result<Vec<u8>, ViewerError> {
        // Some encoders wrap lines; tolerate whitespace.
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ViewerError::DataUrl {
                message: format!("bad base64 payload: {e}"),
            })
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}
