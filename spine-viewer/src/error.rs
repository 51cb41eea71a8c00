use thiserror::Error;

use crate::files::FileRole;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("please select .skel/.json, .atlas, and image files (missing: {})", list_roles(.missing))]
    MissingFiles { missing: Vec<FileRole> },

    #[error("failed to read '{file}': {message}")]
    Read { file: String, message: String },

    #[error("failed to decode '{file}': {message}")]
    Decode { file: String, message: String },

    #[error("invalid data URL: {message}")]
    DataUrl { message: String },

    #[error("no image provided for atlas page '{page}'")]
    MissingPageImage { page: String },

    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("unknown skin: {name}")]
    UnknownSkin { name: String },

    #[error("spine runtime error: {message}")]
    Runtime { message: String },

    #[error("no skeleton loaded")]
    NoScene,

    #[error("load superseded by a newer file selection")]
    Superseded,

    #[error("snapshot failed: {message}")]
    Snapshot { message: String },

    #[error("rendering is unavailable: {message}")]
    RenderingUnavailable { message: String },

    #[error("missing element #{id}")]
    MissingElement { id: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ViewerError {
    /// Whether the failure should be shown to the user (as opposed to only logged).
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, ViewerError::Superseded)
    }
}

fn list_roles(roles: &[FileRole]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text of the alert raised by the page-wide error handler.
pub fn global_error_message(message: &str, line: u32) -> String {
    format!("Global Error: {message}\nLine: {line}")
}
