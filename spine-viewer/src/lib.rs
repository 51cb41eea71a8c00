//! Core of a drag-and-drop viewer for Spine 2D skeleton exports.
//!
//! This crate is renderer-agnostic and runtime-agnostic: it classifies the user's files, drives
//! the load pipeline, fits the camera, runs the play/pause render loop and exports snapshots.
//! The Spine runtime is reached through [`SpineRuntime`] and [`Rig`], the GPU through
//! [`TextureUploader`] and [`RenderSurface`] (see `spine-viewer-web`).

#![forbid(unsafe_code)]

mod camera;
mod config;
mod data_url;
mod error;
mod files;
mod generation;
mod loader;
mod options;
mod playback;
mod provision;
mod reader;
mod runtime;
mod snapshot;
mod theme;
mod viewer;

pub use camera::*;
pub use config::*;
pub use data_url::*;
pub use error::*;
pub use files::*;
pub use generation::*;
pub use loader::*;
pub use options::*;
pub use playback::*;
pub use provision::*;
pub use reader::*;
pub use runtime::*;
pub use snapshot::*;
pub use theme::*;
pub use viewer::*;

#[cfg(test)]
mod test_support;








#[cfg(test)]
mod snapshot_tests;
