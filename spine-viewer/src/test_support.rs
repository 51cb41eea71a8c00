//! In-memory doubles for the reader, uploader, runtime and surface seams.

use std::cell::RefCell;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::{
    Bounds, Camera, DataUrl, FileReader, LoadedAsset, NamedFile, PageImage, RenderSurface, Rig,
    Scene, SnapshotFormat, SpineRuntime, SurfaceSize, TextureUploader, ViewOptions, ViewerError,
};

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 0.0001,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

/// What `readAsDataURL` / `toDataURL` would hand back for `bytes`.
pub(crate) fn data_url(mime: &str, bytes: &[u8]) -> DataUrl {
    DataUrl::parse(&format!("data:{mime};base64,{}", STANDARD.encode(bytes))).unwrap()
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

#[derive(Clone, Debug)]
pub(crate) struct MemFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl MemFile {
    pub fn text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    pub fn png(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            bytes: png_bytes(width, height),
        }
    }
}

impl NamedFile for MemFile {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Records every read as `"<kind>:<file>"`.
#[derive(Default)]
pub(crate) struct MemReader {
    pub reads: RefCell<Vec<String>>,
    pub fail_on: Option<String>,
}

impl MemReader {
    fn record(&self, kind: &str, file: &MemFile) -> Result<(), ViewerError> {
        self.reads.borrow_mut().push(format!("{kind}:{}", file.name));
        if self.fail_on.as_deref() == Some(file.name.as_str()) {
            return Err(ViewerError::Read {
                file: file.name.clone(),
                message: "simulated read error".to_string(),
            });
        }
        Ok(())
    }
}

impl FileReader for MemReader {
    type File = MemFile;

    async fn read_text(&self, file: &MemFile) -> Result<String, ViewerError> {
        self.record("text", file)?;
        String::from_utf8(file.bytes.clone()).map_err(|e| ViewerError::Read {
            file: file.name.clone(),
            message: e.to_string(),
        })
    }

    async fn read_bytes(&self, file: &MemFile) -> Result<Vec<u8>, ViewerError> {
        self.record("bytes", file)?;
        Ok(file.bytes.clone())
    }

    async fn read_data_url(&self, file: &MemFile) -> Result<DataUrl, ViewerError> {
        self.record("data-url", file)?;
        Ok(data_url("image/png", &file.bytes))
    }
}

#[derive(Default)]
pub(crate) struct FakeUploader {
    pub uploads: Vec<(String, u32, u32)>,
}

impl TextureUploader for FakeUploader {
    type Texture = String;

    fn upload(&mut self, page: &str, image: &PageImage) -> Result<String, ViewerError> {
        self.uploads
            .push((page.to_string(), image.width, image.height));
        Ok(format!("tex:{page}"))
    }
}

/// Skeleton "exports" understood by [`FakeRuntime`]: a small JSON document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FakeSkeleton {
    pub animations: Vec<String>,
    pub skins: Vec<String>,
    /// `[x, y, w, h]`.
    pub bounds: Option<[f32; 4]>,
}

pub(crate) fn skeleton_json(animations: &[&str], skins: &[&str], bounds: [f32; 4]) -> String {
    serde_json::json!({
        "animations": animations,
        "skins": skins,
        "bounds": bounds,
    })
    .to_string()
}

/// Atlas format: one page name per non-empty line. A line `!bad` is a parse error.
pub(crate) struct FakeRuntime;

impl SpineRuntime for FakeRuntime {
    type Atlas = Vec<String>;
    type SkeletonData = FakeSkeleton;
    type Rig = FakeRig;

    fn parse_atlas(&self, text: &str) -> Result<Vec<String>, ViewerError> {
        let pages = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        if pages.iter().any(|p| p == "!bad") {
            return Err(ViewerError::Parse {
                what: "atlas",
                message: "bad page line".to_string(),
            });
        }
        Ok(pages)
    }

    fn atlas_page_names(&self, atlas: &Vec<String>) -> Vec<String> {
        atlas.clone()
    }

    fn parse_skeleton(
        &self,
        _atlas: &Vec<String>,
        source: LoadedAsset,
    ) -> Result<FakeSkeleton, ViewerError> {
        let text = match source {
            LoadedAsset::Text(text) => text,
            LoadedAsset::Binary(bytes) => String::from_utf8(bytes).unwrap_or_default(),
        };
        serde_json::from_str(&text).map_err(|e| ViewerError::Parse {
            what: "skeleton",
            message: e.to_string(),
        })
    }

    fn instantiate(&self, _atlas: Vec<String>, data: FakeSkeleton) -> FakeRig {
        FakeRig {
            data,
            ..FakeRig::default()
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeRig {
    pub data: FakeSkeleton,
    pub skin: Option<String>,
    pub animation: Option<(String, bool)>,
    pub time: f32,
    pub calls: Vec<&'static str>,
}

impl Rig for FakeRig {
    fn animation_names(&self) -> Vec<String> {
        self.data.animations.clone()
    }

    fn skin_names(&self) -> Vec<String> {
        self.data.skins.clone()
    }

    fn set_skin(&mut self, name: &str) -> Result<(), ViewerError> {
        self.calls.push("set_skin");
        if !self.data.skins.iter().any(|s| s == name) {
            return Err(ViewerError::UnknownSkin {
                name: name.to_string(),
            });
        }
        self.skin = Some(name.to_string());
        Ok(())
    }

    fn set_animation(&mut self, name: &str, looping: bool) -> Result<(), ViewerError> {
        self.calls.push("set_animation");
        self.animation = Some((name.to_string(), looping));
        self.time = 0.0;
        Ok(())
    }

    fn set_to_setup_pose(&mut self) {
        self.calls.push("set_to_setup_pose");
    }

    fn set_slots_to_setup_pose(&mut self) {
        self.calls.push("set_slots_to_setup_pose");
    }

    fn update_world_transform(&mut self) {
        self.calls.push("update_world_transform");
    }

    fn advance(&mut self, delta: f32) {
        self.calls.push("advance");
        self.time += delta;
    }

    fn apply(&mut self) {
        self.calls.push("apply");
    }

    fn bounds(&self) -> Option<Bounds> {
        self.data.bounds.map(|[x, y, w, h]| Bounds {
            offset: [x, y],
            size: [w, h],
        })
    }
}

pub(crate) type FakeScene = Scene<FakeRig, String>;

pub(crate) fn fake_scene(skeleton: FakeSkeleton) -> FakeScene {
    let bounds = FakeRig {
        data: skeleton.clone(),
        ..FakeRig::default()
    }
    .bounds()
    .unwrap_or(Bounds {
        offset: [0.0, 0.0],
        size: [0.0, 0.0],
    });
    Scene {
        animations: skeleton.animations.clone(),
        skins: skeleton.skins.clone(),
        current_animation: skeleton.animations.first().cloned(),
        current_skin: None,
        rig: FakeRig {
            data: skeleton,
            ..FakeRig::default()
        },
        textures: Vec::new(),
        bounds,
        skeleton_file: "fake.json".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawCall {
    pub size: SurfaceSize,
    pub camera: Camera,
    pub options: ViewOptions,
    pub had_scene: bool,
    pub rig_time: Option<f32>,
}

pub(crate) struct FakeSurface {
    pub size: SurfaceSize,
    pub draws: Vec<DrawCall>,
    pub resizes: Vec<SurfaceSize>,
    /// Formats this surface can encode; anything else comes back as PNG.
    pub webp_supported: bool,
    pub fail_draw: bool,
    /// Largest width or height the surface accepts; larger requests are clamped.
    pub max_dimension: u32,
}

impl FakeSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            draws: Vec::new(),
            resizes: Vec::new(),
            webp_supported: true,
            fail_draw: false,
            max_dimension: u32::MAX,
        }
    }
}

impl RenderSurface for FakeSurface {
    type Rig = FakeRig;
    type Texture = String;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> SurfaceSize {
        let applied = SurfaceSize::new(
            size.width.min(self.max_dimension),
            size.height.min(self.max_dimension),
        );
        self.size = applied;
        self.resizes.push(applied);
        applied
    }

    fn draw(
        &mut self,
        scene: Option<&Scene<FakeRig, String>>,
        camera: &Camera,
        options: &ViewOptions,
    ) -> Result<(), ViewerError> {
        if self.fail_draw {
            return Err(ViewerError::RenderingUnavailable {
                message: "surface lost".to_string(),
            });
        }
        self.draws.push(DrawCall {
            size: self.size,
            camera: *camera,
            options: *options,
            had_scene: scene.is_some(),
            rig_time: scene.map(|s| s.rig.time),
        });
        Ok(())
    }

    fn capture(&mut self, format: SnapshotFormat) -> Result<DataUrl, ViewerError> {
        let mime = match format {
            SnapshotFormat::Webp if self.webp_supported => "image/webp",
            _ => "image/png",
        };
        Ok(data_url(mime, &png_bytes(1, 1)))
    }
}
