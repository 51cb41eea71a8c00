//! `spine2d` behind the viewer's runtime seam.

use std::sync::Arc;

use spine2d::{
    AnimationState, AnimationStateData, Atlas, BlendMode, Draw, DrawList, Skeleton, SkeletonData,
    Vertex,
};
use spine_viewer::{Bounds, LoadedAsset, Rig, SpineRuntime, ViewerError};

/// Texture key of the 1x1 white texture the debug overlay is drawn with.
pub const DEBUG_TEXTURE: &str = "__spine_viewer_debug";

const BONE_LINE_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const BONE_ORIGIN_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const NO_DARK_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Parses exports with `spine2d`.
#[derive(Copy, Clone, Debug, Default)]
pub struct SpineBackend;

/// Skeleton data plus the skin and animation order of the export it was read from.
#[derive(Clone, Debug)]
pub struct ParsedSkeleton {
    pub data: Arc<SkeletonData>,
    pub skin_order: Vec<String>,
    pub animation_order: Vec<String>,
}

impl ParsedSkeleton {
    pub(crate) fn new(data: Arc<SkeletonData>, declared: DeclaredOrder) -> Self {
        let skin_order = ordered_skins(&data, declared.skins);
        let animation_order = ordered_animations(&data, declared.animations);
        Self {
            data,
            skin_order,
            animation_order,
        }
    }
}

impl SpineRuntime for SpineBackend {
    type Atlas = Atlas;
    type SkeletonData = ParsedSkeleton;
    type Rig = SpineRig;

    fn parse_atlas(&self, text: &str) -> Result<Atlas, ViewerError> {
        Atlas::from_str(text).map_err(|e| ViewerError::Parse {
            what: "atlas",
            message: e.to_string(),
        })
    }

    fn atlas_page_names(&self, atlas: &Atlas) -> Vec<String> {
        atlas.pages.iter().map(|p| p.name.clone()).collect()
    }

    fn parse_skeleton(
        &self,
        _atlas: &Atlas,
        source: LoadedAsset,
    ) -> Result<ParsedSkeleton, ViewerError> {
        match source {
            LoadedAsset::Text(text) => {
                let data = SkeletonData::from_json_str(&text).map_err(skeleton_parse_error)?;
                Ok(ParsedSkeleton::new(data, DeclaredOrder::from_json(&text)))
            }
            LoadedAsset::Binary(bytes) => {
                let data = SkeletonData::from_skel_bytes(&bytes).map_err(skeleton_parse_error)?;
                Ok(ParsedSkeleton::new(data, DeclaredOrder::default()))
            }
        }
    }

    fn instantiate(&self, atlas: Atlas, data: ParsedSkeleton) -> SpineRig {
        SpineRig::new(atlas, data)
    }
}

fn skeleton_parse_error(e: spine2d::Error) -> ViewerError {
    ViewerError::Parse {
        what: "skeleton",
        message: e.to_string(),
    }
}

fn runtime_error(e: spine2d::Error) -> ViewerError {
    match e {
        spine2d::Error::UnknownAnimation { name } => ViewerError::UnknownAnimation { name },
        spine2d::Error::UnknownSkin { name } => ViewerError::UnknownSkin { name },
        other => ViewerError::Runtime {
            message: other.to_string(),
        },
    }
}

/// Skin and animation names in the order a JSON export declares them.
///
/// `spine2d` keys both by name, so the order is read back from the document itself. 4.x exports
/// list skins as an array of objects, 3.x exports as an object keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeclaredOrder {
    pub skins: Vec<String>,
    pub animations: Vec<String>,
}

impl DeclaredOrder {
    pub fn from_json(json: &str) -> Self {
        let Ok(doc) = serde_json::from_str::<serde_json::Value>(json) else {
            return Self::default();
        };
        let skins = match doc.get("skins") {
            Some(serde_json::Value::Array(skins)) => skins
                .iter()
                .filter_map(|s| s.get("name")?.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::Object(skins)) => skins.keys().cloned().collect(),
            _ => Vec::new(),
        };
        let animations = match doc.get("animations") {
            Some(serde_json::Value::Object(animations)) => animations.keys().cloned().collect(),
            _ => Vec::new(),
        };
        Self { skins, animations }
    }
}

/// Declared skins first; anything else follows with `default` leading and the rest by name.
///
/// Binary exports carry no declared order here, so their skins come out entirely from the
/// fallback: `default`, then alphabetical.
fn ordered_skins(data: &SkeletonData, declared: Vec<String>) -> Vec<String> {
    let mut order = Vec::with_capacity(data.skins.len());
    for name in declared {
        if data.skins.contains_key(&name) && !order.contains(&name) {
            order.push(name);
        }
    }

    let mut rest = data
        .skins
        .keys()
        .filter(|name| !order.contains(*name))
        .cloned()
        .collect::<Vec<_>>();
    rest.sort_by(|a, b| {
        (a != "default")
            .cmp(&(b != "default"))
            .then_with(|| a.cmp(b))
    });
    order.extend(rest);
    order
}

/// Declared animations first, then any the document did not name, in runtime order.
fn ordered_animations(data: &SkeletonData, declared: Vec<String>) -> Vec<String> {
    let mut order = Vec::with_capacity(data.animations.len());
    for name in declared {
        if data.animation(&name).is_some() && !order.contains(&name) {
            order.push(name);
        }
    }
    for animation in &data.animations {
        if !order.contains(&animation.name) {
            order.push(animation.name.clone());
        }
    }
    order
}

/// A posed `spine2d` skeleton and its animation state.
pub struct SpineRig {
    atlas: Atlas,
    skeleton: Skeleton,
    state: AnimationState,
    skin_order: Vec<String>,
    animation_order: Vec<String>,
}

impl SpineRig {
    pub fn new(atlas: Atlas, parsed: ParsedSkeleton) -> Self {
        let state = AnimationState::new(AnimationStateData::new(parsed.data.clone()));
        Self {
            atlas,
            skeleton: Skeleton::new(parsed.data),
            state,
            skin_order: parsed.skin_order,
            animation_order: parsed.animation_order,
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Appends the attachments of the current pose.
    ///
    /// `premultiplied_alpha` selects the blend pipelines regardless of what the atlas pages
    /// declare.
    pub fn append_draw_list(&self, out: &mut DrawList, premultiplied_alpha: bool) {
        let first_draw = out.draws.len();
        spine2d::append_draw_list_with_atlas(out, &self.skeleton, &self.atlas);
        for draw in &mut out.draws[first_draw..] {
            draw.premultiplied_alpha = premultiplied_alpha;
        }
    }

    /// Appends bone lines and bone origins, sized for `world_per_pixel` (the camera zoom).
    pub fn append_debug_overlay(&self, out: &mut DrawList, world_per_pixel: f32) {
        let bones = &self.skeleton.bones;
        let segments = bones.iter().filter_map(|bone| {
            let parent = bones.get(bone.parent_index()?)?;
            Some(([parent.world_x, parent.world_y], [bone.world_x, bone.world_y]))
        });
        let origins = bones.iter().map(|bone| [bone.world_x, bone.world_y]);
        append_bone_overlay(out, segments, origins, world_per_pixel);
    }
}

impl Rig for SpineRig {
    fn animation_names(&self) -> Vec<String> {
        self.animation_order.clone()
    }

    fn skin_names(&self) -> Vec<String> {
        self.skin_order.clone()
    }

    fn set_skin(&mut self, name: &str) -> Result<(), ViewerError> {
        self.skeleton.set_skin(Some(name)).map_err(runtime_error)
    }

    fn set_animation(&mut self, name: &str, looping: bool) -> Result<(), ViewerError> {
        self.state
            .set_animation(0, name, looping)
            .map(|_| ())
            .map_err(runtime_error)
    }

    fn set_to_setup_pose(&mut self) {
        self.skeleton.set_to_setup_pose();
    }

    fn set_slots_to_setup_pose(&mut self) {
        // spine2d resets bones and slots together.
        self.skeleton.set_to_setup_pose();
    }

    fn update_world_transform(&mut self) {
        self.skeleton.update_world_transform();
    }

    fn advance(&mut self, delta: f32) {
        self.state.update(delta);
    }

    fn apply(&mut self) {
        self.skeleton.set_to_setup_pose();
        self.state.apply(&mut self.skeleton);
    }

    fn update(&mut self, delta: f32) {
        self.state.update(delta);
        self.apply();
        self.skeleton.update(delta);
        self.skeleton.update_world_transform();
    }

    fn bounds(&self) -> Option<Bounds> {
        let mut draw_list = DrawList::default();
        spine2d::append_draw_list_with_atlas(&mut draw_list, &self.skeleton, &self.atlas);
        Bounds::from_points(draw_list.vertices.iter().map(|v| v.position))
    }
}

/// Thin quads along `segments` and small squares at `origins`, as one draw on [`DEBUG_TEXTURE`].
pub fn append_bone_overlay(
    out: &mut DrawList,
    segments: impl IntoIterator<Item = ([f32; 2], [f32; 2])>,
    origins: impl IntoIterator<Item = [f32; 2]>,
    world_per_pixel: f32,
) {
    let px = if world_per_pixel.is_finite() && world_per_pixel > 0.0 {
        world_per_pixel
    } else {
        1.0
    };
    let first_index = out.indices.len();

    for (from, to) in segments {
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1.0e-6 {
            continue;
        }
        let nx = -dy / len * px;
        let ny = dx / len * px;
        push_quad(
            out,
            [
                [from[0] + nx, from[1] + ny],
                [to[0] + nx, to[1] + ny],
                [to[0] - nx, to[1] - ny],
                [from[0] - nx, from[1] - ny],
            ],
            BONE_LINE_COLOR,
        );
    }

    let half = 2.0 * px;
    for [x, y] in origins {
        push_quad(
            out,
            [
                [x - half, y - half],
                [x + half, y - half],
                [x + half, y + half],
                [x - half, y + half],
            ],
            BONE_ORIGIN_COLOR,
        );
    }

    let index_count = out.indices.len() - first_index;
    if index_count > 0 {
        out.draws.push(Draw {
            texture_path: DEBUG_TEXTURE.to_string(),
            blend: BlendMode::Normal,
            premultiplied_alpha: false,
            first_index,
            index_count,
        });
    }
}

fn push_quad(out: &mut DrawList, corners: [[f32; 2]; 4], color: [f32; 4]) {
    let base = out.vertices.len() as u32;
    for position in corners {
        out.vertices.push(Vertex {
            position,
            uv: [0.5, 0.5],
            color,
            dark_color: NO_DARK_COLOR,
        });
    }
    out.indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
}
