//! The seam between the viewer and the Spine runtime that does the actual animation work.

use crate::{Bounds, LoadedAsset, ViewerError};

/// Parses Spine exports and builds pose-able instances.
pub trait SpineRuntime {
    type Atlas;
    type SkeletonData;
    type Rig: Rig;

    fn parse_atlas(&self, text: &str) -> Result<Self::Atlas, ViewerError>;

    /// Page image names in declaration order.
    fn atlas_page_names(&self, atlas: &Self::Atlas) -> Vec<String>;

    /// `source` is text for JSON exports and a byte buffer for binary exports.
    fn parse_skeleton(
        &self,
        atlas: &Self::Atlas,
        source: LoadedAsset,
    ) -> Result<Self::SkeletonData, ViewerError>;

    fn instantiate(&self, atlas: Self::Atlas, data: Self::SkeletonData) -> Self::Rig;
}

/// A skeleton instance together with its animation state.
pub trait Rig {
    /// Animation names in declared order.
    fn animation_names(&self) -> Vec<String>;

    /// Skin names in declared order.
    fn skin_names(&self) -> Vec<String>;

    fn set_skin(&mut self, name: &str) -> Result<(), ViewerError>;

    /// Sets `name` on track 0, replacing whatever was playing.
    fn set_animation(&mut self, name: &str, looping: bool) -> Result<(), ViewerError>;

    fn set_to_setup_pose(&mut self);

    fn set_slots_to_setup_pose(&mut self);

    fn update_world_transform(&mut self);

    /// Advances the animation clock by `delta` seconds.
    fn advance(&mut self, delta: f32);

    /// Poses the skeleton from the current animation state (without advancing time).
    fn apply(&mut self);

    /// Axis-aligned bounds of the currently posed, visible attachments.
    fn bounds(&self) -> Option<Bounds>;

    /// One playing frame: advance, pose, recompute world transforms.
    fn update(&mut self, delta: f32) {
        self.advance(delta);
        self.apply();
        self.update_world_transform();
    }
}
