use crate::{
    Bounds, Camera, ClearColor, DataUrl, RenderSurface, Rig, SnapshotFormat, SnapshotOptions,
    SurfaceSize, ViewOptions, Viewer, ViewerError,
};

/// Output size and camera for one snapshot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapshotPlan {
    pub size: SurfaceSize,
    pub camera: Camera,
    /// Output pixels per world unit.
    pub scale: f32,
}

impl SnapshotPlan {
    /// Scales the content so its longer side is `target_long_side` pixels, then adds
    /// `padding_px` on every edge.
    pub fn new(bounds: Bounds, options: &SnapshotOptions) -> Self {
        let long_side = bounds.long_side();
        let scale = if long_side > 0.0 {
            options.target_long_side as f32 / long_side
        } else {
            1.0
        };
        Self::with_scale(bounds, options.padding_px, scale)
    }

    /// The plan for `options`, with the content scaled down as far as needed to fit `limit`.
    /// `None` when the padding alone does not fit.
    pub fn fit_within(bounds: Bounds, options: &SnapshotOptions, limit: SurfaceSize) -> Option<Self> {
        let plan = Self::new(bounds, options);
        if plan.size.width <= limit.width && plan.size.height <= limit.height {
            return Some(plan);
        }

        let padding = 2.0 * options.padding_px as f32;
        let room = [limit.width as f32 - padding, limit.height as f32 - padding];
        if room[0] < 1.0 || room[1] < 1.0 {
            return None;
        }
        let mut scale = plan.scale;
        for axis in 0..2 {
            if bounds.size[axis] > 0.0 {
                scale = scale.min(room[axis] / bounds.size[axis]);
            }
        }
        Some(Self::with_scale(bounds, options.padding_px, scale))
    }

    fn with_scale(bounds: Bounds, padding_px: u32, scale: f32) -> Self {
        let padding = 2.0 * padding_px as f32;
        let width = (bounds.size[0].max(0.0) * scale + padding).floor().max(1.0) as u32;
        let height = (bounds.size[1].max(0.0) * scale + padding).floor().max(1.0) as u32;

        Self {
            size: SurfaceSize::new(width, height),
            camera: Camera {
                center: bounds.center(),
                zoom: 1.0 / scale,
            },
            scale,
        }
    }
}

/// An exported image ready for download.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub file_name: String,
    pub size: SurfaceSize,
    pub format: SnapshotFormat,
    pub data: DataUrl,
}

/// `spine_snapshot_{w}x{h}.{ext}`.
pub fn snapshot_file_name(size: SurfaceSize, format: SnapshotFormat) -> String {
    format!(
        "spine_snapshot_{}x{}.{}",
        size.width,
        size.height,
        format.extension()
    )
}

impl<R: Rig, T> Viewer<R, T> {
    /// Renders the current pose once at snapshot resolution and encodes it.
    ///
    /// Surface size, camera and play state are restored afterwards whether or not the export
    /// succeeded.
    pub fn export_snapshot<S>(
        &mut self,
        surface: &mut S,
        options: &SnapshotOptions,
        view: &ViewOptions,
    ) -> Result<Snapshot, ViewerError>
    where
        S: RenderSurface<Rig = R, Texture = T>,
    {
        if self.scene.is_none() {
            return Err(ViewerError::NoScene);
        }

        let saved_size = surface.size();
        let saved_camera = self.camera;
        let saved_state = self.playback.state;
        self.playback.state = crate::PlayState::Paused;

        let result = self.render_snapshot(surface, options, view);

        surface.resize(saved_size);
        self.camera = saved_camera;
        self.playback.state = saved_state;
        self.playback.reset_clock();

        match &result {
            Ok(snapshot) => log::info!("snapshot exported: {}", snapshot.file_name),
            Err(e) => log::error!("snapshot failed: {e}"),
        }
        result
    }

    fn render_snapshot<S>(
        &mut self,
        surface: &mut S,
        options: &SnapshotOptions,
        view: &ViewOptions,
    ) -> Result<Snapshot, ViewerError>
    where
        S: RenderSurface<Rig = R, Texture = T>,
    {
        let scene = self.scene.as_mut().ok_or(ViewerError::NoScene)?;
        scene.rig.apply();
        scene.rig.update_world_transform();
        let bounds = scene.rig.bounds().unwrap_or(scene.bounds);

        let mut plan = SnapshotPlan::new(bounds, options);
        let applied = surface.resize(plan.size);
        if applied != plan.size {
            plan = SnapshotPlan::fit_within(bounds, options, applied).ok_or_else(|| {
                ViewerError::Snapshot {
                    message: format!(
                        "{} px of padding does not fit the maximum surface {}x{}",
                        options.padding_px, applied.width, applied.height
                    ),
                }
            })?;
            log::warn!(
                "snapshot scaled down to {}x{} to fit the maximum surface",
                plan.size.width,
                plan.size.height
            );
            plan.size = surface.resize(plan.size);
        }
        self.camera = plan.camera;

        let view = ViewOptions {
            clear_color: ClearColor::TRANSPARENT,
            ..*view
        };
        surface.draw(self.scene.as_ref(), &self.camera, &view)?;
        let data = surface.capture(options.format)?;

        // Browsers without an encoder for the requested type fall back to PNG.
        let format = SnapshotFormat::parse(data.mime()).unwrap_or(options.format);
        if format != options.format {
            log::warn!(
                "requested {} but the surface produced {}",
                options.format.mime(),
                data.mime()
            );
        }

        Ok(Snapshot {
            file_name: snapshot_file_name(plan.size, format),
            size: plan.size,
            format,
            data,
        })
    }
}
