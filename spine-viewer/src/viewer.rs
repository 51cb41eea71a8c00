use crate::{
    Camera, DataUrl, LoadGeneration, LoadTicket, PlayState, Playback, Rig, Scene, SnapshotFormat,
    SurfaceSize, ViewOptions, ViewerConfig, ViewerError,
};

/// Where frames go: a GPU canvas in the browser, a recording fake in tests.
pub trait RenderSurface {
    type Rig: Rig;
    type Texture;

    fn size(&self) -> SurfaceSize;

    /// Resizes the backing buffer and returns the size actually applied, which may be smaller
    /// than requested when the device limits it.
    fn resize(&mut self, size: SurfaceSize) -> SurfaceSize;

    /// Clears with `options.clear_color`, then draws `scene` (if any) through `camera`.
    fn draw(
        &mut self,
        scene: Option<&Scene<Self::Rig, Self::Texture>>,
        camera: &Camera,
        options: &ViewOptions,
    ) -> Result<(), ViewerError>;

    /// Encodes what was drawn last.
    fn capture(&mut self, format: SnapshotFormat) -> Result<DataUrl, ViewerError>;
}

/// The viewer context: the installed scene plus everything the render loop mutates.
pub struct Viewer<R, T> {
    pub(crate) scene: Option<Scene<R, T>>,
    pub(crate) playback: Playback,
    pub(crate) camera: Camera,
    viewport: SurfaceSize,
    fit_padding: f32,
    loads: LoadGeneration,
}

impl<R: Rig, T> Viewer<R, T> {
    pub fn new(config: &ViewerConfig, viewport: SurfaceSize) -> Self {
        Self {
            scene: None,
            playback: Playback::new(config.speed),
            camera: Camera::default(),
            viewport,
            fit_padding: config.fit_padding,
            loads: LoadGeneration::default(),
        }
    }

    pub fn scene(&self) -> Option<&Scene<R, T>> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn viewport(&self) -> SurfaceSize {
        self.viewport
    }

    pub fn play_state(&self) -> PlayState {
        self.playback.state
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Starts a load. Any load still in flight becomes stale.
    pub fn begin_load(&self) -> LoadTicket {
        self.loads.begin()
    }

    /// Replaces the current scene with `scene` if `ticket` is still the newest load.
    pub fn install(&mut self, ticket: &LoadTicket, scene: Scene<R, T>) -> Result<&Scene<R, T>, ViewerError> {
        ticket.ensure_current()?;
        self.camera = Camera::fit(scene.bounds, self.viewport, self.fit_padding);
        self.playback.state = PlayState::Playing;
        self.playback.reset_clock();
        log::info!(
            "installed {} (load #{}), camera {:?}",
            scene.skeleton_file,
            ticket.id(),
            self.camera
        );
        // The previous scene is dropped here, after its replacement is fully built.
        let installed: &Scene<R, T> = self.scene.insert(scene);
        Ok(installed)
    }

    /// Viewport changed: refit the camera to the current scene.
    pub fn resize(&mut self, viewport: SurfaceSize) {
        self.viewport = viewport;
        self.refit();
    }

    pub fn refit(&mut self) {
        if let Some(scene) = &self.scene {
            self.camera = Camera::fit(scene.bounds, self.viewport, self.fit_padding);
        }
    }

    pub fn toggle_play(&mut self) -> PlayState {
        self.playback.toggle()
    }

    pub fn set_animation(&mut self, name: &str) -> Result<(), ViewerError> {
        self.scene
            .as_mut()
            .ok_or(ViewerError::NoScene)?
            .set_animation(name)
    }

    pub fn set_skin(&mut self, name: &str) -> Result<(), ViewerError> {
        self.scene.as_mut().ok_or(ViewerError::NoScene)?.set_skin(name)
    }

    /// One render-loop iteration. The surface is cleared and drawn every frame, paused or not.
    pub fn frame<S>(&mut self, ts_ms: f64, surface: &mut S, options: &ViewOptions) -> Result<(), ViewerError>
    where
        S: RenderSurface<Rig = R, Texture = T>,
    {
        let delta = self.playback.tick(ts_ms);
        if let Some(scene) = self.scene.as_mut() {
            if self.playback.is_playing() {
                scene.rig.update(delta);
            }
        }
        surface.draw(self.scene.as_ref(), &self.camera, options)
    }
}
