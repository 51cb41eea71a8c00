use crate::{
    Bounds, FileReader, LoadTicket, LoadedAsset, NamedFile, PageTexture, Rig, SelectedFileSet,
    SkeletonFormat, SpineRuntime, TextureUploader, ViewerError, provision_pages,
};

/// Everything one successful load produced. Replaced wholesale by the next load.
pub struct Scene<R, T> {
    pub rig: R,
    pub textures: Vec<PageTexture<T>>,
    /// Setup-pose bounds, used for camera fitting.
    pub bounds: Bounds,
    pub animations: Vec<String>,
    pub skins: Vec<String>,
    pub current_animation: Option<String>,
    pub current_skin: Option<String>,
    pub skeleton_file: String,
}

impl<R: Rig, T> Scene<R, T> {
    pub fn set_animation(&mut self, name: &str) -> Result<(), ViewerError> {
        if !self.animations.iter().any(|a| a == name) {
            return Err(ViewerError::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.rig.set_animation(name, true)?;
        self.current_animation = Some(name.to_string());
        Ok(())
    }

    /// Switches skin and re-poses immediately so the change shows even while paused.
    pub fn set_skin(&mut self, name: &str) -> Result<(), ViewerError> {
        if !self.skins.iter().any(|s| s == name) {
            return Err(ViewerError::UnknownSkin {
                name: name.to_string(),
            });
        }
        self.rig.set_skin(name)?;
        self.rig.set_slots_to_setup_pose();
        self.rig.apply();
        self.rig.update_world_transform();
        self.current_skin = Some(name.to_string());
        Ok(())
    }
}

/// First skin not named `default`, else the first skin.
pub fn initial_skin(skins: &[String]) -> Option<&str> {
    skins
        .iter()
        .find(|s| s.as_str() != "default")
        .or_else(|| skins.first())
        .map(String::as_str)
}

/// Reads, parses and instantiates one file selection.
///
/// Textures for every atlas page are provisioned before the skeleton is parsed. Nothing outside
/// the returned scene is touched, so a failure leaves the caller's current scene as it was.
pub async fn load_scene<S, R, U>(
    runtime: &S,
    files: &SelectedFileSet<R::File>,
    reader: &R,
    uploader: &mut U,
    ticket: &LoadTicket,
) -> Result<Scene<S::Rig, U::Texture>, ViewerError>
where
    S: SpineRuntime,
    R: FileReader,
    U: TextureUploader,
{
    log::info!(
        "loading skeleton {} with atlas {}",
        files.skeleton().name(),
        files.atlas().name()
    );

    let atlas_text = reader.read_text(files.atlas()).await?;
    ticket.ensure_current()?;
    let atlas = runtime.parse_atlas(&atlas_text)?;
    let pages = runtime.atlas_page_names(&atlas);
    log::info!("atlas parsed: {} page(s)", pages.len());

    let textures = provision_pages(&pages, files, reader, uploader, ticket).await?;

    let source = match files.skeleton_format() {
        SkeletonFormat::Json => LoadedAsset::Text(reader.read_text(files.skeleton()).await?),
        SkeletonFormat::Binary => LoadedAsset::Binary(reader.read_bytes(files.skeleton()).await?),
    };
    ticket.ensure_current()?;
    let data = runtime.parse_skeleton(&atlas, source)?;

    let mut rig = runtime.instantiate(atlas, data);
    rig.set_to_setup_pose();
    rig.update_world_transform();
    let setup_bounds = rig.bounds();

    let animations = rig.animation_names();
    let skins = rig.skin_names();

    let current_skin = initial_skin(&skins).map(str::to_string);
    if let Some(skin) = current_skin.as_deref() {
        rig.set_skin(skin)?;
        rig.set_slots_to_setup_pose();
    }

    // A skeleton whose default skin is empty only has visible bounds once a skin is applied.
    let bounds = setup_bounds.or_else(|| rig.bounds()).unwrap_or(Bounds {
        offset: [0.0, 0.0],
        size: [0.0, 0.0],
    });

    let current_animation = animations.first().cloned();
    if let Some(animation) = current_animation.as_deref() {
        rig.set_animation(animation, true)?;
    }

    log::info!(
        "skeleton loaded: {} animation(s), {} skin(s), bounds {:?}",
        animations.len(),
        skins.len(),
        bounds
    );

    Ok(Scene {
        rig,
        textures,
        bounds,
        animations,
        skins,
        current_animation,
        current_skin,
        skeleton_file: files.skeleton().name().to_string(),
    })
}
