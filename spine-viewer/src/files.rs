use std::collections::HashMap;

use crate::ViewerError;

/// Anything the user handed us that has a file name.
pub trait NamedFile {
    fn name(&self) -> &str;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FileRole {
    Skeleton,
    Atlas,
    Image,
}

impl FileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Skeleton => "skeleton (.skel/.json)",
            FileRole::Atlas => "atlas (.atlas)",
            FileRole::Image => "texture image",
        }
    }

    /// Classifies a file name by its lowercased extension.
    pub fn classify(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "skel" | "json" => Some(FileRole::Skeleton),
            "atlas" => Some(FileRole::Atlas),
            "png" | "jpg" | "jpeg" | "webp" => Some(FileRole::Image),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SkeletonFormat {
    Json,
    Binary,
}

impl SkeletonFormat {
    pub fn from_file_name(name: &str) -> Self {
        let is_json = name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("json"));
        if is_json {
            SkeletonFormat::Json
        } else {
            SkeletonFormat::Binary
        }
    }
}

/// A classified file selection: exactly one skeleton, one atlas and at least one image.
#[derive(Debug)]
pub struct SelectedFileSet<F> {
    files: Vec<F>,
    by_name: HashMap<String, usize>,
    skeleton: usize,
    atlas: usize,
    images: Vec<usize>,
}

impl<F: NamedFile> SelectedFileSet<F> {
    /// Classifies `files`. Later files win when two share the skeleton or atlas role.
    pub fn resolve(files: Vec<F>) -> Result<Self, ViewerError> {
        let mut by_name = HashMap::new();
        let mut skeleton = None;
        let mut atlas = None;
        let mut images = Vec::new();

        for (i, file) in files.iter().enumerate() {
            match FileRole::classify(file.name()) {
                Some(FileRole::Skeleton) => skeleton = Some(i),
                Some(FileRole::Atlas) => atlas = Some(i),
                Some(FileRole::Image) => images.push(i),
                None => log::debug!("ignoring unrecognised file {}", file.name()),
            }
            by_name.insert(file.name().to_string(), i);
        }

        let mut missing = Vec::new();
        if skeleton.is_none() {
            missing.push(FileRole::Skeleton);
        }
        if atlas.is_none() {
            missing.push(FileRole::Atlas);
        }
        if images.is_empty() {
            missing.push(FileRole::Image);
        }
        let (Some(skeleton), Some(atlas), false) = (skeleton, atlas, images.is_empty()) else {
            return Err(ViewerError::MissingFiles { missing });
        };

        Ok(Self {
            files,
            by_name,
            skeleton,
            atlas,
            images,
        })
    }

    pub fn skeleton(&self) -> &F {
        &self.files[self.skeleton]
    }

    pub fn skeleton_format(&self) -> SkeletonFormat {
        SkeletonFormat::from_file_name(self.skeleton().name())
    }

    pub fn atlas(&self) -> &F {
        &self.files[self.atlas]
    }

    pub fn images(&self) -> impl Iterator<Item = &F> {
        self.images.iter().map(|&i| &self.files[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&F> {
        self.by_name.get(name).map(|&i| &self.files[i])
    }

    /// The image backing an atlas page: exact name match, else the only uploaded image.
    pub fn page_image(&self, page_name: &str) -> Option<&F> {
        if let Some(file) = self.by_name(page_name) {
            if FileRole::classify(file.name()) == Some(FileRole::Image) {
                return Some(file);
            }
        }
        match self.images.as_slice() {
            [only] => Some(&self.files[*only]),
            _ => None,
        }
    }
}
