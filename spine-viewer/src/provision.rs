use crate::{DataUrl, FileReader, LoadTicket, NamedFile, SelectedFileSet, ViewerError};

/// A decoded page image, RGBA8, rows top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PageImage {
    pub fn decode(file: &str, url: &DataUrl) -> Result<Self, ViewerError> {
        let bytes = url.decode()?;
        let img = image::load_from_memory(&bytes).map_err(|e| ViewerError::Decode {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// Turns decoded page images into GPU textures.
///
/// Pages are sampled with linear min and mag filtering and have no mipmaps, whatever filters the
/// atlas declares.
pub trait TextureUploader {
    type Texture;

    fn upload(&mut self, page: &str, image: &PageImage) -> Result<Self::Texture, ViewerError>;
}

/// A page name and the texture attached to it.
#[derive(Debug)]
pub struct PageTexture<T> {
    pub page: String,
    pub texture: T,
}

/// Loads the image of every atlas page, in page order, one page at a time.
pub async fn provision_pages<R, U>(
    pages: &[String],
    files: &SelectedFileSet<R::File>,
    reader: &R,
    uploader: &mut U,
    ticket: &LoadTicket,
) -> Result<Vec<PageTexture<U::Texture>>, ViewerError>
where
    R: FileReader,
    U: TextureUploader,
{
    let mut textures = Vec::with_capacity(pages.len());
    for page in pages {
        let file = files
            .page_image(page)
            .ok_or_else(|| ViewerError::MissingPageImage { page: page.clone() })?;
        if file.name() != page {
            log::info!("atlas page {page} uses uploaded image {}", file.name());
        }

        let url = reader.read_data_url(file).await?;
        ticket.ensure_current()?;

        let image = PageImage::decode(file.name(), &url)?;
        let texture = uploader.upload(page, &image)?;
        log::info!("page texture loaded: {page} ({}x{})", image.width, image.height);
        textures.push(PageTexture {
            page: page.clone(),
            texture,
        });
    }
    Ok(textures)
}
