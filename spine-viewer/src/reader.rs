use crate::{DataUrl, NamedFile, ViewerError};

/// Skeleton file content, handed to the runtime by the pipeline stage that read it. Page images
/// travel as [`DataUrl`]s and decode to [`crate::PageImage`].
#[derive(Clone, Debug)]
pub enum LoadedAsset {
    Text(String),
    Binary(Vec<u8>),
}

/// Reads user files. Each call resolves exactly once; there are no retries.
///
/// The viewer runs on a single-threaded event loop, so the futures are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait FileReader {
    type File: NamedFile;

    async fn read_text(&self, file: &Self::File) -> Result<String, ViewerError>;

    async fn read_bytes(&self, file: &Self::File) -> Result<Vec<u8>, ViewerError>;

    async fn read_data_url(&self, file: &Self::File) -> Result<DataUrl, ViewerError>;
}
