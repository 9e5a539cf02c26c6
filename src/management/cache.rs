use std::{fmt, io::Error, path::PathBuf};

use crate::utils;

#[derive(Debug)]
pub enum CacheError {
    IoError(Error),
}

impl From<Error> for CacheError {
    fn from(err: Error) -> Self {
        CacheError::IoError(err)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::IoError(e) => write!(f, "cover cache I/O error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Flat directory of cover images named `<sha256>.jpg`.
///
/// An entry's name depends only on its bytes, so the same image fetched for
/// many files is stored once.
#[derive(Debug, Clone)]
pub struct CoverCache {
    dir: PathBuf,
}

impl CoverCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, digest: &str) -> PathBuf {
        self.dir.join(format!("{digest}.jpg"))
    }

    /// Stores `bytes` unless an entry with the same digest exists, and returns
    /// the entry's path either way.
    ///
    /// New entries are written to a uniquely named partial file and renamed into
    /// place, so a reader never sees a half-written image. Two writers racing on
    /// the same digest rename identical content over each other.
    pub async fn save(&self, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        async_fs::create_dir_all(&self.dir).await?;

        let digest = utils::content_digest(bytes);
        let path = self.path_for(&digest);
        if async_fs::metadata(&path).await.is_ok() {
            return Ok(path);
        }

        let partial = self
            .dir
            .join(format!(".{digest}.{}.part", utils::random_suffix(8)));
        async_fs::write(&partial, bytes).await?;
        if let Err(e) = async_fs::rename(&partial, &path).await {
            let _ = async_fs::remove_file(&partial).await;
            return Err(CacheError::IoError(e));
        }

        Ok(path)
    }

    /// Reads the entry for `digest`, `None` if it was never stored.
    pub async fn load(&self, digest: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match async_fs::read(self.path_for(digest)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::IoError(e)),
        }
    }
}
