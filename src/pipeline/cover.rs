use std::path::PathBuf;

use crate::{
    info,
    management::{CacheError, CoverCache},
    providers::CoverSource,
    success, warning,
};

/// Ordered cover sources backed by the content-addressed cache.
pub struct CoverResolver {
    sources: Vec<Box<dyn CoverSource>>,
    cache: CoverCache,
}

impl CoverResolver {
    pub fn new(sources: Vec<Box<dyn CoverSource>>, cache: CoverCache) -> Self {
        Self { sources, cache }
    }

    /// Asks each source in turn and caches the first image found.
    ///
    /// Returns the cache path of the image, or `None` when every source came back
    /// empty. Only cache I/O errors are returned as errors.
    pub async fn resolve(&self, artist: &str, album: &str) -> Result<Option<PathBuf>, CacheError> {
        for source in &self.sources {
            match source.fetch_cover(artist, album).await {
                Ok(Some(image)) if !image.is_empty() => {
                    success!("Found cover on {}", source.name());
                    return self.cache.save(&image).await.map(Some);
                }
                Ok(_) => info!(
                    "{} cover not found for {} - {}",
                    source.name(),
                    artist,
                    album
                ),
                Err(e) => warning!("{} cover lookup failed: {}", source.name(), e),
            }
        }
        Ok(None)
    }
}
