use std::path::Path;

use crate::{
    Res, info,
    providers::{MetadataSearch, Recognizer},
    success,
    tags::TagStore,
    types::{ResolvedMetadata, TagFields, TagSnapshot},
    utils, warning,
};

/// Finds metadata for a file and writes it.
///
/// Strategies, first success wins:
/// 1. audio recognition (only when requested),
/// 2. artist/title guessed from the file name, searched in each text provider
///    in order (only when the file has no artist yet).
pub struct MetadataResolver {
    recognizer: Box<dyn Recognizer>,
    searches: Vec<Box<dyn MetadataSearch>>,
}

impl MetadataResolver {
    pub fn new(recognizer: Box<dyn Recognizer>, searches: Vec<Box<dyn MetadataSearch>>) -> Self {
        Self {
            recognizer,
            searches,
        }
    }

    /// Runs the strategies and, on success, writes the result and re-reads the tags.
    ///
    /// Returns the tag state to continue with: the fresh read after a write, or
    /// `snapshot` unchanged when nothing was found.
    pub async fn enrich(
        &self,
        tags: &dyn TagStore,
        path: &Path,
        snapshot: TagSnapshot,
        recognize: bool,
    ) -> Res<TagSnapshot> {
        let Some(found) = self.resolve(path, &snapshot, recognize).await else {
            if recognize {
                warning!("Audio recognition failed");
            }
            return Ok(snapshot);
        };

        success!(
            "Found metadata: {} - {} ({})",
            found.artist,
            found.title,
            found.album.as_deref().unwrap_or("")
        );
        if let Err(e) = tags.write(path, &TagFields::from(&found)).await {
            warning!("Failed to write tags to {}: {}", path.display(), e);
        }
        tags.read(path).await
    }

    /// The first metadata any strategy produces.
    pub async fn resolve(
        &self,
        path: &Path,
        snapshot: &TagSnapshot,
        recognize: bool,
    ) -> Option<ResolvedMetadata> {
        if recognize {
            info!("Attempting audio recognition via {}...", self.recognizer.name());
            match self.recognizer.recognize(path).await {
                Ok(Some(found)) => return Some(found),
                Ok(None) => {}
                Err(e) => warning!("{} recognition error: {}", self.recognizer.name(), e),
            }
        }

        if snapshot.artist.is_some() {
            return None;
        }

        info!("Missing metadata, attempting to fetch from filename");
        let parsed = utils::parse_filename(path);
        let title = parsed.title?;
        self.search(parsed.artist.as_deref(), &title).await
    }

    async fn search(&self, artist: Option<&str>, title: &str) -> Option<ResolvedMetadata> {
        for provider in &self.searches {
            match provider.search(artist, title).await {
                Ok(Some(found)) => return Some(found),
                Ok(None) => info!("{} search found nothing", provider.name()),
                Err(e) => warning!("{} search error: {}", provider.name(), e),
            }
        }
        None
    }
}
