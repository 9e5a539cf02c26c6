use async_trait::async_trait;

use crate::{
    Res,
    http::{HttpClient, HttpError},
    info,
    providers::{CoverSource, MusicBrainz},
    warning,
};

/// Cover Art Archive client.
#[derive(Debug, Clone)]
pub struct CoverArtArchive {
    http: HttpClient,
    base_url: String,
}

impl CoverArtArchive {
    pub fn new(http: HttpClient, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Front cover of a MusicBrainz release.
    pub async fn front_cover(&self, release_id: &str) -> Result<Vec<u8>, HttpError> {
        let url = format!("{}/release/{}/front", self.base_url, release_id);
        self.http.get_bytes(&url).await
    }
}

/// First cover stage: MusicBrainz release lookup, then the archive's front image.
#[derive(Debug, Clone)]
pub struct MusicBrainzCovers {
    musicbrainz: MusicBrainz,
    archive: CoverArtArchive,
}

impl MusicBrainzCovers {
    pub fn new(musicbrainz: MusicBrainz, archive: CoverArtArchive) -> Self {
        Self {
            musicbrainz,
            archive,
        }
    }
}

#[async_trait]
impl CoverSource for MusicBrainzCovers {
    fn name(&self) -> &'static str {
        "MusicBrainz"
    }

    async fn fetch_cover(&self, artist: &str, album: &str) -> Res<Option<Vec<u8>>> {
        let release_id = match self.musicbrainz.search_release(artist, album).await {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(None),
            Err(e) => {
                warning!("MusicBrainz release search failed: {}", e);
                return Ok(None);
            }
        };

        info!("Fetching cover for release {}", release_id);
        match self.archive.front_cover(&release_id).await {
            Ok(bytes) if !bytes.is_empty() => Ok(Some(bytes)),
            Ok(_) => Ok(None),
            Err(e) => {
                warning!("Cover Art Archive has no front cover: {}", e);
                Ok(None)
            }
        }
    }
}
