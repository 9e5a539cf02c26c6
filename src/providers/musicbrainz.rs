use async_trait::async_trait;

use crate::{
    Res,
    http::{HttpClient, HttpError},
    info,
    providers::MetadataSearch,
    types::{MbRecordingSearch, MbReleaseSearch, ResolvedMetadata},
    utils, warning,
};

/// MusicBrainz web service client.
///
/// Used twice in the pipeline: as the first metadata search and, through
/// [`crate::providers::MusicBrainzCovers`], to find the release id whose front
/// cover is then fetched from the Cover Art Archive.
#[derive(Debug, Clone)]
pub struct MusicBrainz {
    http: HttpClient,
    base_url: String,
}

impl MusicBrainz {
    pub fn new(http: HttpClient, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Searches recordings and returns the best match.
    ///
    /// With a known artist the query is exact
    /// (`artist:"A" AND recording:"T"`), otherwise it is a loose title query
    /// (`recording:"T" OR "T"`).
    pub async fn search_recording(
        &self,
        artist: Option<&str>,
        title: &str,
    ) -> Result<Option<ResolvedMetadata>, HttpError> {
        let url = format!(
            "{base}/recording/?query={query}&fmt=json",
            base = self.base_url,
            query = urlencoding::encode(&recording_query(artist, title))
        );
        let search: MbRecordingSearch = self.http.get_json(&url).await?;
        Ok(recording_to_metadata(search, artist))
    }

    /// Searches releases by artist and album and returns the first release id.
    pub async fn search_release(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, HttpError> {
        let query = format!(
            "artist:\"{}\" AND release:\"{}\"",
            escape(artist),
            escape(album)
        );
        let url = format!(
            "{base}/release/?query={query}&fmt=json",
            base = self.base_url,
            query = urlencoding::encode(&query)
        );
        let search: MbReleaseSearch = self.http.get_json(&url).await?;
        Ok(search
            .releases
            .into_iter()
            .next()
            .and_then(|release| release.id)
            .and_then(|id| utils::non_empty(&id)))
    }
}

#[async_trait]
impl MetadataSearch for MusicBrainz {
    fn name(&self) -> &'static str {
        "MusicBrainz"
    }

    async fn search(&self, artist: Option<&str>, title: &str) -> Res<Option<ResolvedMetadata>> {
        info!(
            "Searching MusicBrainz for: {}{}",
            artist.map(|a| format!("{a} - ")).unwrap_or_default(),
            title
        );
        match self.search_recording(artist, title).await {
            Ok(found) => Ok(found),
            Err(e) => {
                warning!("MusicBrainz search failed: {}", e);
                Ok(None)
            }
        }
    }
}

/// Lucene phrase queries break on embedded quotes.
fn escape(value: &str) -> String {
    value.replace('"', "")
}

pub fn recording_query(artist: Option<&str>, title: &str) -> String {
    let title = escape(title);
    match artist {
        Some(artist) => format!("artist:\"{}\" AND recording:\"{}\"", escape(artist), title),
        None => format!("recording:\"{title}\" OR \"{title}\""),
    }
}

/// First recording of a search result, or `None` when title or artist is missing.
///
/// The artist comes from the first artist credit and falls back to the artist
/// that was searched for.
pub fn recording_to_metadata(
    search: MbRecordingSearch,
    queried_artist: Option<&str>,
) -> Option<ResolvedMetadata> {
    let recording = search.recordings.into_iter().next()?;
    let title = recording.title.as_deref().and_then(utils::non_empty)?;
    let artist = recording
        .artist_credit
        .first()
        .and_then(|credit| credit.name.as_deref())
        .and_then(utils::non_empty)
        .or_else(|| queried_artist.and_then(utils::non_empty))?;
    let album = recording
        .releases
        .first()
        .and_then(|release| release.title.as_deref())
        .and_then(utils::non_empty);

    Some(ResolvedMetadata {
        artist,
        title,
        album,
    })
}
