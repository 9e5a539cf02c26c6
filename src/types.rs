use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Tag state of one file as last read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSnapshot {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub has_cover: bool,
}

impl TagSnapshot {
    /// Artist, album and cover are all present.
    pub fn is_complete(&self) -> bool {
        self.has_cover && self.artist.is_some() && self.album.is_some()
    }
}

/// Fields to write; an absent album leaves the existing frame alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFields {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
}

/// Result of one successful metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
}

impl From<&ResolvedMetadata> for TagFields {
    fn from(meta: &ResolvedMetadata) -> Self {
        TagFields {
            artist: meta.artist.clone(),
            title: meta.title.clone(),
            album: meta.album.clone(),
        }
    }
}

/// Artist/title guess taken from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub artist: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Skipped,
    Processed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Skipped => write!(f, "skipped"),
            FileStatus::Processed => write!(f, "processed"),
        }
    }
}

/// Outcome of one file in a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub detail: String,
}

#[derive(Tabled)]
pub struct ReportTableRow {
    pub file: String,
    pub status: String,
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Upstream payloads. Every field is optional: responses are untrusted and
// missing data turns into a not-found at the adapter.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MbRecordingSearch {
    #[serde(default)]
    pub recordings: Vec<MbRecording>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MbRecording {
    pub title: Option<String>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<MbArtistCredit>,
    #[serde(default)]
    pub releases: Vec<MbReleaseRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MbArtistCredit {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MbReleaseRef {
    pub id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MbReleaseSearch {
    #[serde(default)]
    pub releases: Vec<MbReleaseRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItunesSearch {
    #[serde(default)]
    pub results: Vec<ItunesResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItunesResult {
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub artwork_url100: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DdgImageSearch {
    #[serde(default)]
    pub results: Vec<DdgImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DdgImage {
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcrResponse {
    pub status: Option<AcrStatus>,
    pub metadata: Option<AcrMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcrStatus {
    pub code: Option<i64>,
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcrMetadata {
    #[serde(default)]
    pub music: Vec<AcrMusic>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcrMusic {
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<AcrNamed>,
    pub album: Option<AcrNamed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcrNamed {
    pub name: Option<String>,
}
