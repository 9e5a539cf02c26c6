//! # Provider Adapters
//!
//! This module wraps the online services tagfill pulls data from. Each service is
//! exposed through one or more capability traits, and the pipeline only ever sees
//! the traits:
//!
//! ```text
//! Pipeline (metadata resolver, cover chain)
//!          ↓
//! Capability traits
//!     ├── Recognizer       audio fingerprint → metadata
//!     ├── MetadataSearch   (artist?, title) → metadata
//!     └── CoverSource      (artist, album) → image bytes
//!          ↓
//! HttpClient (shared retry policy)
//!          ↓
//! ACRCloud · MusicBrainz · Cover Art Archive · iTunes · DuckDuckGo
//! ```
//!
//! ## Contract
//!
//! Every lookup returns `Ok(Some(..))` on success and `Ok(None)` for anything
//! that means "this provider cannot help": network failures after retries, 4xx
//! answers, empty result lists, payloads missing a required field. Responses are
//! decoded into narrow shapes where every field is optional, so a provider that
//! changes its format degrades to not-found instead of failing the pass.
//!
//! An `Err` from a provider is an unexpected internal error. Callers log it and
//! treat it as not-found.
//!
//! ## Registry
//!
//! [`Providers::standard`] builds the fixed, ordered set used by the CLI:
//!
//! - metadata search: MusicBrainz, then iTunes
//! - cover art: MusicBrainz release + Cover Art Archive, then iTunes, then DuckDuckGo
//! - recognition: ACRCloud

use async_trait::async_trait;
use std::path::Path;

use crate::{
    Res,
    config::Settings,
    http::HttpClient,
    snippet::FfmpegExtractor,
    types::ResolvedMetadata,
};

pub mod acrcloud;
pub mod coverart;
pub mod duckduckgo;
pub mod itunes;
pub mod musicbrainz;

pub use acrcloud::{AcrCloud, AcrCredentials};
pub use coverart::{CoverArtArchive, MusicBrainzCovers};
pub use duckduckgo::DuckDuckGo;
pub use itunes::ITunes;
pub use musicbrainz::MusicBrainz;

/// Text search for track metadata.
#[async_trait]
pub trait MetadataSearch: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, artist: Option<&str>, title: &str) -> Res<Option<ResolvedMetadata>>;
}

/// Cover image lookup by artist and album.
#[async_trait]
pub trait CoverSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_cover(&self, artist: &str, album: &str) -> Res<Option<Vec<u8>>>;
}

/// Identification of a track from its audio.
#[async_trait]
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn recognize(&self, path: &Path) -> Res<Option<ResolvedMetadata>>;
}

/// The ordered provider set, fixed at startup.
pub struct Providers {
    pub recognizer: Box<dyn Recognizer>,
    pub searches: Vec<Box<dyn MetadataSearch>>,
    pub covers: Vec<Box<dyn CoverSource>>,
}

impl Providers {
    pub fn standard(http: &HttpClient, settings: &Settings) -> Self {
        let musicbrainz = MusicBrainz::new(http.clone(), settings.musicbrainz_url.clone());
        let archive = CoverArtArchive::new(http.clone(), settings.coverart_url.clone());
        let itunes = ITunes::new(http.clone(), settings.itunes_url.clone());
        let credentials = AcrCredentials::from_parts(
            settings.acrcloud_access_key.clone(),
            settings.acrcloud_access_secret.clone(),
        );

        Self {
            recognizer: Box::new(AcrCloud::new(
                http.clone(),
                settings.acrcloud_host.clone(),
                credentials,
                Box::new(FfmpegExtractor::new(settings.ffmpeg_path.clone())),
            )),
            searches: vec![Box::new(musicbrainz.clone()), Box::new(itunes.clone())],
            covers: vec![
                Box::new(MusicBrainzCovers::new(musicbrainz, archive)),
                Box::new(itunes),
                Box::new(DuckDuckGo::new(http.clone(), settings.duckduckgo_url.clone())),
            ],
        }
    }
}
