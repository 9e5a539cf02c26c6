//! Configuration management for tagfill.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Every setting has a default, so a fresh install
//! works without any configuration except for audio recognition, which needs
//! ACRCloud credentials.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, time::Duration};

use crate::http::RetryPolicy;

pub const DEFAULT_MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_COVERART_API_URL: &str = "https://coverartarchive.org";
pub const DEFAULT_ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const DEFAULT_DUCKDUCKGO_URL: &str = "https://duckduckgo.com";
pub const DEFAULT_ACRCLOUD_HOST: &str = "identify-us-west-2.acrcloud.com";

/// MusicBrainz throttles requests without a meaningful user agent.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const DEFAULT_COOLDOWN_SECS: u64 = 5 * 60;
const DEFAULT_HTTP_RETRIES: u32 = 3;
const DEFAULT_HTTP_BASE_DELAY_MS: u64 = 1000;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `tagfill` data directory if it doesn't exist and loads
/// `<data_local_dir>/tagfill/.env` when present:
/// - Linux: `~/.local/share/tagfill/.env`
/// - macOS: `~/Library/Application Support/tagfill/.env`
/// - Windows: `%LOCALAPPDATA%/tagfill/.env`
///
/// A missing `.env` file is not an error; variables already set in the process
/// environment always win.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the `.env`
/// file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tagfill/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Base URL of the MusicBrainz web service (`MUSICBRAINZ_API_URL`).
pub fn musicbrainz_url() -> String {
    env_or("MUSICBRAINZ_API_URL", DEFAULT_MUSICBRAINZ_API_URL)
}

/// Base URL of the Cover Art Archive (`COVERART_API_URL`).
pub fn coverart_url() -> String {
    env_or("COVERART_API_URL", DEFAULT_COVERART_API_URL)
}

/// iTunes Search API endpoint (`ITUNES_SEARCH_URL`).
pub fn itunes_url() -> String {
    env_or("ITUNES_SEARCH_URL", DEFAULT_ITUNES_SEARCH_URL)
}

/// DuckDuckGo origin used for image search (`DUCKDUCKGO_URL`).
pub fn duckduckgo_url() -> String {
    env_or("DUCKDUCKGO_URL", DEFAULT_DUCKDUCKGO_URL)
}

/// ACRCloud identification host (`ACRCLOUD_HOST`). A bare host name is reached over https.
pub fn acrcloud_host() -> String {
    env_or("ACRCLOUD_HOST", DEFAULT_ACRCLOUD_HOST)
}

/// ACRCloud access key (`ACRCLOUD_ACCESS_KEY`), `None` when unset or empty.
pub fn acrcloud_access_key() -> Option<String> {
    env_opt("ACRCLOUD_ACCESS_KEY")
}

/// ACRCloud access secret (`ACRCLOUD_ACCESS_SECRET`), `None` when unset or empty.
///
/// # Security Note
///
/// The secret is only used to sign requests and is never logged.
pub fn acrcloud_access_secret() -> Option<String> {
    env_opt("ACRCLOUD_ACCESS_SECRET")
}

/// ffmpeg binary used for snippet extraction (`FFMPEG_PATH`).
pub fn ffmpeg_path() -> String {
    env_or("FFMPEG_PATH", "ffmpeg")
}

/// Cover cache directory (`TAGFILL_CACHE_DIR`, else `<data_local_dir>/tagfill/covers`).
pub fn cache_dir() -> PathBuf {
    match env_opt("TAGFILL_CACHE_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push("tagfill/covers");
            path
        }
    }
}

/// Wait between a failed pass and its restart (`TAGFILL_COOLDOWN_SECS`).
pub fn cooldown() -> Duration {
    Duration::from_secs(env_parse("TAGFILL_COOLDOWN_SECS").unwrap_or(DEFAULT_COOLDOWN_SECS))
}

/// Optional cap on supervisor restarts (`TAGFILL_MAX_RESTARTS`).
pub fn max_restarts() -> Option<u32> {
    env_parse("TAGFILL_MAX_RESTARTS")
}

/// Retry policy shared by every provider.
///
/// Reads `TAGFILL_HTTP_RETRIES` and `TAGFILL_HTTP_BASE_DELAY_MS`.
pub fn retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: env_parse("TAGFILL_HTTP_RETRIES").unwrap_or(DEFAULT_HTTP_RETRIES),
        base_delay: Duration::from_millis(
            env_parse("TAGFILL_HTTP_BASE_DELAY_MS").unwrap_or(DEFAULT_HTTP_BASE_DELAY_MS),
        ),
        ..RetryPolicy::default()
    }
}

/// Snapshot of every setting, taken once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub musicbrainz_url: String,
    pub coverart_url: String,
    pub itunes_url: String,
    pub duckduckgo_url: String,
    pub acrcloud_host: String,
    pub acrcloud_access_key: Option<String>,
    pub acrcloud_access_secret: Option<String>,
    pub ffmpeg_path: String,
    pub cache_dir: PathBuf,
    pub cooldown: Duration,
    pub max_restarts: Option<u32>,
    pub retry: RetryPolicy,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            musicbrainz_url: musicbrainz_url(),
            coverart_url: coverart_url(),
            itunes_url: itunes_url(),
            duckduckgo_url: duckduckgo_url(),
            acrcloud_host: acrcloud_host(),
            acrcloud_access_key: acrcloud_access_key(),
            acrcloud_access_secret: acrcloud_access_secret(),
            ffmpeg_path: ffmpeg_path(),
            cache_dir: cache_dir(),
            cooldown: cooldown(),
            max_restarts: max_restarts(),
            retry: retry_policy(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_opt(key).and_then(|value| value.trim().parse().ok())
}
