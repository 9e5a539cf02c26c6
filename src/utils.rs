use std::{path::Path, sync::LazyLock, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::types::ParsedFilename;

/// Annotations that video rips add to file names.
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\(video oficial\)|\(letra\)|\[letra\]|\[hd\]|\(128kbit_aac\)|\(official video\)|\(lyrics\)|\[lyrics\]",
    )
    .expect("noise pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static VQD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"vqd=['"]?(\d+-[\d-]+)['"&]"#).expect("vqd pattern is valid")
});

/// Separators between artist and title, in order of preference.
const SPLITTERS: [&str; 3] = [" - ", " – ", " — "];

/// Characters that are not allowed in file names on common file systems.
const ILLEGAL_FILENAME_CHARS: [char; 9] = ['\\', '/', '<', '>', ':', '"', '|', '?', '*'];

/// Flags the command line understands, without their dashes.
pub const KNOWN_FLAGS: [&str; 3] = ["recognize", "force", "rename"];

pub fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Lowercase hex SHA-256 of `bytes`; the cache key of a cover image.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Removes rip annotations and collapses runs of whitespace.
pub fn clean_filename_noise(name: &str) -> String {
    let stripped = NOISE.replace_all(name, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Guesses artist and title from a file path.
///
/// The file stem is cleaned and split on the first separator found
/// (`" - "`, then `" – "`, then `" — "`). Without a separator the whole
/// cleaned stem is the title.
pub fn parse_filename(path: &Path) -> ParsedFilename {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let clean = clean_filename_noise(&stem);

    for splitter in SPLITTERS {
        let mut parts = clean.split(splitter);
        if let (Some(artist), Some(title)) = (parts.next(), parts.next()) {
            return ParsedFilename {
                artist: non_empty(artist.trim()),
                title: non_empty(title.trim()),
            };
        }
    }

    ParsedFilename {
        artist: None,
        title: non_empty(&clean),
    }
}

pub fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}

/// `"{title} - {artist}"` with illegal characters removed.
pub fn canonical_stem(title: &str, artist: &str) -> String {
    format!(
        "{} - {}",
        sanitize_file_component(title),
        sanitize_file_component(artist)
    )
}

/// Swaps the 100px iTunes artwork size token for the 600px variant.
pub fn upgrade_artwork_url(url: &str) -> String {
    url.replace("100x100bb", "600x600bb")
}

/// Pulls the DuckDuckGo `vqd` session token out of a search page.
pub fn extract_vqd_token(html: &str) -> Option<String> {
    VQD_TOKEN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Rewrites raw process arguments into something clap accepts.
///
/// Known flags are accepted with one or two leading dashes, help and version
/// flags pass through, every other flag is dropped, and only the first
/// positional argument is kept.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<String> = args.next().into_iter().collect();
    let mut target: Option<String> = None;

    for arg in args {
        if arg.starts_with('-') {
            let name = arg.trim_start_matches('-');
            if KNOWN_FLAGS.contains(&name) {
                normalized.push(format!("--{}", name));
            } else if matches!(arg.as_str(), "-h" | "--help" | "-V" | "--version") {
                normalized.push(arg);
            }
        } else if target.is_none() {
            target = Some(arg);
        }
    }

    normalized.extend(target);
    normalized
}

pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// `None` for empty or whitespace-only strings.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
