//! Tag reading and writing backed by `lofty`.
//!
//! The pipeline only talks to the [`TagStore`] trait. [`LoftyTagStore`] is the
//! production implementation; `lofty` is synchronous, so every call runs on the
//! blocking thread pool.

use std::{
    fmt,
    io::Cursor,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use lofty::config::{ParseOptions, ParsingMode, WriteOptions};
use lofty::file::TaggedFile;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;

use crate::{
    Res,
    types::{TagFields, TagSnapshot},
    utils,
};

#[derive(Debug)]
pub enum TagError {
    /// Open/read/write failures reported by lofty.
    Io(String),
    /// The container cannot hold the tag type we need.
    Unsupported(String),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::Io(msg) | TagError::Unsupported(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TagError {}

/// Reads and mutates the tags of audio files.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Current tag state of `path`. Files without any tag read as empty.
    async fn read(&self, path: &Path) -> Res<TagSnapshot>;

    /// Sets artist and title, and album when given.
    async fn write(&self, path: &Path, fields: &TagFields) -> Res<()>;

    /// Replaces the front cover with `image`.
    async fn embed_cover(&self, path: &Path, image: &[u8]) -> Res<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagStore;

#[async_trait]
impl TagStore for LoftyTagStore {
    async fn read(&self, path: &Path) -> Res<TagSnapshot> {
        let path = path.to_path_buf();
        let snapshot = tokio::task::spawn_blocking(move || read_snapshot(&path)).await??;
        Ok(snapshot)
    }

    async fn write(&self, path: &Path, fields: &TagFields) -> Res<()> {
        let path = path.to_path_buf();
        let fields = fields.clone();
        tokio::task::spawn_blocking(move || write_fields(&path, &fields)).await??;
        Ok(())
    }

    async fn embed_cover(&self, path: &Path, image: &[u8]) -> Res<()> {
        let path: PathBuf = path.to_path_buf();
        let image = image.to_vec();
        tokio::task::spawn_blocking(move || write_cover(&path, image)).await??;
        Ok(())
    }
}

fn parse_options() -> ParseOptions {
    ParseOptions::new()
        .read_cover_art(true)
        .parsing_mode(ParsingMode::BestAttempt)
}

fn open(path: &Path) -> Result<TaggedFile, TagError> {
    Probe::open(path)
        .map_err(|e| TagError::Io(format!("Failed to open {}: {e}", path.display())))?
        .options(parse_options())
        .read()
        .map_err(|e| TagError::Io(format!("Failed to read {}: {e}", path.display())))
}

/// The file's primary tag, created empty if the file has none yet.
fn primary_tag_mut(tagged_file: &mut TaggedFile) -> Result<&mut Tag, TagError> {
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| TagError::Unsupported(format!("File does not support {tag_type:?} tags")))
}

fn read_snapshot(path: &Path) -> Result<TagSnapshot, TagError> {
    let tagged_file = open(path)?;
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return Ok(TagSnapshot::default());
    };

    Ok(TagSnapshot {
        artist: tag.artist().and_then(|v| utils::non_empty(&v)),
        title: tag.title().and_then(|v| utils::non_empty(&v)),
        album: tag.album().and_then(|v| utils::non_empty(&v)),
        has_cover: !tag.pictures().is_empty(),
    })
}

fn write_fields(path: &Path, fields: &TagFields) -> Result<(), TagError> {
    let mut tagged_file = open(path)?;
    let tag = primary_tag_mut(&mut tagged_file)?;

    tag.set_artist(fields.artist.clone());
    tag.set_title(fields.title.clone());
    if let Some(album) = &fields.album {
        tag.set_album(album.clone());
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::Io(format!("Failed to write tags: {e}")))
}

fn write_cover(path: &Path, image: Vec<u8>) -> Result<(), TagError> {
    // Cached covers are stored as .jpg, but the bytes may be PNG or WebP.
    let mime = Picture::from_reader(&mut Cursor::new(&image))
        .ok()
        .and_then(|p| p.mime_type().cloned())
        .unwrap_or(MimeType::Jpeg);
    let picture = Picture::unchecked(image)
        .pic_type(PictureType::CoverFront)
        .mime_type(mime)
        .build();

    let mut tagged_file = open(path)?;
    let tag = primary_tag_mut(&mut tagged_file)?;
    tag.remove_picture_type(PictureType::CoverFront);
    tag.push_picture(picture);

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::Io(format!("Failed to write cover: {e}")))
}
