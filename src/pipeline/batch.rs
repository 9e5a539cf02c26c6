use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    error, info,
    management::ProcessedSet,
    pipeline::{CoverResolver, MetadataResolver, PassError, PassReport, RunOptions},
    scanner::Scanner,
    success,
    tags::TagStore,
    types::{FileOutcome, FileStatus, TagSnapshot},
    utils, warning,
};

/// One pass over the target directory.
///
/// Every file ends up either `Skipped` (nothing to do, or not enough metadata
/// to look for a cover) or `Processed` (the cover chain ran). Files in the
/// processed-set are passed over without being read.
pub struct BatchProcessor {
    target: PathBuf,
    options: RunOptions,
    scanner: Box<dyn Scanner>,
    tags: Box<dyn TagStore>,
    metadata: MetadataResolver,
    covers: CoverResolver,
}

impl BatchProcessor {
    pub fn new(
        target: PathBuf,
        options: RunOptions,
        scanner: Box<dyn Scanner>,
        tags: Box<dyn TagStore>,
        metadata: MetadataResolver,
        covers: CoverResolver,
    ) -> Self {
        Self {
            target,
            options,
            scanner,
            tags,
            metadata,
            covers,
        }
    }

    /// Scans the target and handles every file not yet in `processed`.
    ///
    /// Outcomes are appended to `report` as files finish, so a pass that aborts
    /// halfway still reports what it did. Scan and cache I/O errors abort the
    /// pass. A file whose tags cannot be read is skipped and not retried.
    pub async fn run_pass(
        &self,
        processed: &mut ProcessedSet,
        report: &mut PassReport,
    ) -> Result<(), PassError> {
        match async_fs::metadata(&self.target).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PassError::InvalidTarget(self.target.clone())),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Err(PassError::InvalidTarget(self.target.clone()));
            }
            // Permission or I/O trouble may clear up, e.g. a mount coming back.
            Err(e) => return Err(PassError::Aborted(Box::new(e))),
        }

        info!("Scanning: {}", self.target.display());
        let pb = utils::spinner(format!("Scanning {}...", self.target.display()));
        let files = self.scanner.scan(&self.target).await;
        pb.finish_and_clear();
        let files = files?;
        info!("Found {} MP3 files", files.len());

        let total = files.len();
        for (i, file) in files.iter().enumerate() {
            if processed.has(file) {
                continue;
            }

            let position = format!("{}/{}", i + 1, total);
            let (status, detail, snapshot) = self.process_file(file, &position).await?;

            let final_path = match (&snapshot.artist, &snapshot.title) {
                (Some(artist), Some(title)) if self.options.rename => {
                    apply_rename(file, artist, title).await
                }
                _ => file.clone(),
            };

            processed.add(file.clone());
            processed.add(final_path.clone());
            report.outcomes.push(FileOutcome {
                path: final_path,
                status,
                detail,
            });
        }

        Ok(())
    }

    async fn process_file(
        &self,
        file: &Path,
        position: &str,
    ) -> Result<(FileStatus, String, TagSnapshot), PassError> {
        let RunOptions {
            recognize, force, ..
        } = self.options;
        let snapshot = match self.tags.read(file).await {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(unreadable(file, position, e)),
        };

        if !force && !recognize && snapshot.is_complete() {
            info!(
                "({}) Skipping: {} (Metadata and cover already exist)",
                position,
                file.display()
            );
            return Ok((
                FileStatus::Skipped,
                "metadata and cover already exist".to_string(),
                snapshot,
            ));
        }

        info!("({}) Processing: {}", position, file.display());
        let snapshot = match self
            .metadata
            .enrich(self.tags.as_ref(), file, snapshot, recognize)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(unreadable(file, position, e)),
        };

        let (Some(artist), Some(album)) = (snapshot.artist.clone(), snapshot.album.clone()) else {
            warning!("Still missing metadata, skipping cover search");
            return Ok((
                FileStatus::Skipped,
                "metadata incomplete".to_string(),
                snapshot,
            ));
        };

        if !force && snapshot.has_cover {
            info!("Cover already exists, skipping cover search");
            return Ok((
                FileStatus::Skipped,
                "cover already exists".to_string(),
                snapshot,
            ));
        }

        let detail = match self.covers.resolve(&artist, &album).await? {
            Some(cover_path) => {
                let image = async_fs::read(&cover_path).await?;
                match self.tags.embed_cover(file, &image).await {
                    Ok(()) => {
                        success!("Cover embedded");
                        "cover embedded"
                    }
                    Err(e) => {
                        warning!("Failed to embed cover into {}: {}", file.display(), e);
                        "cover embed failed"
                    }
                }
            }
            None => {
                warning!("No cover found");
                "no cover found"
            }
        };

        Ok((FileStatus::Processed, detail.to_string(), snapshot))
    }
}

fn unreadable(
    file: &Path,
    position: &str,
    err: Box<dyn std::error::Error + Send + Sync>,
) -> (FileStatus, String, TagSnapshot) {
    warning!(
        "({}) Skipping: {} (Cannot read tags: {})",
        position,
        file.display(),
        err
    );
    (
        FileStatus::Skipped,
        "unreadable tags".to_string(),
        TagSnapshot::default(),
    )
}

/// Renames `file` to `"{title} - {artist}{ext}"` in its directory.
///
/// A name held by another file gets a ` (n)` suffix, counting up from 1 until a
/// free name is found. Returns the new path, or `file` itself when it already has
/// the canonical name or the rename fails.
pub async fn apply_rename(file: &Path, artist: &str, title: &str) -> PathBuf {
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let ext = file
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stem = utils::canonical_stem(title, artist);

    let mut candidate = dir.join(format!("{stem}{ext}"));
    let mut counter = 1;
    while candidate != file && async_fs::metadata(&candidate).await.is_ok() {
        candidate = dir.join(format!("{stem} ({counter}){ext}"));
        counter += 1;
    }

    if candidate == file {
        return file.to_path_buf();
    }

    match async_fs::rename(file, &candidate).await {
        Ok(()) => {
            info!(
                "Renamed: {} -> {}",
                display_name(file),
                display_name(&candidate)
            );
            candidate
        }
        Err(e) => {
            error!("Failed to rename {}: {}", file.display(), e);
            file.to_path_buf()
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
