//! Audio snippet extraction for fingerprint recognition.
//!
//! Recognition services only need a short excerpt of the track. The excerpt is
//! cut by an external `ffmpeg` process into a temporary file that is owned by a
//! [`TempSnippet`] guard and deleted when the guard goes out of scope.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;

use crate::{Res, utils};

/// Seconds skipped from the start of the track (intros are often silent).
pub const SNIPPET_OFFSET_SECS: u32 = 15;
/// Length of the excerpt in seconds.
pub const SNIPPET_LENGTH_SECS: u32 = 12;

/// Cuts a short excerpt of `source` into `dest`.
#[async_trait]
pub trait SnippetExtractor: Send + Sync {
    async fn extract(&self, source: &Path, dest: &Path) -> Res<()>;
}

/// Runs `ffmpeg -y -ss 15 -t 12 -i <source> -map 0:a:0 -b:a 128k <dest>`.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    binary: String,
}

impl FfmpegExtractor {
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl SnippetExtractor for FfmpegExtractor {
    async fn extract(&self, source: &Path, dest: &Path) -> Res<()> {
        let status = Command::new(&self.binary)
            .arg("-y")
            .args(["-ss", &SNIPPET_OFFSET_SECS.to_string()])
            .args(["-t", &SNIPPET_LENGTH_SECS.to_string()])
            .arg("-i")
            .arg(source)
            .args(["-map", "0:a:0", "-b:a", "128k"])
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(format!("{} exited with {}", self.binary, status).into());
        }
        Ok(())
    }
}

/// A temporary snippet file, removed on drop whether or not it was ever created.
#[derive(Debug)]
pub struct TempSnippet {
    path: PathBuf,
}

impl TempSnippet {
    /// Reserves a unique path in the system temp directory for a snippet of `source`.
    ///
    /// The source file name is kept as a suffix so ffmpeg picks the same
    /// container format for the output.
    pub fn for_source(source: &Path) -> Self {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snippet.mp3".to_string());
        let path = std::env::temp_dir().join(format!(
            "snippet_{}_{}_{}",
            Utc::now().timestamp_millis(),
            utils::random_suffix(6),
            name
        ));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempSnippet {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
