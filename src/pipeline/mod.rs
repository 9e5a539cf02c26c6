//! # Pipeline
//!
//! The per-file workflow and the loop that drives it.
//!
//! ```text
//! Supervisor          restarts failed passes after a cooldown
//!     ↓
//! BatchProcessor      scan, then per file: skip / enrich / cover / rename
//!     ├── MetadataResolver   recognition → filename search → write + re-read
//!     └── CoverResolver      MusicBrainz+CAA → iTunes → DuckDuckGo → cache
//! ```
//!
//! Files are handled strictly one after another. The [`ProcessedSet`] owned by
//! the supervisor makes sure that a file finished by an aborted pass is not
//! touched again when the pass restarts.
//!
//! [`ProcessedSet`]: crate::management::ProcessedSet

use std::{fmt, path::PathBuf};

use crate::types::FileOutcome;

pub mod batch;
pub mod cover;
pub mod metadata;
pub mod supervisor;

pub use batch::BatchProcessor;
pub use cover::CoverResolver;
pub use metadata::MetadataResolver;
pub use supervisor::Supervisor;

/// Behavior switches from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Try audio fingerprinting before anything else, even on tagged files.
    pub recognize: bool,
    /// Re-process files that already look complete and replace existing covers.
    pub force: bool,
    /// Rename files to `"{title} - {artist}.ext"`.
    pub rename: bool,
}

/// Why a pass stopped early.
#[derive(Debug)]
pub enum PassError {
    /// The target is missing or not a directory. Restarting cannot fix this.
    InvalidTarget(PathBuf),
    /// Anything else; the pass can be retried.
    Aborted(Box<dyn std::error::Error + Send + Sync>),
}

impl PassError {
    /// Whether a restart could possibly succeed.
    pub fn is_restartable(&self) -> bool {
        matches!(self, PassError::Aborted(_))
    }
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::InvalidTarget(path) => {
                write!(f, "target is not a directory: {}", path.display())
            }
            PassError::Aborted(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PassError {}

impl From<Box<dyn std::error::Error + Send + Sync>> for PassError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        PassError::Aborted(err)
    }
}

impl From<crate::management::CacheError> for PassError {
    fn from(err: crate::management::CacheError) -> Self {
        PassError::Aborted(Box::new(err))
    }
}

impl From<std::io::Error> for PassError {
    fn from(err: std::io::Error) -> Self {
        PassError::Aborted(Box::new(err))
    }
}

/// Outcomes collected over one or more passes.
#[derive(Debug, Default, Clone)]
pub struct PassReport {
    pub outcomes: Vec<FileOutcome>,
}

impl PassReport {
    pub fn count(&self, status: crate::types::FileStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
