use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// Files already handled during this process lifetime.
///
/// Owned by the supervisor and kept across pass restarts, so a restarted pass
/// skips everything an earlier pass finished. Never written to disk.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    paths: HashSet<PathBuf>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the path was already present.
    pub fn add(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    pub fn has(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
