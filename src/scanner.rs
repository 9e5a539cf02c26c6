use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::Res;

/// Lists the candidate files below a directory.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, root: &Path) -> Res<Vec<PathBuf>>;
}

/// Recursive `.mp3` discovery (extension matched case-insensitively).
///
/// Paths are absolute and sorted by file name within each directory, so two
/// scans of an unchanged tree return the same order. Any unreadable entry fails
/// the whole scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp3Scanner;

#[async_trait]
impl Scanner for Mp3Scanner {
    async fn scan(&self, root: &Path) -> Res<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let files = tokio::task::spawn_blocking(move || scan_for_mp3(&root)).await??;
        Ok(files)
    }
}

fn scan_for_mp3(root: &Path) -> Res<Vec<PathBuf>> {
    let root = std::fs::canonicalize(root)?;
    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_mp3(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_mp3_extension_in_any_case() {
        assert!(is_mp3(Path::new("/music/a.mp3")));
        assert!(is_mp3(Path::new("/music/B.MP3")));
        assert!(!is_mp3(Path::new("/music/c.flac")));
        assert!(!is_mp3(Path::new("/music/mp3")));
    }

    #[tokio::test]
    async fn finds_nested_mp3_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("a.MP3"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join("sub/c.mp3"), b"").unwrap();

        let files = Mp3Scanner.scan(dir.path()).await.unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.MP3", "b.mp3", "c.mp3"]);
        assert!(files.iter().all(|p| p.is_absolute()));
    }
}
