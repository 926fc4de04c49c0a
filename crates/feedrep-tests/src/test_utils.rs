//! Shared fixtures for integration tests

use feedrep_types::DEFAULT_MARKER_FILE_NAME;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary workspace with a feed source and a replica target
pub struct FeedFixture {
    temp_dir: TempDir,
}

impl FeedFixture {
    /// Create an empty fixture
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Root of the feed source
    pub fn source(&self) -> PathBuf {
        self.temp_dir.path().join("source")
    }

    /// Root of the replica
    pub fn target(&self) -> PathBuf {
        self.temp_dir.path().join("replica")
    }

    /// Source path as a string, for building include paths
    pub fn source_str(&self) -> String {
        self.source().display().to_string()
    }

    /// Write a file below the source root, creating parents
    pub fn add_file(&self, relative: &str, body: &[u8]) -> io::Result<PathBuf> {
        let path = self.source().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Create an empty directory below the source root
    pub fn add_dir(&self, relative: &str) -> io::Result<PathBuf> {
        let path = self.source().join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Every `_SUCCESS` marker under `root`, relative to it
pub fn markers_under(root: &Path) -> BTreeSet<PathBuf> {
    files_named(root, DEFAULT_MARKER_FILE_NAME)
}

/// Every file named `name` under `root`, relative to it
pub fn files_named(root: &Path, name: &str) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == name)
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(Path::to_path_buf)
        })
        .collect()
}

/// Number of regular files under `root`
pub fn count_files(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}
