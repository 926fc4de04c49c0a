//! Completion markers for replicated feed directories
//!
//! After a copy finishes, every destination directory matching the fixed path
//! receives an empty marker file (`_SUCCESS` by default). Its presence is what
//! downstream consumers poll for.
//!
//! The copy engine never creates directories that end up without files, so
//! when nothing matches a single marker is written at the fixed path itself,
//! creating the missing directories on the way.
//!
//! # Examples
//!
//! ```rust,no_run
//! use feedrep_marker::CompletionMarker;
//! use feedrep_pattern::GlobPatternCompiler;
//! use std::path::Path;
//!
//! # fn example() -> feedrep_types::Result<()> {
//! let marker = CompletionMarker::with_default_name(GlobPatternCompiler::new());
//! let report = marker.mark_complete(Path::new("/replica/clicks"), "2024/*")?;
//! println!("created {} markers", report.markers.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use feedrep_types::{Error, PatternCompiler, Result, SegmentMatcher, DEFAULT_MARKER_FILE_NAME};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Outcome of a marking pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerReport {
    /// Destination root joined with the fixed path
    pub final_path: PathBuf,
    /// Number of existing directories that matched the fixed path
    pub matched_directories: usize,
    /// Every marker file written, in creation order
    pub markers: Vec<PathBuf>,
}

impl MarkerReport {
    /// Whether the marker was placed at the final path because nothing matched
    pub fn used_final_path(&self) -> bool {
        self.matched_directories == 0
    }
}

/// Writes completion markers below a destination root
#[derive(Debug, Clone)]
pub struct CompletionMarker<C> {
    compiler: C,
    file_name: String,
}

impl<C: PatternCompiler> CompletionMarker<C> {
    /// Create a marker writer with a custom marker file name
    pub fn new(compiler: C, file_name: impl Into<String>) -> Result<Self> {
        let file_name = file_name.into();
        validate_file_name(&file_name)?;
        Ok(Self {
            compiler,
            file_name,
        })
    }

    /// Create a marker writer using `_SUCCESS`
    pub fn with_default_name(compiler: C) -> Self {
        Self {
            compiler,
            file_name: DEFAULT_MARKER_FILE_NAME.to_string(),
        }
    }

    /// The marker file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Mark every directory matching `fixed_path` under `destination_root`
    ///
    /// Any filesystem failure aborts the pass; markers already written stay in
    /// place and a re-run recreates the rest.
    pub fn mark_complete(&self, destination_root: &Path, fixed_path: &str) -> Result<MarkerReport> {
        let segments: Vec<&str> = fixed_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let final_path = if segments.is_empty() {
            destination_root.to_path_buf()
        } else {
            destination_root.join(segments.join("/"))
        };

        let matched = self.matching_directories(destination_root, &segments)?;
        let mut markers = Vec::with_capacity(matched.len().max(1));

        if matched.is_empty() {
            fs::create_dir_all(&final_path).map_err(|e| Error::io_at(&final_path, e))?;
            markers.push(self.create_marker(&final_path)?);
            info!("No files present in path: {}", final_path.display());
        } else {
            for directory in &matched {
                let marker = self.create_marker(directory)?;
                info!("Created {}", marker.display());
                markers.push(marker);
            }
        }

        Ok(MarkerReport {
            final_path,
            matched_directories: matched.len(),
            markers,
        })
    }

    /// Expand the fixed path one directory level per segment
    fn matching_directories(&self, root: &Path, segments: &[&str]) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            debug!("Destination root {} does not exist yet", root.display());
            return Ok(Vec::new());
        }
        if segments.is_empty() {
            return Ok(vec![root.to_path_buf()]);
        }

        let matchers = segments
            .iter()
            .map(|segment| self.compiler.compile(segment))
            .collect::<Result<Vec<Box<dyn SegmentMatcher>>>>()?;
        let depth = matchers.len();

        // Every level is filtered so non-matching parents prune their subtree
        let walker = WalkDir::new(root)
            .max_depth(depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| matchers[entry.depth() - 1].is_match(name))
            });

        let mut directories = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                Error::io_at(path, e.into())
            })?;
            if entry.depth() == depth {
                directories.push(entry.into_path());
            }
        }

        debug!(
            "{} directories match '{}' under {}",
            directories.len(),
            segments.join("/"),
            root.display()
        );
        Ok(directories)
    }

    fn create_marker(&self, directory: &Path) -> Result<PathBuf> {
        let marker = directory.join(&self.file_name);
        File::create(&marker).map_err(|e| Error::io_at(&marker, e))?;
        Ok(marker)
    }
}

fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(Error::config(format!(
            "Invalid marker file name '{}'",
            file_name
        )));
    }
    if file_name.contains('/') || file_name.contains('\\') {
        return Err(Error::config(format!(
            "Marker file name '{}' must not contain a path separator",
            file_name
        )));
    }
    Ok(())
}
