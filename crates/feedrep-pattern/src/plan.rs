//! Include-path preconditions and completion planning
//!
//! Before anything is copied, a filesystem replication validates its source
//! list against the configured include path and works out which fixed path
//! the completion markers will be anchored on.

use crate::{FixedPath, PatternBoundaryResolver};
use feedrep_types::{Error, PatternCompiler, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything needed to mark a filesystem replication complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPlan {
    /// The single source path of the run
    pub source: PathBuf,
    /// The configured include path
    pub include_path: String,
    /// Include path with the source prefix removed
    pub relative_path: String,
    /// Literal prefix of the relative path
    pub fixed_path: FixedPath,
}

impl CompletionPlan {
    /// Validate the preconditions and resolve the fixed path
    ///
    /// Fails with [`Error::Precondition`] when there is not exactly one source
    /// or the source is not a string prefix of the include path.
    pub fn resolve<C: PatternCompiler>(
        sources: &[PathBuf],
        include_path: &str,
        resolver: &PatternBoundaryResolver<C>,
    ) -> Result<Self> {
        let source = single_source(sources)?;
        let relative_path = relative_include_path(source, include_path)?;
        let fixed_path = resolver.resolve(&relative_path)?;

        info!(
            "Include path {} relative to {} is '{}', fixed path '{}'",
            include_path,
            source.display(),
            relative_path,
            fixed_path
        );

        Ok(Self {
            source: source.to_path_buf(),
            include_path: include_path.to_string(),
            relative_path,
            fixed_path,
        })
    }
}

/// Return the only source path, or fail when there are zero or several
pub fn single_source(sources: &[PathBuf]) -> Result<&Path> {
    match sources {
        [source] => Ok(source.as_path()),
        [] => Err(Error::precondition("No source path given")),
        _ => Err(Error::precondition(format!(
            "Source paths more than 1 can't be handled, got {}",
            sources.len()
        ))),
    }
}

/// Strip the source path from the include path
///
/// The comparison is a plain string prefix check after dropping trailing
/// separators from both paths.
pub fn relative_include_path(source: &Path, include_path: &str) -> Result<String> {
    let source_str = source.to_str().ok_or_else(|| {
        Error::precondition(format!(
            "Source path {} is not valid UTF-8",
            source.display()
        ))
    })?;
    let source_str = trim_trailing_separators(source_str);
    let include_str = trim_trailing_separators(include_path);

    include_str
        .strip_prefix(source_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::precondition(format!(
                "Source path {} is not a subset of include path {}",
                source_str, include_str
            ))
        })
}

fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}
