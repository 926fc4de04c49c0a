//! Fixed-path resolution
//!
//! A relative include path such as `2024/*/data` is scanned from its last
//! segment backward. The first segment that the compiler classifies as literal
//! is the boundary; the segments up to and including it form the fixed path
//! that is later globbed on the destination side.

use feedrep_types::{PatternCompiler, Result};
use std::fmt;
use tracing::{debug, warn};

/// How the boundary of a [`FixedPath`] was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAnchor {
    /// The rightmost literal segment, by index into the `/`-split input
    Literal {
        /// Index of the anchoring segment
        index: usize,
    },
    /// No segment was literal and the whole path was kept
    Fallback,
    /// The relative path had no segments at all
    Empty,
}

/// Literal-only prefix of a relative include path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPath {
    path: String,
    anchor: BoundaryAnchor,
}

impl FixedPath {
    /// The fixed path, without leading or trailing `/`
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// How the boundary was chosen
    pub fn anchor(&self) -> BoundaryAnchor {
        self.anchor
    }

    /// Whether the fixed path is empty (include path equals source path)
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Consume into the path string
    pub fn into_string(self) -> String {
        self.path
    }
}

impl fmt::Display for FixedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Finds the fixed path of a relative include path
#[derive(Debug, Clone)]
pub struct PatternBoundaryResolver<C> {
    compiler: C,
}

impl<C: PatternCompiler> PatternBoundaryResolver<C> {
    /// Create a resolver using the given compiler for classification
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    /// The compiler this resolver classifies with
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Resolve the fixed path and report how its boundary was chosen
    pub fn resolve(&self, relative_path: &str) -> Result<FixedPath> {
        let segments: Vec<&str> = relative_path.split('/').collect();

        if segments.iter().all(|segment| segment.is_empty()) {
            return Ok(FixedPath {
                path: String::new(),
                anchor: BoundaryAnchor::Empty,
            });
        }

        let mut boundary = segments.len() - 1;
        let mut anchor = BoundaryAnchor::Fallback;

        for (index, segment) in segments.iter().enumerate().rev() {
            if segment.is_empty() {
                continue;
            }
            if self.compiler.is_literal(segment)? {
                boundary = index;
                anchor = BoundaryAnchor::Literal { index };
                break;
            }
            debug!("Segment '{}' at {} is a pattern", segment, index);
        }

        let path = segments[..=boundary]
            .iter()
            .filter(|segment| !segment.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");

        if anchor == BoundaryAnchor::Fallback {
            warn!(
                "No literal segment in '{}', keeping the whole path as fixed path",
                relative_path
            );
        }
        debug!("Resolved fixed path '{}' from '{}'", path, relative_path);

        Ok(FixedPath { path, anchor })
    }

    /// Resolve only the fixed path string
    pub fn resolve_fixed_path(&self, relative_path: &str) -> Result<String> {
        self.resolve(relative_path).map(FixedPath::into_string)
    }
}
