//! Path pattern classification for feedrep
//!
//! Feed include paths carry a literal prefix followed by pattern segments
//! (`*`, `${YEAR}`, `{us,eu}`, ...). This crate decides which segments are
//! literal and derives the fixed path that completion markers anchor on.
//!
//! # Examples
//!
//! ```rust
//! use feedrep_pattern::{GlobPatternCompiler, PatternBoundaryResolver};
//!
//! let resolver = PatternBoundaryResolver::new(GlobPatternCompiler::new());
//! let fixed = resolver.resolve_fixed_path("/clicks/2024/*").unwrap();
//! assert_eq!(fixed, "clicks/2024");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod boundary;
pub mod compiler;
pub mod plan;

pub use boundary::{BoundaryAnchor, FixedPath, PatternBoundaryResolver};
pub use compiler::{GlobPatternCompiler, GlobSegmentMatcher};
pub use plan::{relative_include_path, single_source, CompletionPlan};
