//! Core traits for feedrep
//!
//! The pattern compiler is a capability handed to the components that need
//! it, so tests can substitute their own classification rules.

use crate::Result;

/// A compiled matcher for a single path segment
pub trait SegmentMatcher: Send + Sync {
    /// Check whether a concrete directory entry name matches the segment
    fn is_match(&self, name: &str) -> bool;

    /// Canonical textual form of the compiled pattern
    fn canonical(&self) -> &str;
}

/// Compiles single path segments into matchers
pub trait PatternCompiler: Send + Sync {
    /// Compile one `/`-free segment
    fn compile(&self, segment: &str) -> Result<Box<dyn SegmentMatcher>>;

    /// Whether the segment matches exactly one name: itself
    ///
    /// Implementations must reject malformed segments here as well, so a
    /// caller that only classifies still surfaces compilation failures.
    fn is_literal(&self, segment: &str) -> Result<bool>;
}

impl<T: PatternCompiler + ?Sized> PatternCompiler for &T {
    fn compile(&self, segment: &str) -> Result<Box<dyn SegmentMatcher>> {
        (**self).compile(segment)
    }

    fn is_literal(&self, segment: &str) -> Result<bool> {
        (**self).is_literal(segment)
    }
}

impl<T: PatternCompiler + ?Sized> PatternCompiler for std::sync::Arc<T> {
    fn compile(&self, segment: &str) -> Result<Box<dyn SegmentMatcher>> {
        (**self).compile(segment)
    }

    fn is_literal(&self, segment: &str) -> Result<bool> {
        (**self).is_literal(segment)
    }
}
