//! Glob-based segment compiler
//!
//! Segments use shell glob syntax (`*`, `?`, `[...]`, `{a,b}`) plus feed
//! placeholders of the form `${NAME}` (for example `${YEAR}`), which expand to
//! any single directory name. Wildcards never cross a `/`.

use feedrep_types::{Error, PatternCompiler, Result, SegmentMatcher};
use globset::{GlobBuilder, GlobMatcher};

/// Characters that turn a segment into a glob
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '\\'];

/// Matcher produced by [`GlobPatternCompiler`]
#[derive(Debug, Clone)]
pub struct GlobSegmentMatcher {
    matcher: GlobMatcher,
    canonical: String,
}

impl SegmentMatcher for GlobSegmentMatcher {
    fn is_match(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// Default [`PatternCompiler`] backed by `globset`
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobPatternCompiler;

impl GlobPatternCompiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Self
    }

    fn build(segment: &str) -> Result<GlobSegmentMatcher> {
        if segment.contains('/') {
            return Err(Error::pattern(segment, "a segment must not contain '/'"));
        }

        let expanded = expand_placeholders(segment)?;
        let glob = GlobBuilder::new(&expanded)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|e| Error::pattern(segment, e.kind().to_string()))?;

        Ok(GlobSegmentMatcher {
            canonical: glob.regex().to_string(),
            matcher: glob.compile_matcher(),
        })
    }
}

impl PatternCompiler for GlobPatternCompiler {
    fn compile(&self, segment: &str) -> Result<Box<dyn SegmentMatcher>> {
        Ok(Box::new(Self::build(segment)?))
    }

    fn is_literal(&self, segment: &str) -> Result<bool> {
        Self::build(segment)?;
        Ok(!has_placeholder(segment) && !segment.contains(GLOB_META))
    }
}

fn has_placeholder(segment: &str) -> bool {
    segment
        .find("${")
        .is_some_and(|start| segment[start..].contains('}'))
}

/// Replace every `${NAME}` with `*`
fn expand_placeholders(segment: &str) -> Result<String> {
    let mut expanded = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            return Err(Error::pattern(segment, "unterminated '${' placeholder"));
        };
        let name = &rest[start + 2..start + len];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::pattern(
                segment,
                format!("invalid placeholder name '{}'", name),
            ));
        }
        expanded.push_str(&rest[..start]);
        expanded.push('*');
        rest = &rest[start + len + 1..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}
