// src/select/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::errors::{PipelineError, Result};

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// A single compiled pattern of a [`SourceSet`](super::SourceSet).
///
/// Patterns are relative to the project root and use forward slashes. A
/// leading `!` marks an exclusion.
#[derive(Clone)]
pub struct SourcePattern {
    raw: String,
    matcher: GlobMatcher,
    negated: bool,
}

impl fmt::Debug for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePattern")
            .field("raw", &self.raw)
            .field("negated", &self.negated)
            .finish_non_exhaustive()
    }
}

impl SourcePattern {
    /// Compile a pattern. `*` never crosses a `/`; `**` does.
    pub fn parse(pattern: &str) -> Result<Self> {
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let body = body.trim_start_matches("./");

        let matcher = compile_glob(body)?;

        Ok(Self {
            raw: pattern.to_string(),
            matcher,
            negated,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }

    /// Literal directory prefix of the pattern, before the first glob
    /// component. For a pattern without glob characters this is the parent
    /// directory of the named file.
    pub fn literal_base(&self) -> PathBuf {
        literal_base(self.raw.trim_start_matches('!').trim_start_matches("./"))
    }
}

/// Compile a glob with `/`-aware wildcards.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| PipelineError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(glob.compile_matcher())
}

fn literal_base(pattern: &str) -> PathBuf {
    let components: Vec<&str> = pattern.split('/').collect();
    let first_glob = components
        .iter()
        .position(|c| c.contains(GLOB_CHARS));

    let literal = match first_glob {
        Some(idx) => &components[..idx],
        // No glob at all: the pattern names a file, its parent is the base.
        None => &components[..components.len().saturating_sub(1)],
    };

    literal.iter().filter(|c| !c.is_empty()).collect()
}

/// Convert a path relative to the project root into the forward-slash form
/// patterns are matched against.
pub fn to_match_str(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
