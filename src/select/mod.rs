// src/select/mod.rs

//! File selection.
//!
//! This module turns ordered glob pattern sets into concrete file lists:
//! - [`patterns`] compiles individual inclusion/exclusion patterns.
//! - [`SourceSet`] evaluates an ordered set against a directory tree and
//!   computes the output-relative path of every match (base semantics).
//! - [`newer`] is the timestamp-based change filter used by the image task.

pub mod newer;
pub mod patterns;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;

pub use newer::ChangeFilter;
pub use patterns::{compile_glob, to_match_str, SourcePattern};

/// A file picked by a [`SourceSet`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path of the file (the project root joined with the matched path).
    pub path: PathBuf,
    /// Path relative to the set's base; this is what gets mirrored into the
    /// output directory.
    pub relative: PathBuf,
}

/// Ordered inclusion/exclusion glob patterns with an optional explicit base.
///
/// Evaluation is per file and follows declaration order: a matching
/// inclusion selects the file, a later matching exclusion (`!pattern`)
/// deselects it again.
#[derive(Debug, Clone)]
pub struct SourceSet {
    patterns: Vec<SourcePattern>,
    base: Option<PathBuf>,
}

impl SourceSet {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| SourcePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if !patterns.iter().any(|p| !p.is_negated()) {
            return Err(PipelineError::ConfigError(
                "a source set needs at least one inclusion pattern".to_string(),
            ));
        }

        Ok(Self {
            patterns,
            base: None,
        })
    }

    /// Set an explicit base (relative to the project root). Output paths keep
    /// everything below it.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Effective base: the explicit one, or the literal prefix of the first
    /// inclusion pattern.
    pub fn base(&self) -> PathBuf {
        if let Some(base) = &self.base {
            return base.clone();
        }
        self.patterns
            .iter()
            .find(|p| !p.is_negated())
            .map(|p| p.literal_base())
            .unwrap_or_default()
    }

    /// Whether a root-relative path (forward slashes) is selected.
    pub fn matches(&self, rel_path: &str) -> bool {
        let mut selected = false;
        for pattern in &self.patterns {
            if pattern.is_negated() {
                if selected && pattern.is_match(rel_path) {
                    selected = false;
                }
            } else if pattern.is_match(rel_path) {
                selected = true;
            }
        }
        selected
    }

    /// Resolve the set against the tree under `root`.
    ///
    /// Only the literal prefixes of the inclusion patterns are walked. A
    /// missing directory simply contributes no files. The result is sorted
    /// and free of duplicates.
    pub fn resolve(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<SourceFile>> {
        let base = self.base();
        let mut found: BTreeSet<SourceFile> = BTreeSet::new();

        for start in self.walk_roots() {
            let dir = root.join(&start);
            if fs.is_file(&dir) {
                self.consider(root, &base, &dir, &mut found);
                continue;
            }
            if !fs.is_dir(&dir) {
                debug!(dir = %dir.display(), "source directory missing; nothing to select");
                continue;
            }

            let mut stack = vec![dir];
            while let Some(dir) = stack.pop() {
                let entries = fs
                    .read_dir(&dir)
                    .with_context(|| format!("listing {:?}", dir))?;
                for path in entries {
                    if fs.is_dir(&path) {
                        stack.push(path);
                    } else if fs.is_file(&path) {
                        self.consider(root, &base, &path, &mut found);
                    }
                }
            }
        }

        Ok(found.into_iter().collect())
    }

    fn consider(&self, root: &Path, base: &Path, path: &Path, found: &mut BTreeSet<SourceFile>) {
        let Ok(rel) = path.strip_prefix(root) else {
            return;
        };
        if !self.matches(&to_match_str(rel)) {
            return;
        }
        let relative = match rel.strip_prefix(base) {
            Ok(r) => r.to_path_buf(),
            Err(_) => rel
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| rel.to_path_buf()),
        };
        found.insert(SourceFile {
            path: path.to_path_buf(),
            relative,
        });
    }

    /// Distinct literal prefixes of the inclusion patterns, with nested ones
    /// folded into their ancestors.
    fn walk_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .patterns
            .iter()
            .filter(|p| !p.is_negated())
            .map(|p| {
                let body = p.raw().trim_start_matches("./");
                if body.contains(['*', '?', '[', '{']) {
                    p.literal_base()
                } else {
                    PathBuf::from(body)
                }
            })
            .collect();
        roots.sort();
        roots.dedup();

        let mut folded: Vec<PathBuf> = Vec::new();
        for r in roots {
            if !folded.iter().any(|f| r.starts_with(f)) {
                folded.push(r);
            }
        }
        folded
    }
}
