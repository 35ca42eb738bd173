// src/select/newer.rs

//! Timestamp-based change filter.
//!
//! A source file passes when its counterpart under the destination root is
//! missing or strictly older. Equal timestamps count as up to date.

use std::path::PathBuf;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::select::SourceFile;

#[derive(Debug, Clone)]
pub struct ChangeFilter {
    dest: PathBuf,
}

impl ChangeFilter {
    /// `dest` is the output directory the source set is mirrored into.
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    /// Output counterpart of a selected file.
    pub fn output_for(&self, file: &SourceFile) -> PathBuf {
        self.dest.join(&file.relative)
    }

    /// Whether `file` needs to be (re)processed.
    pub fn is_stale(&self, fs: &dyn FileSystem, file: &SourceFile) -> Result<bool> {
        let output = self.output_for(file);
        if !fs.is_file(&output) {
            return Ok(true);
        }
        let src_time = fs.modified(&file.path)?;
        let out_time = fs.modified(&output)?;
        Ok(out_time < src_time)
    }

    /// Keep only stale files. Returns the kept files and the number skipped.
    pub fn retain_stale(
        &self,
        fs: &dyn FileSystem,
        files: Vec<SourceFile>,
    ) -> Result<(Vec<SourceFile>, usize)> {
        let total = files.len();
        let mut kept = Vec::with_capacity(total);
        for file in files {
            if self.is_stale(fs, &file)? {
                kept.push(file);
            } else {
                debug!(path = %file.path.display(), "output is up to date; skipping");
            }
        }
        let skipped = total - kept.len();
        Ok((kept, skipped))
    }
}
