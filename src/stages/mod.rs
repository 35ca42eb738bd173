// src/stages/mod.rs

//! Transformation stages.
//!
//! A stage takes one in-memory [`Asset`] and returns the transformed asset.
//! Stages are synchronous and CPU-bound; task actions run them on a blocking
//! thread. The actual work is delegated to external crates:
//!
//! - [`image`]: dispatches by extension to `oxipng` (PNG), [`jpeg`] (metadata
//!   stripping) and [`svg`] (minification).
//! - [`sprite`]: merges many SVG icons into one `<symbol>` sprite.
//! - [`style`]: SCSS via `grass`, prefixing and minification via
//!   `lightningcss`.

pub mod image;
pub mod jpeg;
pub mod sprite;
pub mod style;
pub mod svg;

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub use image::ImageOptimizer;
pub use sprite::SpriteBuilder;
pub use style::{CompiledStyle, StyleCompiler};
pub use svg::SvgMinifier;

/// A file travelling through a task: output-relative path plus contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub relative: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    pub fn new(relative: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative: relative.into(),
            contents: contents.into(),
        }
    }

    /// Lower-cased file extension, or an empty string.
    pub fn extension(&self) -> String {
        extension_of(&self.relative)
    }
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// A single transformation applied to every asset of a task.
pub trait Stage: Send + Sync + Debug {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn apply(&self, asset: Asset) -> Result<Asset>;
}

/// Apply `stages` in order.
pub fn apply_all(stages: &[Box<dyn Stage>], asset: Asset) -> Result<Asset> {
    stages.iter().try_fold(asset, |asset, stage| stage.apply(asset))
}
