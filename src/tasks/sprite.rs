// src/tasks/sprite.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{Error, PipelineError, Result};
use crate::fs::FileSystem;
use crate::select::SourceSet;
use crate::stages::{Asset, SpriteBuilder, Stage, SvgMinifier};
use crate::tasks::{TaskAction, TaskContext, TaskFuture, TaskReport};

/// Minify every selected icon and merge them into a single sprite file.
#[derive(Debug, Clone)]
pub struct SpriteTask {
    sources: SourceSet,
    output: PathBuf,
    minifier: SvgMinifier,
    builder: SpriteBuilder,
}

impl SpriteTask {
    /// `output` is the sprite path relative to the project root.
    pub fn new(sources: SourceSet, output: impl Into<PathBuf>, builder: SpriteBuilder) -> Self {
        Self {
            sources,
            output: output.into(),
            minifier: SvgMinifier::new(),
            builder,
        }
    }

    fn process(&self, fs: &dyn FileSystem, root: &Path) -> Result<TaskReport> {
        let files = self.sources.resolve(fs, root)?;
        if files.is_empty() {
            debug!("no icons found; sprite not written");
            return Ok(TaskReport::default());
        }

        let icons = files
            .iter()
            .map(|file| {
                let contents = fs.read(&file.path)?;
                self.minifier.apply(Asset::new(&file.relative, contents))
            })
            .collect::<Result<Vec<_>>>()?;

        let sprite = self.builder.merge(&icons)?;
        let out = root.join(&self.output);
        fs.write(&out, &sprite)?;
        info!(icons = icons.len(), path = %out.display(), "wrote sprite");

        Ok(TaskReport::processed(icons.len()))
    }
}

impl TaskAction for SpriteTask {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> TaskFuture<'a> {
        let task = self.clone();
        let fs = Arc::clone(&ctx.fs);
        let root = ctx.root.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || task.process(fs.as_ref(), &root))
                .await
                .map_err(|e| PipelineError::Other(Error::new(e)))?
        })
    }
}
