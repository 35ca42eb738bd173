// src/tasks/asset.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Error, PipelineError, Result};
use crate::fs::FileSystem;
use crate::select::{ChangeFilter, SourceSet};
use crate::stages::{apply_all, Asset, Stage};
use crate::tasks::{TaskAction, TaskContext, TaskFuture, TaskReport};

/// Select files, push each through a chain of stages and mirror the results
/// into an output directory.
///
/// With no stages this is a plain copy. With `newer` set, files whose output
/// is already up to date are skipped.
#[derive(Debug, Clone)]
pub struct AssetTask {
    sources: SourceSet,
    dest: PathBuf,
    stages: Arc<[Box<dyn Stage>]>,
    newer: bool,
}

impl AssetTask {
    /// `dest` is relative to the project root.
    pub fn new(sources: SourceSet, dest: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            dest: dest.into(),
            stages: Arc::from(Vec::new()),
            newer: false,
        }
    }

    pub fn with_stages(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages = Arc::from(stages);
        self
    }

    /// Only process files whose output is missing or older than the source.
    pub fn only_newer(mut self) -> Self {
        self.newer = true;
        self
    }

    fn process(&self, fs: &dyn FileSystem, root: &Path) -> Result<TaskReport> {
        let files = self.sources.resolve(fs, root)?;
        if files.is_empty() {
            debug!(dest = %self.dest.display(), "no source files matched");
            return Ok(TaskReport::default());
        }

        let dest = root.join(&self.dest);
        let (files, skipped) = if self.newer {
            ChangeFilter::new(&dest).retain_stale(fs, files)?
        } else {
            (files, 0)
        };

        for file in &files {
            let contents = fs.read(&file.path)?;
            let asset = apply_all(&self.stages, Asset::new(&file.relative, contents))?;
            let out = dest.join(&asset.relative);
            fs.write(&out, &asset.contents)?;
            debug!(from = %file.path.display(), to = %out.display(), "wrote asset");
        }

        Ok(TaskReport {
            processed: files.len(),
            skipped,
        })
    }
}

impl TaskAction for AssetTask {
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
