// src/tasks/style.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Error, PipelineError, Result};
use crate::fs::FileSystem;
use crate::stages::{CompiledStyle, StyleCompiler};
use crate::tasks::{TaskAction, TaskContext, TaskFuture, TaskReport};

/// Compile the stylesheet entry point into `<dest>/<stem>.css` and
/// `<dest>/<stem>.min.css`, then push the expanded CSS to live clients.
#[derive(Debug, Clone)]
pub struct StyleTask {
    entry: PathBuf,
    dest: PathBuf,
    /// Path of the expanded stylesheet as the browser requests it.
    public_path: String,
    compiler: StyleCompiler,
}

impl StyleTask {
    /// `entry` and `dest` are relative to the project root; `public_dir` is
    /// `dest` relative to the served output directory.
    pub fn new(
        entry: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        public_dir: &str,
        compiler: StyleCompiler,
    ) -> Self {
        let entry = entry.into();
        let stem = file_stem(&entry);
        let public_dir = public_dir.trim_matches('/');
        let public_path = if public_dir.is_empty() {
            format!("{stem}.css")
        } else {
            format!("{public_dir}/{stem}.css")
        };
        Self {
            entry,
            dest: dest.into(),
            public_path,
            compiler,
        }
    }

    fn process(&self, fs: &dyn FileSystem, root: &Path) -> Result<Option<CompiledStyle>> {
        let entry = root.join(&self.entry);
        if !fs.is_file(&entry) {
            debug!(entry = %entry.display(), "stylesheet entry missing; nothing to compile");
            return Ok(None);
        }

        let source = fs.read_to_string(&entry)?;
        let compiled = self.compiler.compile(&entry, &source)?;

        let stem = file_stem(&self.entry);
        let dest = root.join(&self.dest);
        fs.write(&dest.join(format!("{stem}.css")), compiled.expanded.as_bytes())?;
        fs.write(&dest.join(format!("{stem}.min.css")), compiled.minified.as_bytes())?;
        debug!(
            expanded = compiled.expanded.len(),
            minified = compiled.minified.len(),
            "wrote stylesheets"
        );
        Ok(Some(compiled))
    }
}

impl TaskAction for StyleTask {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> TaskFuture<'a> {
        let task = self.clone();
        let fs = Arc::clone(&ctx.fs);
        let root = ctx.root.clone();
        Box::pin(async move {
            let compiled = tokio::task::spawn_blocking(move || task.process(fs.as_ref(), &root))
                .await
                .map_err(|e| PipelineError::Other(Error::new(e)))??;

            let Some(compiled) = compiled else {
                return Ok(TaskReport::default());
            };
            if let Some(live) = &ctx.live {
                live.inject_css(&self.public_path, &compiled.expanded);
            }
            Ok(TaskReport::processed(2))
        })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "style".to_string())
}
