// src/tasks/context.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::{FileSystem, RealFileSystem};
use crate::server::LiveReload;

/// Everything a task action may touch.
///
/// Paths handed to tasks at registration time are relative to `root`.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub fs: Arc<dyn FileSystem>,
    pub root: PathBuf,
    /// Present while a dev server is running.
    pub live: Option<LiveReload>,
}

impl TaskContext {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            live: None,
        }
    }

    /// Context over the real file system.
    pub fn real(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(RealFileSystem), root)
    }

    /// Attach the live-reload channel of a running dev server.
    pub fn with_live(mut self, live: LiveReload) -> Self {
        self.live = Some(live);
        self
    }

    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}
