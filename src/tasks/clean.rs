// src/tasks/clean.rs

use std::path::PathBuf;

use tracing::debug;

use crate::tasks::{SyncTask, TaskAction, TaskContext, TaskReport};

/// Remove the output directory. A missing directory is fine.
pub fn clean_task(build: PathBuf) -> impl TaskAction {
    SyncTask::new("clean", move |ctx: &TaskContext| {
        let dir = ctx.resolve(&build);
        ctx.fs.remove_dir_all(&dir)?;
        debug!(dir = %dir.display(), "removed output directory");
        Ok(TaskReport::processed(1))
    })
}
