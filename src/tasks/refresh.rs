// src/tasks/refresh.rs

use tracing::debug;

use crate::tasks::{SyncTask, TaskAction, TaskContext, TaskReport};

/// Tell connected browsers to reload. Does nothing outside a serve session.
pub fn refresh_task() -> impl TaskAction {
    SyncTask::new("refresh", |ctx: &TaskContext| match &ctx.live {
        Some(live) => {
            let clients = live.reload();
            Ok(TaskReport::processed(clients))
        }
        None => {
            debug!("no dev server running; skipping reload");
            Ok(TaskReport::default())
        }
    })
}
