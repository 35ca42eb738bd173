// src/tasks/composer.rs

//! Serial composition of named tasks.
//!
//! A series runs its members one after another, each awaited to completion
//! before the next starts. The first failure stops the series; the rest is
//! not run. There is no parallel composition.

use tracing::{debug, warn};

use crate::errors::Result;
use crate::tasks::{TaskContext, TaskName, TaskRegistry, TaskReport};

/// Declare `name` as the ordered, non-overlapping execution of `members`.
///
/// Member names are only checked by [`TaskRegistry::validate`], so a series
/// may be declared before the tasks it refers to.
pub fn compose_series(registry: &mut TaskRegistry, name: &str, members: &[&str]) -> Result<()> {
    let members: Vec<TaskName> = members.iter().map(|s| s.to_string()).collect();
    debug!(series = name, ?members, "composing series");
    registry.register_series(name, members)
}

pub(crate) async fn run_series(
    registry: &TaskRegistry,
    members: &[TaskName],
    ctx: &TaskContext,
) -> Result<TaskReport> {
    let mut report = TaskReport::default();
    for (idx, member) in members.iter().enumerate() {
        match registry.run(member, ctx).await {
            Ok(r) => report = report.merge(r),
            Err(err) => {
                let remaining = &members[idx + 1..];
                if !remaining.is_empty() {
                    warn!(task = %member, ?remaining, "series aborted; skipping remaining tasks");
                }
                return Err(err);
            }
        }
    }
    Ok(report)
}
