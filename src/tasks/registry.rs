// src/tasks/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::errors::{PipelineError, Result};
use crate::tasks::graph::TaskGraph;
use crate::tasks::{composer, TaskAction, TaskContext, TaskFuture, TaskName, TaskReport};
use crate::types::FailurePolicy;

#[derive(Debug, Clone)]
pub(crate) enum TaskKind {
    Action(Arc<dyn TaskAction>),
    Series(Vec<TaskName>),
}

#[derive(Debug, Clone)]
struct TaskEntry {
    kind: TaskKind,
    prerequisites: Vec<TaskName>,
    policy: FailurePolicy,
}

/// Name → task table.
///
/// Tasks are declared once at startup and never change after
/// [`validate`](TaskRegistry::validate); the registry is then shared
/// read-only (usually behind an `Arc`) by the build command, the engine and
/// the watch dispatcher.
#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskEntry>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `name` with `action`. `prerequisites` run first, serially
    /// and in the given order, every time the task runs.
    pub fn register<A>(&mut self, name: &str, action: A, prerequisites: &[&str]) -> Result<()>
    where
        A: TaskAction + 'static,
    {
        self.insert(
            name,
            TaskEntry {
                kind: TaskKind::Action(Arc::new(action)),
                prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
                policy: FailurePolicy::default(),
            },
        )
    }

    pub(crate) fn register_series(&mut self, name: &str, members: Vec<TaskName>) -> Result<()> {
        self.insert(
            name,
            TaskEntry {
                kind: TaskKind::Series(members),
                prerequisites: Vec::new(),
                policy: FailurePolicy::default(),
            },
        )
    }

    fn insert(&mut self, name: &str, entry: TaskEntry) -> Result<()> {
        if self.tasks.contains_key(name) {
            return Err(PipelineError::DuplicateTask(name.to_string()));
        }
        self.tasks.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn set_failure_policy(&mut self, name: &str, policy: FailurePolicy) -> Result<()> {
        let entry = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))?;
        entry.policy = policy;
        Ok(())
    }

    pub fn failure_policy(&self, name: &str) -> Option<FailurePolicy> {
        self.tasks.get(name).map(|t| t.policy)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn prerequisites_of(&self, name: &str) -> &[TaskName] {
        self.tasks
            .get(name)
            .map(|t| t.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// Members of a series task, `None` for plain tasks and unknown names.
    pub fn series_of(&self, name: &str) -> Option<&[TaskName]> {
        match self.tasks.get(name).map(|t| &t.kind) {
            Some(TaskKind::Series(members)) => Some(members.as_slice()),
            _ => None,
        }
    }

    /// Check that every referenced name exists and the task graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        TaskGraph::from_registry(self).check()
    }

    /// Run `name`: its prerequisites first, then its own action (or series
    /// members). Resolves once everything has completed.
    ///
    /// A failing plain task is reported as [`PipelineError::TaskFailed`]
    /// carrying that task's name and failure policy; enclosing series pass
    /// the innermost failure through unchanged.
    pub fn run<'a>(&'a self, name: &'a str, ctx: &'a TaskContext) -> TaskFuture<'a> {
        Box::pin(async move {
            let entry = self
                .tasks
                .get(name)
                .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))?;

            let mut report = TaskReport::default();
            for prerequisite in &entry.prerequisites {
                report = report.merge(self.run(prerequisite, ctx).await?);
            }

            info!(task = name, "starting task");
            let started = Instant::now();

            let result = match &entry.kind {
                TaskKind::Action(action) => action
                    .run(ctx)
                    .await
                    .map_err(|e| into_task_failure(name, entry.policy, e)),
                TaskKind::Series(members) => composer::run_series(self, members, ctx).await,
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match result {
                Ok(own) => {
                    info!(
                        task = name,
                        elapsed_ms,
                        processed = own.processed,
                        skipped = own.skipped,
                        "finished task"
                    );
                    Ok(report.merge(own))
                }
                Err(err) => {
                    warn!(task = name, elapsed_ms, error = %err, "task failed");
                    Err(err)
                }
            }
        })
    }
}

fn into_task_failure(task: &str, policy: FailurePolicy, err: PipelineError) -> PipelineError {
    match err {
        already @ PipelineError::TaskFailed { .. } => already,
        other => PipelineError::TaskFailed {
            task: task.to_string(),
            policy,
            source: Box::new(other),
        },
    }
}
