// src/tasks/mod.rs

//! Named units of build work.
//!
//! - [`registry`] stores tasks by name and runs them (prerequisites first).
//! - [`composer`] builds serial pipelines out of registered tasks.
//! - [`graph`] checks the task graph for unknown names and cycles.
//! - [`context`] is what an action gets to work with (file system, roots,
//!   live-reload channel).
//! - [`asset`], [`sprite`], [`style`], [`clean`] and [`refresh`] are the
//!   built-in actions; [`site`] wires them into the standard site registry.

pub mod asset;
pub mod clean;
pub mod composer;
pub mod context;
pub mod graph;
pub mod refresh;
pub mod registry;
pub mod site;
pub mod sprite;
pub mod style;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

pub use composer::compose_series;
pub use context::TaskContext;
pub use registry::TaskRegistry;
pub use site::site_registry;

/// Canonical task name type.
pub type TaskName = String;

/// What a task did. Summed up across a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskReport {
    /// Files written (or messages sent, for signalling tasks).
    pub processed: usize,
    /// Files selected but left alone by the change filter.
    pub skipped: usize,
}

impl TaskReport {
    pub fn processed(processed: usize) -> Self {
        Self {
            processed,
            skipped: 0,
        }
    }

    pub fn merge(self, other: TaskReport) -> Self {
        Self {
            processed: self.processed + other.processed,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Future returned by a task action; resolving it is the completion signal.
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<TaskReport>> + Send + 'a>>;

/// The work behind a task name.
pub trait TaskAction: Send + Sync + fmt::Debug {
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> TaskFuture<'a>;
}

/// Adapter turning a plain closure into a [`TaskAction`].
///
/// The closure runs inline on the calling task, so it should be quick; file
/// processing belongs in an async action that uses `spawn_blocking`.
pub struct SyncTask<F> {
    label: &'static str,
    f: F,
}

impl<F> SyncTask<F>
where
    F: Fn(&TaskContext) -> Result<TaskReport> + Send + Sync,
{
    pub fn new(label: &'static str, f: F) -> Self {
        Self { label, f }
    }
}

impl<F> fmt::Debug for SyncTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncTask").field("label", &self.label).finish()
    }
}

impl<F> TaskAction for SyncTask<F>
where
    F: Fn(&TaskContext) -> Result<TaskReport> + Send + Sync,
{
    fn run<'a>(&'a self, ctx: &'a TaskContext) -> TaskFuture<'a> {
        let result = (self.f)(ctx);
        Box::pin(async move { result })
    }
}
