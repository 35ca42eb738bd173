// src/engine/mod.rs

//! Orchestration engine for the serve session.
//!
//! Watch triggers arrive as [`RuntimeEvent`]s naming a pipeline. The engine
//! makes sure a pipeline never runs twice at the same time, remembers
//! triggers that arrive while it is running (see [`TriggerQueue`]) and
//! decides what a failed run means for the session.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::{FailurePolicy, RunMode};

/// Name of a registered task or composed pipeline.
pub type PipelineName = String;

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success,
    Failed {
        /// Policy of the task that failed.
        policy: FailurePolicy,
        message: String,
    },
}

/// Why a pipeline was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Requested at startup or from the command line.
    Manual,
    /// A watched file changed.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Exit once nothing is running and nothing is queued.
    pub exit_when_idle: bool,
    /// In build mode every failure is fatal; in serve mode only failures of
    /// tasks that are not guarded are.
    pub mode: RunMode,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            exit_when_idle: false,
            mode: RunMode::Serve,
        }
    }
}

/// Events flowing into the runtime from the watcher, the executor and the
/// Ctrl-C handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    PipelineTriggered {
        pipeline: PipelineName,
        reason: TriggerReason,
    },
    PipelineCompleted {
        pipeline: PipelineName,
        outcome: PipelineOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
