// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeSet;

use tracing::{debug, error, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::{PipelineName, PipelineOutcome, RuntimeOptions, TriggerReason};
use crate::types::{FailurePolicy, RunMode};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand this pipeline to the executor.
    StartPipeline(PipelineName),
    /// Nothing left to do (used with `exit_when_idle`).
    RequestExit,
    /// A fatal failure ends the session.
    Abort {
        pipeline: PipelineName,
        message: String,
    },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Start the pipeline unless it is already running, in which case the
/// trigger goes to the queue.
pub fn handle_pipeline_trigger(
    running: &mut BTreeSet<PipelineName>,
    queue: &mut TriggerQueue,
    pipeline: PipelineName,
    reason: TriggerReason,
) -> CoreStep {
    if running.contains(&pipeline) {
        queue.record_trigger(&pipeline);
        return CoreStep::keep(Vec::new());
    }

    debug!(pipeline = %pipeline, ?reason, "starting pipeline");
    running.insert(pipeline.clone());
    CoreStep::keep(vec![CoreCommand::StartPipeline(pipeline)])
}

/// Bookkeeping after a run: apply the failure policy, start a queued
/// follow-up run, and exit when idle if asked to.
pub fn handle_pipeline_completion(
    running: &mut BTreeSet<PipelineName>,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    pipeline: PipelineName,
    outcome: PipelineOutcome,
) -> CoreStep {
    running.remove(&pipeline);

    if let PipelineOutcome::Failed { policy, message } = outcome {
        let fatal = options.mode == RunMode::Build || policy == FailurePolicy::Fatal;
        if fatal {
            error!(pipeline = %pipeline, %policy, error = %message, "pipeline failed; aborting");
            return CoreStep {
                commands: vec![CoreCommand::Abort { pipeline, message }],
                keep_running: false,
            };
        }
        warn!(
            pipeline = %pipeline,
            error = %message,
            "guarded task failed; waiting for the next change"
        );
    }

    let mut commands = Vec::new();
    if queue.take(&pipeline) {
        debug!(pipeline = %pipeline, "starting queued follow-up run");
        running.insert(pipeline.clone());
        commands.push(CoreCommand::StartPipeline(pipeline));
    }

    if options.exit_when_idle && running.is_empty() && queue.is_empty() {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::keep(commands)
}
