// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) reads events from channels,
//! hands pipelines to the executor and handles shutdown. The core is unit
//! tested without any Tokio, channels, filesystem, or tasks.

use std::collections::BTreeSet;

use crate::engine::event_handlers::{handle_pipeline_completion, handle_pipeline_trigger, CoreStep};
use crate::engine::queue::TriggerQueue;
use crate::engine::{PipelineName, RuntimeEvent, RuntimeOptions};
use crate::types::TriggerWhileRunningBehaviour;

/// Pure core runtime state: which pipelines run right now, what is queued
/// behind them, and the runtime options.
#[derive(Debug)]
pub struct CoreRuntime {
    running: BTreeSet<PipelineName>,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            running: BTreeSet::new(),
            queue: TriggerQueue::new(behaviour, queue_length),
            options,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn is_running(&self, pipeline: &str) -> bool {
        self.running.contains(pipeline)
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending_for(&self, pipeline: &str) -> usize {
        self.queue.pending_for(pipeline)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::PipelineTriggered { pipeline, reason } => {
                handle_pipeline_trigger(&mut self.running, &mut self.queue, pipeline, reason)
            }
            RuntimeEvent::PipelineCompleted { pipeline, outcome } => handle_pipeline_completion(
                &mut self.running,
                &mut self.queue,
                &self.options,
                pipeline,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
