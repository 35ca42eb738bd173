// src/engine/queue.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::PipelineName;
use crate::types::TriggerWhileRunningBehaviour;

/// Follow-up runs remembered for pipelines that are currently running.
///
/// Semantics:
/// - Triggers for a running pipeline are coalesced into a per-pipeline count
///   of follow-up runs, capped at `max_runs` (`queue_length` in the config,
///   default 1). With the default, any number of triggers during a run
///   produce exactly one follow-up run.
/// - In `Drop` mode nothing is remembered.
/// - When a run completes, the runtime calls [`take`](TriggerQueue::take) to
///   learn whether to start the pipeline again.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    pending: BTreeMap<PipelineName, usize>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        Self {
            behaviour,
            max_runs: max_runs.max(1),
            pending: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Follow-up runs currently remembered for `pipeline`.
    pub fn pending_for(&self, pipeline: &str) -> usize {
        self.pending.get(pipeline).copied().unwrap_or(0)
    }

    /// Record a trigger for a pipeline that is running. Returns whether it
    /// added a follow-up run.
    pub fn record_trigger(&mut self, pipeline: &str) -> bool {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Drop => {
                debug!(pipeline, "pipeline running; dropping trigger (drop mode)");
                false
            }
            TriggerWhileRunningBehaviour::Queue => {
                let count = self.pending.entry(pipeline.to_string()).or_insert(0);
                if *count >= self.max_runs {
                    debug!(pipeline, pending = *count, "follow-up already queued; coalescing trigger");
                    return false;
                }
                *count += 1;
                debug!(pipeline, pending = *count, "queued follow-up run");
                true
            }
        }
    }

    /// Consume one follow-up run for `pipeline`, if any.
    pub fn take(&mut self, pipeline: &str) -> bool {
        let Some(count) = self.pending.get_mut(pipeline) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.pending.remove(pipeline);
        }
        true
    }
}
