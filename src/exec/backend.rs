// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to a `PipelineExecutor` instead of the task registry
//! directly, so tests can swap in a fake executor that records which
//! pipelines were started and reports completion on its own.
//!
//! `RegistryExecutor` is the production implementation: it runs the pipeline
//! on its own Tokio task and reports the outcome back as a
//! `RuntimeEvent::PipelineCompleted`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::engine::{PipelineName, PipelineOutcome, RuntimeEvent};
use crate::errors::Result;
use crate::tasks::{TaskContext, TaskRegistry};
use crate::types::FailurePolicy;

/// Trait abstracting how pipelines are executed.
pub trait PipelineExecutor: Send {
    /// Start `pipeline`. Must not wait for it to finish; completion is
    /// reported through the runtime's event channel.
    fn start_pipeline(
        &mut self,
        pipeline: PipelineName,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs pipelines from a [`TaskRegistry`].
#[derive(Debug)]
pub struct RegistryExecutor {
    registry: Arc<TaskRegistry>,
    ctx: TaskContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RegistryExecutor {
    pub fn new(
        registry: Arc<TaskRegistry>,
        ctx: TaskContext,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            registry,
            ctx,
            runtime_tx,
        }
    }
}

impl PipelineExecutor for RegistryExecutor {
    fn start_pipeline(
        &mut self,
        pipeline: PipelineName,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let registry = Arc::clone(&self.registry);
        let ctx = self.ctx.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match registry.run(&pipeline, &ctx).await {
                    Ok(_report) => PipelineOutcome::Success,
                    Err(err) => PipelineOutcome::Failed {
                        policy: err.failure_policy().unwrap_or(FailurePolicy::Fatal),
                        message: err.to_string(),
                    },
                };
                if let Err(err) = tx
                    .send(RuntimeEvent::PipelineCompleted { pipeline, outcome })
                    .await
                {
                    warn!("failed to report pipeline completion: {err}");
                }
            });
            Ok(())
        })
    }
}
