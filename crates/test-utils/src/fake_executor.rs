use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use sitepipe::engine::{PipelineName, PipelineOutcome, RuntimeEvent};
use sitepipe::errors::Result;
use sitepipe::exec::PipelineExecutor;

/// A fake executor that:
/// - records which pipelines were started
/// - reports `PipelineCompleted` right away with a scripted outcome
///   (success unless scripted otherwise), or never, in holding mode, so the
///   test can complete runs itself.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    started: Arc<Mutex<Vec<PipelineName>>>,
    outcomes: HashMap<PipelineName, VecDeque<PipelineOutcome>>,
    hold: bool,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            started: Arc::new(Mutex::new(Vec::new())),
            outcomes: HashMap::new(),
            hold: false,
        }
    }

    /// Never report completion on its own.
    pub fn holding(mut self) -> Self {
        self.hold = true;
        self
    }

    /// Next run of `pipeline` ends with `outcome`.
    pub fn script(mut self, pipeline: &str, outcome: PipelineOutcome) -> Self {
        self.outcomes
            .entry(pipeline.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Shared list of started pipelines, in start order.
    pub fn started(&self) -> Arc<Mutex<Vec<PipelineName>>> {
        Arc::clone(&self.started)
    }
}

impl PipelineExecutor for FakeExecutor {
    fn start_pipeline(
        &mut self,
        pipeline: PipelineName,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        self.started.lock().unwrap().push(pipeline.clone());
        let outcome = self
            .outcomes
            .get_mut(&pipeline)
            .and_then(|q| q.pop_front())
            .unwrap_or(PipelineOutcome::Success);
        let hold = self.hold;

        Box::pin(async move {
            if !hold {
                // Report from a separate task: the runtime is busy running
                // this command and may not be draining the channel.
                tokio::spawn(async move {
                    let _ = tx
                        .send(RuntimeEvent::PipelineCompleted { pipeline, outcome })
                        .await;
                });
            }
            Ok(())
        })
    }
}
