// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};
use crate::exec::PipelineExecutor;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Async shell around [`CoreRuntime`]: reads events from the channel, feeds
/// them to the core and carries out the resulting commands through a
/// [`PipelineExecutor`].
pub struct Runtime<E: PipelineExecutor> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: PipelineExecutor> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: PipelineExecutor> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop. Ends on shutdown, when the core asks to exit, or
    /// with [`PipelineError::Aborted`] after a fatal pipeline failure.
    pub async fn run(mut self) -> Result<()> {
        info!("runtime started");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");
            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartPipeline(pipeline) => {
                self.executor.start_pipeline(pipeline).await?;
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
            CoreCommand::Abort { pipeline, message } => {
                return Err(PipelineError::Aborted(format!(
                    "pipeline '{pipeline}' failed: {message}"
                )));
            }
        }
        Ok(())
    }
}
