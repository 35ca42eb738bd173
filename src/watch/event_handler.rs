// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::bindings::WatchBindings;
use crate::watch::path_utils::relative_str;

/// Whether a notify event can change what a pipeline would produce.
/// Reads and opens (access events) cannot.
pub fn is_relevant(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

/// Trigger every pipeline bound to a pattern matching `path`.
///
/// Returns `false` once the runtime channel is closed, so the caller can
/// stop watching.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    bindings: &WatchBindings,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let Some(rel) = relative_str(root, path) else {
        debug!(path = %path.display(), "event path outside the project root");
        return true;
    };

    for pipeline in bindings.pipelines_for(&rel) {
        debug!(path = %rel, pipeline, "watch match -> triggering pipeline");
        let event = RuntimeEvent::PipelineTriggered {
            pipeline: pipeline.to_string(),
            reason: TriggerReason::FileWatch,
        };
        if let Err(err) = runtime_tx.send(event).await {
            warn!("failed to send RuntimeEvent::PipelineTriggered: {err}");
            return false;
        }
    }
    true
}
