use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Behaviour when a pipeline is triggered again while it is still running.
///
/// - `Queue`: remember the trigger and re-run the pipeline once the current
///   run finishes. Repeated triggers coalesce; at most `queue_length` follow-up
///   runs are remembered (default behaviour).
/// - `Drop`: ignore triggers that arrive while the pipeline is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Drop,
}

impl FromStr for TriggerWhileRunningBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(TriggerWhileRunningBehaviour::Queue),
            "drop" => Ok(TriggerWhileRunningBehaviour::Drop),
            other => Err(format!(
                "invalid triggered_while_running_behaviour: {other} (expected \"queue\" or \"drop\")"
            )),
        }
    }
}

/// What a task failure means for a long-running serve session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The failure ends the serve session.
    #[default]
    Fatal,
    /// The failure is logged and the serve session keeps going.
    Guarded,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Fatal => f.write_str("fatal"),
            FailurePolicy::Guarded => f.write_str("guarded"),
        }
    }
}

/// Whether tasks run as part of a one-shot build or a serve session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Build,
    Serve,
}
