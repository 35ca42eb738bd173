// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::FailurePolicy;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    #[error("Cycle detected in task graph: {0}")]
    TaskCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{stage} failed on {}: {message}", .path.display())]
    Stage {
        stage: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        policy: FailurePolicy,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("serve session aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Shorthand for a failed transformation stage.
    pub fn stage(stage: &'static str, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        PipelineError::Stage {
            stage,
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Failure policy of the innermost failing task, if this error came out of
    /// a task run.
    pub fn failure_policy(&self) -> Option<FailurePolicy> {
        match self {
            PipelineError::TaskFailed { policy, .. } => Some(*policy),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
