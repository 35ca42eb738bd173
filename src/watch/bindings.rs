// src/watch/bindings.rs

use std::fmt;

use globset::GlobMatcher;
use tracing::debug;

use crate::config::SiteConfig;
use crate::engine::PipelineName;
use crate::errors::{PipelineError, Result};
use crate::select::compile_glob;
use crate::tasks::{compose_series, TaskRegistry};

/// One glob pattern bound to one pipeline.
#[derive(Clone)]
pub struct WatchBinding {
    pattern: String,
    matcher: GlobMatcher,
    pipeline: PipelineName,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("pattern", &self.pattern)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// `rel_path` is relative to the project root, with forward slashes.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// All watch bindings of a serve session.
#[derive(Debug, Clone, Default)]
pub struct WatchBindings {
    bindings: Vec<WatchBinding>,
}

impl WatchBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `pattern` to the serial composition of `tasks`.
    ///
    /// The pipeline is registered as `tasks.join("+")` (a single task is used
    /// as is). Every task must already be registered.
    pub fn bind(
        &mut self,
        registry: &mut TaskRegistry,
        pattern: &str,
        tasks: &[&str],
    ) -> Result<PipelineName> {
        if tasks.is_empty() {
            return Err(PipelineError::ConfigError(format!(
                "watch pattern '{pattern}' has no tasks"
            )));
        }
        if let Some(unknown) = tasks.iter().find(|t| !registry.contains(t)) {
            return Err(PipelineError::UnknownTask(unknown.to_string()));
        }

        let pipeline = tasks.join("+");
        if tasks.len() > 1 && !registry.contains(&pipeline) {
            compose_series(registry, &pipeline, tasks)?;
        }

        let matcher = compile_glob(pattern.trim_start_matches("./"))?;
        debug!(pattern, pipeline = %pipeline, "bound watch pattern");
        self.bindings.push(WatchBinding {
            pattern: pattern.to_string(),
            matcher,
            pipeline: pipeline.clone(),
        });
        Ok(pipeline)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Pipelines whose pattern matches `rel_path`, each once, in binding
    /// order.
    pub fn pipelines_for(&self, rel_path: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for binding in self.bindings.iter().filter(|b| b.matches(rel_path)) {
            if !out.contains(&binding.pipeline()) {
                out.push(binding.pipeline());
            }
        }
        out
    }
}

/// Bindings of the standard site layout.
///
/// | pattern                | pipeline        |
/// |------------------------|-----------------|
/// | `src/img/**/*`         | images, refresh |
/// | `src/img/sprite/*.svg` | sprite, refresh |
/// | `src/sass/**/*.scss`   | style           |
/// | `src/**/*.html`        | html, refresh   |
pub fn site_bindings(cfg: &SiteConfig, registry: &mut TaskRegistry) -> Result<WatchBindings> {
    let src = cfg.src_glob_root();
    let mut bindings = WatchBindings::new();
    bindings.bind(registry, &format!("{src}/img/**/*"), &["images", "refresh"])?;
    bindings.bind(registry, &format!("{src}/img/sprite/*.svg"), &["sprite", "refresh"])?;
    bindings.bind(registry, &format!("{src}/sass/**/*.scss"), &["style"])?;
    bindings.bind(registry, &format!("{src}/**/*.html"), &["html", "refresh"])?;
    Ok(bindings)
}
