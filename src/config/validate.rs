// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::config::model::{RawSiteConfig, SiteConfig};
use crate::errors::{PipelineError, Result};

impl TryFrom<RawSiteConfig> for SiteConfig {
    type Error = PipelineError;

    fn try_from(raw: RawSiteConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(SiteConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawSiteConfig) -> Result<()> {
    validate_global_config(cfg)?;
    validate_paths(cfg)?;
    validate_images(cfg)?;
    validate_sprite(cfg)?;
    validate_style(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawSiteConfig) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(PipelineError::ConfigError(
            "[config].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(cfg: &RawSiteConfig) -> Result<()> {
    let src = normalize(&cfg.paths.src);
    let build = normalize(&cfg.paths.build);

    if src.as_os_str().is_empty() || build.as_os_str().is_empty() {
        return Err(PipelineError::ConfigError(
            "[paths].src and [paths].build must not be empty".to_string(),
        ));
    }
    if src == build {
        return Err(PipelineError::ConfigError(format!(
            "[paths].src and [paths].build must differ (both are '{}')",
            src.display()
        )));
    }
    // The watcher observes `src`; writing output inside it would retrigger
    // the pipelines forever.
    if build.starts_with(&src) {
        return Err(PipelineError::ConfigError(format!(
            "[paths].build ('{}') must not be inside [paths].src ('{}')",
            build.display(),
            src.display()
        )));
    }
    Ok(())
}

fn validate_images(cfg: &RawSiteConfig) -> Result<()> {
    if cfg.images.png_level > 6 {
        return Err(PipelineError::ConfigError(format!(
            "[images].png_level must be between 0 and 6 (got {})",
            cfg.images.png_level
        )));
    }
    Ok(())
}

fn validate_sprite(cfg: &RawSiteConfig) -> Result<()> {
    if cfg.sprite.file_name.trim().is_empty() {
        return Err(PipelineError::ConfigError(
            "[sprite].file_name must not be empty".to_string(),
        ));
    }
    Regex::new(&cfg.sprite.remove_attrs).map_err(|e| {
        PipelineError::ConfigError(format!(
            "[sprite].remove_attrs is not a valid regex: {e}"
        ))
    })?;
    Ok(())
}

fn validate_style(cfg: &RawSiteConfig) -> Result<()> {
    if cfg.style.entry.as_os_str().is_empty() {
        return Err(PipelineError::ConfigError(
            "[style].entry must not be empty".to_string(),
        ));
    }
    if cfg.style.browsers.is_empty() {
        return Err(PipelineError::ConfigError(
            "[style].browsers must contain at least one query".to_string(),
        ));
    }
    Ok(())
}

/// Drop `.` components so `./src` and `src` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
