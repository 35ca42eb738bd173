// src/tasks/site.rs

//! The standard site pipeline.
//!
//! Layout (with the default `[paths]`):
//!
//! | task    | reads                                         | writes                      |
//! |---------|-----------------------------------------------|-----------------------------|
//! | clean   |                                               | removes `build/`            |
//! | copy    | `src/fonts/**/*.{woff,woff2}`, `src/img/*.webp`, `src/js/*` | `build/<same path>` |
//! | images  | `src/img/**/*.{png,jpg,svg,webp}` minus sprite icons | `build/img/...`      |
//! | sprite  | `src/img/sprite/*.svg`                        | `build/img/sprite.svg`      |
//! | style   | `src/sass/style.scss`                         | `build/css/style{,.min}.css`|
//! | html    | `src/**/*.html`                               | `build/...`                 |
//! | refresh |                                               | reloads connected browsers  |
//! | build   | clean → copy → images → sprite → style → html |                             |

use crate::config::SiteConfig;
use crate::errors::Result;
use crate::select::SourceSet;
use crate::stages::{ImageOptimizer, SpriteBuilder, StyleCompiler};
use crate::tasks::asset::AssetTask;
use crate::tasks::clean::clean_task;
use crate::tasks::refresh::refresh_task;
use crate::tasks::sprite::SpriteTask;
use crate::tasks::style::StyleTask;
use crate::tasks::{compose_series, TaskRegistry};
use crate::types::FailurePolicy;

/// Tasks that make up a full build, in order.
pub const BUILD_SERIES: &[&str] = &["clean", "copy", "images", "sprite", "style", "html"];

/// Build the registry for the standard site layout. The result is
/// validated.
pub fn site_registry(cfg: &SiteConfig) -> Result<TaskRegistry> {
    let src = cfg.src_glob_root();
    let build = cfg.paths.build.clone();
    let mut registry = TaskRegistry::new();

    registry.register("clean", clean_task(build.clone()), &[])?;

    let copy = SourceSet::new([
        format!("{src}/fonts/**/*.{{woff,woff2}}"),
        format!("{src}/img/*.webp"),
        format!("{src}/js/*"),
    ])?
    .with_base(&cfg.paths.src);
    registry.register("copy", AssetTask::new(copy, &build), &[])?;

    let images = SourceSet::new([
        format!("{src}/img/**/*.{{png,jpg,svg,webp}}"),
        format!("!{src}/img/sprite/*.svg"),
    ])?;
    registry.register(
        "images",
        AssetTask::new(images, build.join("img"))
            .with_stages(vec![Box::new(ImageOptimizer::from_config(&cfg.images))])
            .only_newer(),
        &[],
    )?;

    let icons = SourceSet::new([format!("{src}/img/sprite/*.svg")])?;
    let builder = SpriteBuilder::new(&cfg.sprite.remove_attrs, cfg.sprite.inline)?;
    registry.register(
        "sprite",
        SpriteTask::new(icons, build.join("img").join(&cfg.sprite.file_name), builder),
        &[],
    )?;

    let compiler = StyleCompiler::new(&cfg.style.browsers)?;
    registry.register(
        "style",
        StyleTask::new(
            cfg.paths.src.join(&cfg.style.entry),
            build.join("css"),
            "css",
            compiler,
        ),
        &[],
    )?;
    registry.set_failure_policy("style", FailurePolicy::Guarded)?;

    let html = SourceSet::new([format!("{src}/**/*.html")])?.with_base(&cfg.paths.src);
    registry.register("html", AssetTask::new(html, &build), &[])?;
    registry.set_failure_policy("html", FailurePolicy::Guarded)?;

    registry.register("refresh", refresh_task(), &[])?;

    compose_series(&mut registry, "build", BUILD_SERIES)?;

    registry.validate()?;
    Ok(registry)
}
