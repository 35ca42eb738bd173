// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::TriggerWhileRunningBehaviour;

/// Top-level configuration as read from a TOML file.
///
/// Every section is optional; a project without a `Sitepipe.toml` gets the
/// standard layout:
///
/// ```toml
/// [paths]
/// src = "src"
/// build = "build"
///
/// [server]
/// port = 9999
///
/// [config]
/// triggered_while_running_behaviour = "queue"
/// queue_length = 1
/// ```
///
/// This is the unvalidated form; convert it into [`SiteConfig`] with
/// `SiteConfig::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSiteConfig {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub images: ImagesSection,

    #[serde(default)]
    pub sprite: SpriteSection,

    #[serde(default)]
    pub style: StyleSection,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawSiteConfig>` (see `validate.rs`),
/// so holders can rely on the invariants checked there.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub paths: PathsSection,
    pub server: ServerSection,
    pub config: ConfigSection,
    pub images: ImagesSection,
    pub sprite: SpriteSection,
    pub style: StyleSection,
}

impl SiteConfig {
    pub(crate) fn new_unchecked(raw: RawSiteConfig) -> Self {
        Self {
            paths: raw.paths,
            server: raw.server,
            config: raw.config,
            images: raw.images,
            sprite: raw.sprite,
            style: raw.style,
        }
    }

    /// Source root as a forward-slash string, used to build glob patterns.
    pub fn src_glob_root(&self) -> String {
        glob_root(&self.paths.src)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new_unchecked(RawSiteConfig::default())
    }
}

fn glob_root(path: &std::path::Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.trim_end_matches('/').to_string()
}

/// `[paths]`: source and output roots, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    #[serde(default = "default_src")]
    pub src: PathBuf,

    #[serde(default = "default_build")]
    pub build: PathBuf,
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_build() -> PathBuf {
    PathBuf::from("build")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            build: default_build(),
        }
    }
}

/// `[server]`: dev server behaviour flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port 0 asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open a browser tab once the server is listening.
    #[serde(default = "default_true")]
    pub open: bool,

    /// Allow cross-origin requests.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Show a small notification banner in the page on live updates.
    #[serde(default)]
    pub notify: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_true() -> bool {
    true
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open: true,
            cors: true,
            notify: false,
        }
    }
}

/// `[config]`: what happens when watch triggers overlap a running pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// `"queue"` (default) or `"drop"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of follow-up runs remembered per pipeline.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_queue_length() -> usize {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            queue_length: default_queue_length(),
        }
    }
}

/// `[images]`: image optimizer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImagesSection {
    /// oxipng preset, 0 (fast) to 6 (smallest).
    #[serde(default = "default_png_level")]
    pub png_level: u8,

    /// Drop EXIF/XMP/comment segments from JPEG files.
    #[serde(default = "default_true")]
    pub strip_jpeg_metadata: bool,
}

fn default_png_level() -> u8 {
    3
}

impl Default for ImagesSection {
    fn default() -> Self {
        Self {
            png_level: default_png_level(),
            strip_jpeg_metadata: true,
        }
    }
}

/// `[sprite]`: SVG sprite settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteSection {
    #[serde(default = "default_sprite_name")]
    pub file_name: String,

    /// Regex matched against attribute names; matching attributes are removed
    /// from every merged fragment.
    #[serde(default = "default_remove_attrs")]
    pub remove_attrs: String,

    /// Omit the XML declaration and doctype so the sprite can be inlined.
    #[serde(default = "default_true")]
    pub inline: bool,
}

fn default_sprite_name() -> String {
    "sprite.svg".to_string()
}

fn default_remove_attrs() -> String {
    "(stroke|fill)".to_string()
}

impl Default for SpriteSection {
    fn default() -> Self {
        Self {
            file_name: default_sprite_name(),
            remove_attrs: default_remove_attrs(),
            inline: true,
        }
    }
}

/// `[style]`: stylesheet entry point and browser targets.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleSection {
    /// Entry point, relative to `paths.src`.
    #[serde(default = "default_entry")]
    pub entry: PathBuf,

    /// Browserslist queries used for vendor prefixing.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,
}

fn default_entry() -> PathBuf {
    PathBuf::from("sass/style.scss")
}

fn default_browsers() -> Vec<String> {
    vec!["defaults".to_string()]
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            browsers: default_browsers(),
        }
    }
}
