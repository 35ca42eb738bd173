#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sitepipe::config::{RawSiteConfig, SiteConfig};
use sitepipe::types::TriggerWhileRunningBehaviour;

/// Builder for `SiteConfig` to simplify test setup.
pub struct SiteConfigBuilder {
    config: RawSiteConfig,
}

impl SiteConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawSiteConfig::default(),
        }
    }

    pub fn src(mut self, dir: &str) -> Self {
        self.config.paths.src = PathBuf::from(dir);
        self
    }

    pub fn build_dir(mut self, dir: &str) -> Self {
        self.config.paths.build = PathBuf::from(dir);
        self
    }

    pub fn behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.config.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn queue_length(mut self, len: usize) -> Self {
        self.config.config.queue_length = len;
        self
    }

    /// Port 0, no browser tab.
    pub fn test_server(mut self) -> Self {
        self.config.server.port = 0;
        self.config.server.open = false;
        self
    }

    pub fn notify(mut self, val: bool) -> Self {
        self.config.server.notify = val;
        self
    }

    pub fn sprite_inline(mut self, val: bool) -> Self {
        self.config.sprite.inline = val;
        self
    }

    pub fn browsers(mut self, queries: &[&str]) -> Self {
        self.config.style.browsers = queries.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn raw(self) -> RawSiteConfig {
        self.config
    }

    pub fn build(self) -> SiteConfig {
        SiteConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for SiteConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A project directory on disk, removed when dropped.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn read_string(&self, rel: &str) -> String {
        String::from_utf8(self.read(rel)).expect("utf-8 file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// All files under `rel`, relative to it, sorted.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let base = self.path(rel);
        let mut out = Vec::new();
        let mut stack = vec![base.clone()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Ok(r) = path.strip_prefix(&base) {
                    out.push(r.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        out.sort();
        out
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}
