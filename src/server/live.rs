// src/server/live.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 16;

/// Message pushed to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveMessage {
    /// Reload the whole page.
    Reload,
    /// Swap the stylesheet at `path` (relative to the site root) for a fresh
    /// copy; `version` busts the browser cache.
    Css { path: String, version: String },
}

impl LiveMessage {
    /// SSE event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            LiveMessage::Reload => "reload",
            LiveMessage::Css { .. } => "css",
        }
    }

    /// SSE data line.
    pub fn data(&self) -> String {
        match self {
            LiveMessage::Reload => String::new(),
            LiveMessage::Css { path, version } => format!("{path}?v={version}"),
        }
    }
}

/// Fan-out channel from tasks to every open browser tab.
#[derive(Debug, Clone)]
pub struct LiveReload {
    tx: broadcast::Sender<LiveMessage>,
    /// Last injected fingerprint per stylesheet path.
    versions: Arc<Mutex<HashMap<String, String>>>,
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveReload {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            versions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveMessage> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Ask every client to reload. Returns how many were notified.
    pub fn reload(&self) -> usize {
        let sent = self.tx.send(LiveMessage::Reload).unwrap_or(0);
        debug!(clients = sent, "sent reload");
        sent
    }

    /// Push new CSS for `path` unless it is identical to what was pushed
    /// last. Returns whether a message went out.
    pub fn inject_css(&self, path: &str, css: &str) -> bool {
        let version = fingerprint(css);
        {
            let mut versions = match self.versions.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    warn!("live-reload version map poisoned; recovering");
                    poisoned.into_inner()
                }
            };
            if versions.get(path) == Some(&version) {
                debug!(path, "stylesheet unchanged; not injecting");
                return false;
            }
            versions.insert(path.to_string(), version.clone());
        }

        let sent = self
            .tx
            .send(LiveMessage::Css {
                path: path.to_string(),
                version,
            })
            .unwrap_or(0);
        debug!(path, clients = sent, "injected stylesheet");
        true
    }
}

/// Short content fingerprint.
pub fn fingerprint(content: &str) -> String {
    let hash = blake3::hash(content.as_bytes());
    hash.to_hex()[..16].to_string()
}
