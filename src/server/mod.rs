// src/server/mod.rs

//! Development server.
//!
//! Serves the output directory over HTTP, injects a small live-reload client
//! into HTML pages and pushes [`LiveMessage`]s to it over Server-Sent Events
//! at [`LIVE_PATH`]. A [`DevServer`] is consumed by
//! [`start`](DevServer::start); the running server lives until the process
//! exits.

pub mod client;
pub mod live;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ServerSection;
use crate::errors::{Error, PipelineError, Result};

pub use client::inject_client;
pub use live::{LiveMessage, LiveReload};

/// SSE endpoint the injected client connects to.
pub const LIVE_PATH: &str = "/__sitepipe/live";

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Directory to serve.
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    pub open: bool,
    pub cors: bool,
    pub notify: bool,
}

impl ServerOptions {
    pub fn from_config(server: &ServerSection, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            host: server.host.clone(),
            port: server.port,
            open: server.open,
            cors: server.cors,
            notify: server.notify,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerState {
    pub(crate) root: PathBuf,
    pub(crate) live: LiveReload,
    pub(crate) notify: bool,
    pub(crate) cors: bool,
}

/// A configured server that is not listening yet.
#[derive(Debug)]
pub struct DevServer {
    options: ServerOptions,
    live: LiveReload,
}

impl DevServer {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            options,
            live: LiveReload::new(),
        }
    }

    /// Channel tasks use to reach the browsers of this server.
    pub fn live(&self) -> LiveReload {
        self.live.clone()
    }

    /// Bind and start serving in the background.
    pub async fn start(self) -> Result<RunningServer> {
        let addr = format!("{}:{}", self.options.host, self.options.port);
        let bind_addr = tokio::net::lookup_host(&addr)
            .await?
            .next()
            .ok_or_else(|| PipelineError::ConfigError(format!("cannot resolve server address {addr}")))?;

        let app = routes::routes(ServerState {
            root: self.options.root.clone(),
            live: self.live.clone(),
            notify: self.options.notify,
            cors: self.options.cors,
        });

        let (local_addr, server) = warp::serve(app).try_bind_ephemeral(bind_addr).map_err(|e| {
            PipelineError::Other(Error::new(e).context(format!("binding dev server to {addr}")))
        })?;
        let handle = tokio::spawn(server);

        let url = format!("http://{local_addr}/");
        info!(%url, root = %self.options.root.display(), "dev server listening");
        if self.options.open {
            open_browser(&url);
        }

        Ok(RunningServer {
            addr: local_addr,
            live: self.live,
            _handle: handle,
        })
    }
}

/// A listening server.
#[derive(Debug)]
pub struct RunningServer {
    addr: SocketAddr,
    live: LiveReload,
    _handle: JoinHandle<()>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn live(&self) -> LiveReload {
        self.live.clone()
    }
}

fn open_browser(url: &str) {
    let mut cmd = if cfg!(target_os = "macos") {
        tokio::process::Command::new("open")
    } else if cfg!(windows) {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        tokio::process::Command::new("xdg-open")
    };
    cmd.arg(url)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    if let Err(err) = cmd.spawn() {
        warn!(%url, error = %err, "could not open a browser");
    }
}
