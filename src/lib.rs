// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod select;
pub mod server;
pub mod stages;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{load_or_default, SiteConfig};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::RegistryExecutor;
use crate::server::{DevServer, ServerOptions};
use crate::tasks::graph::TaskGraph;
use crate::tasks::{site_registry, TaskContext, TaskRegistry};
use crate::types::RunMode;
use crate::watch::{site_bindings, WatchBindings};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the site task registry and watch bindings
/// - the one-shot build, or the dev server + watcher + runtime
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    let root = config_root_dir(&args.config);

    let mut registry = site_registry(&cfg)?;
    let bindings = site_bindings(&cfg, &mut registry)?;
    registry.validate()?;

    if args.dry_run {
        print_dry_run(&cfg, &registry, &bindings);
        return Ok(());
    }

    let registry = Arc::new(registry);
    match args.command {
        Command::Build => run_once(&registry, &root, "build").await,
        Command::Run { task } => run_once(&registry, &root, &task).await,
        Command::Serve => serve(&cfg, registry, bindings, root).await,
        Command::Start => {
            run_once(&registry, &root, "build").await?;
            serve(&cfg, registry, bindings, root).await
        }
    }
}

/// Run one task to completion. Any failure is fatal.
pub async fn run_once(registry: &TaskRegistry, root: &Path, task: &str) -> Result<()> {
    let ctx = TaskContext::real(root);
    let report = registry.run(task, &ctx).await?;
    info!(
        task,
        processed = report.processed,
        skipped = report.skipped,
        "done"
    );
    Ok(())
}

/// Start the dev server and the watcher, then drive watch-triggered
/// pipelines until Ctrl-C or a fatal failure.
pub async fn serve(
    cfg: &SiteConfig,
    registry: Arc<TaskRegistry>,
    bindings: WatchBindings,
    root: PathBuf,
) -> Result<()> {
    let server = DevServer::new(ServerOptions::from_config(
        &cfg.server,
        root.join(&cfg.paths.build),
    ));
    let live = server.live();
    let _server = server.start().await?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let ctx = TaskContext::real(&root).with_live(live);
    let executor = RegistryExecutor::new(registry, ctx, rt_tx.clone());

    let _watcher_handle = crate::watch::spawn_watcher(&root, Arc::new(bindings), rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: false,
        mode: RunMode::Serve,
    };
    let core = CoreRuntime::new(
        cfg.config.triggered_while_running_behaviour,
        cfg.config.queue_length,
        options,
    );

    Runtime::new(core, rt_rx, executor).run().await?;
    Ok(())
}

/// Paths in the config are relative to the directory holding it.
///
/// - "site/Sitepipe.toml" → "site"
/// - a bare "Sitepipe.toml" (parent = "") → the current working directory
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_dry_run(cfg: &SiteConfig, registry: &TaskRegistry, bindings: &WatchBindings) {
    println!("sitepipe dry-run");
    println!("  paths.src = {}", cfg.paths.src.display());
    println!("  paths.build = {}", cfg.paths.build.display());
    println!(
        "  server = {}:{} (open: {}, cors: {}, notify: {})",
        cfg.server.host, cfg.server.port, cfg.server.open, cfg.server.cors, cfg.server.notify
    );
    println!(
        "  config.triggered_while_running_behaviour = {:?}",
        cfg.config.triggered_while_running_behaviour
    );
    println!("  config.queue_length = {}", cfg.config.queue_length);
    println!();

    let graph = TaskGraph::from_registry(registry);
    println!("tasks:");
    for name in registry.names() {
        let policy = registry.failure_policy(name).unwrap_or_default();
        match registry.series_of(name) {
            Some(_) => println!(
                "  - {name} [{policy}] = {}",
                graph.execution_order(name).join(" -> ")
            ),
            None => println!("  - {name} [{policy}]"),
        }
    }
    println!();

    println!("watch ({}):", bindings.len());
    for binding in bindings.iter() {
        println!("  - {} -> {}", binding.pattern(), binding.pipeline());
    }

    debug!("dry-run complete (no execution)");
}
