// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build and serve a static site: images, SVG sprite, SCSS and live reload.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file (TOML). The file is optional.
    ///
    /// Default: `Sitepipe.toml` in the current working directory. Paths in
    /// the config are relative to the directory containing it.
    #[arg(long, global = true, value_name = "PATH", default_value = "Sitepipe.toml")]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate everything, print the task table, run nothing.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Clean and rebuild the output directory.
    Build,
    /// Start the dev server and re-run pipelines on file changes.
    Serve,
    /// `build`, then `serve`.
    Start,
    /// Run a single task or pipeline by name.
    Run {
        /// Task name, e.g. `style` or `images+refresh`.
        task: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
