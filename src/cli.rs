// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `vertexman`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vertexman",
    version,
    about = "Run the vertex manager runtime over a DAG topology.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the DAG topology file (TOML).
    ///
    /// Default: `Dag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Dag.toml")]
    pub dag: String,

    /// Exit once every vertex is configured and all tasks are admitted.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VERTEXMAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the topology, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
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
