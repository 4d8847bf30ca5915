// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_MANIFEST;
use crate::engine::DEFAULT_MAX_RETRIES;

/// Command-line arguments for `squidrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "squidrun",
    version,
    about = "Run the processes of a squid locally.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the squid source directory.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: String,

    /// Path to the manifest, relative to the squid source.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_MANIFEST)]
    pub manifest: String,

    /// Additional environment file, relative to the squid source.
    ///
    /// Default: `.env`, ignored when absent. An explicitly given file must
    /// exist.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub env_file: Option<String>,

    /// Do not run the named processes.
    #[arg(short, long, value_name = "NAME", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Run only the named processes.
    #[arg(short, long, value_name = "NAME", num_args = 1.., conflicts_with = "exclude")]
    pub include: Vec<String>,

    /// Attempts to restart a failed process before stopping everything.
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_MAX_RETRIES)]
    pub retries: u32,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SQUIDRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and resolve everything, print the launch plan, but don't start
    /// any process.
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
