//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fanout Tee - copy input to many destinations concurrently
#[derive(Parser, Debug)]
#[command(
    name = "fanout-tee",
    author,
    version,
    about = "Concurrent tee: copy input to every sink in parallel",
    long_about = "Reads standard input (or a file) and writes every chunk to all\n\
                  configured sinks at the same time. A chunk counts as written only\n\
                  once every sink has accepted it in full; the first failure stops the copy."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FANOUT_TEE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "FANOUT_TEE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy input to all sinks
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Files to write to, in addition to configured sinks
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "FANOUT_TEE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Append to the given files instead of truncating them
    #[arg(short, long)]
    pub append: bool,

    /// Also copy to stdout
    #[arg(long)]
    pub stdout: bool,

    /// Override chunk size from configuration (bytes)
    #[arg(long, env = "FANOUT_TEE_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "FANOUT_TEE_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without copying
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FANOUT_TEE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "tee.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "tee.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
