//! # Fanout Tee CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 并发 tee：将输入同时写入所有 sink
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_tee, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "fanout-tee starting");

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_tee(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let config = ObservabilityConfig::default().with_format(cli.log_format.into());

    let config = if cli.quiet {
        config.quiet()
    } else {
        config.with_level(match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    };

    observability::init_with_config(config)
}
