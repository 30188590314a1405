//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{SinkConfig, SinkType, TeeBlueprint};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_tee(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args)?;
    apply_overrides(&mut blueprint, args);

    ConfigLoader::validate(&blueprint).context("Invalid sink configuration")?;

    info!(
        sinks = blueprint.sinks.len(),
        chunk_size = blueprint.chunk_size,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        input: args.input.clone(),
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = pipeline.run() => {
            let stats = result.context("Tee failed")?;
            info!(
                bytes = stats.bytes_written,
                chunks = stats.chunks_written,
                duration_secs = stats.duration.as_secs_f64(),
                "Tee completed successfully"
            );
            stats.print_summary();
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping tee...");
        }
    }

    Ok(())
}

/// Load the configuration file, or start from an empty blueprint
fn load_blueprint(args: &RunArgs) -> Result<TeeBlueprint> {
    let Some(path) = &args.config else {
        return Ok(TeeBlueprint::default());
    };

    info!(config = %path.display(), "Loading configuration");

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Append sinks and settings given on the command line
fn apply_overrides(blueprint: &mut TeeBlueprint, args: &RunArgs) {
    if let Some(chunk_size) = args.chunk_size {
        info!(chunk_size, "Overriding chunk size from CLI");
        blueprint.chunk_size = chunk_size;
    }

    for path in &args.files {
        let path = path.display().to_string();
        blueprint.sinks.push(
            SinkConfig::new(format!("file:{}", path), SinkType::File)
                .with_param("path", path)
                .with_param("append", args.append.to_string()),
        );
    }

    if args.stdout {
        blueprint
            .sinks
            .push(SinkConfig::new("stdout", SinkType::Stdout));
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &TeeBlueprint) {
    eprintln!("\n=== Configuration Summary ===\n");
    eprintln!("Chunk size: {} bytes", blueprint.chunk_size);
    eprintln!("\nSinks ({}):", blueprint.sinks.len());
    for sink in &blueprint.sinks {
        eprintln!("  - {} ({:?})", sink.name, sink.sink_type);
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["fanout-tee", "run"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Run(args) => args,
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_apply_overrides_adds_file_and_stdout_sinks() {
        let args = run_args(&["--stdout", "--append", "--chunk-size", "128", "a.log", "b.log"]);
        let mut blueprint = TeeBlueprint::default();
        apply_overrides(&mut blueprint, &args);

        assert_eq!(blueprint.chunk_size, 128);
        assert_eq!(blueprint.sinks.len(), 3);
        assert_eq!(blueprint.sinks[0].name, "file:a.log");
        assert_eq!(blueprint.sinks[0].params["append"], "true");
        assert_eq!(blueprint.sinks[2].sink_type, SinkType::Stdout);
        assert!(ConfigLoader::validate(&blueprint).is_ok());
    }

    #[test]
    fn test_duplicate_file_args_rejected() {
        let args = run_args(&["same.log", "same.log"]);
        let mut blueprint = TeeBlueprint::default();
        apply_overrides(&mut blueprint, &args);

        assert!(ConfigLoader::validate(&blueprint).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let args = run_args(&["--config", "/nonexistent/tee.toml"]);
        let err = load_blueprint(&args).unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_copy() {
        let args = run_args(&["--dry-run", "--input", "/nonexistent/input"]);
        assert!(run_tee(&args).await.is_ok());
    }
}
