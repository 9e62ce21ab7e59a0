//! Remod - remote modules, cached locally
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use remod::cli::{Cli, Commands};
use remod::config::ConfigManager;
use remod::error::RemodResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> RemodResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("remod=warn"),
        1 => EnvFilter::new("remod=info"),
        _ => EnvFilter::new("remod=debug"),
    };

    // Module bodies go to stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let config = config_manager.load().await?;

    // Dispatch to command
    match cli.command {
        Commands::Fetch(args) => remod::cli::commands::fetch(args, &config).await,
        Commands::Resolve(args) => remod::cli::commands::resolve(args, &config).await,
        Commands::Cache(args) => remod::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            remod::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
