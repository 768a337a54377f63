//! cfseeker - Cloud Foundry app locator
//!
//! CLI entry point that dispatches to subcommands.

use cfseeker::cli::{commands, Cli, Commands};
use cfseeker::config::ConfigManager;
use cfseeker::error::SeekerResult;
use clap::Parser;
use console::style;
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

async fn run() -> SeekerResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("cfseeker=warn"),
        1 => EnvFilter::new("cfseeker=info"),
        _ => EnvFilter::new("cfseeker=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    let target = cli.target.as_deref();
    match cli.command {
        Commands::Find(args) => commands::find(args, &config, target, cli.format).await,
        Commands::Convert(args) => commands::convert(args, &config, target, cli.format).await,
        Commands::Server(args) => commands::server(args, &config).await,
        Commands::Invalidate => commands::invalidate(&config, target).await,
        Commands::Info => commands::info(&config, target, cli.format).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}
