//! Taalcoach CLI entry point.

use anyhow::Result;
use clap::Parser;
use taalcoach::cli::commands::{self, CoachCommand};
use taalcoach::cli::{Cli, Commands};
use taalcoach::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config_path();
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("taalcoach={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let verbose = cli.verbose > 0;

    // Execute command
    match &cli.command {
        Commands::Daily { input } => {
            commands::run_coach(CoachCommand::Daily, Some(input), &cli.keys, verbose, settings).await?;
        }

        Commands::Grammar { input } => {
            commands::run_coach(CoachCommand::Grammar, Some(input), &cli.keys, verbose, settings).await?;
        }

        Commands::Converse => {
            commands::run_coach(CoachCommand::Converse, None, &cli.keys, verbose, settings).await?;
        }

        Commands::Weekly { input } => {
            commands::run_coach(CoachCommand::Weekly, Some(input), &cli.keys, verbose, settings).await?;
        }

        Commands::Roles => {
            commands::run_roles(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&cli.keys, &settings, &config_path).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, &cli.keys, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
