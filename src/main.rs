//! Musitech CLI entry point.

use anyhow::Result;
use clap::Parser;
use musitech::cli::{commands, Cli, Commands};
use musitech::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Settings::expand_path);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("musitech={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Execute command
    match &cli.command {
        Commands::Enrich { media, display } => {
            commands::run_enrich(media, *display, settings).await?;
        }

        Commands::Listen { match_file, display } => {
            commands::run_listen(match_file, *display, settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
