//! Toolsmith CLI entry point.

use anyhow::Result;
use clap::Parser;
use toolsmith::agent::Assistant;
use toolsmith::cli::{commands, Cli, Commands};
use toolsmith::config::Settings;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; stderr keeps logs out of the streamed output
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("toolsmith={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if settings.general.load_dotenv {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(err) if err.not_found() => {}
            Err(err) => warn!("Failed to load .env file: {}", err),
        }
    }

    match &cli.command {
        Commands::Paper { message, model } => {
            commands::run_assistant(Assistant::Paper, message.clone(), model.clone(), settings).await?;
        }

        Commands::Code { message, model } => {
            commands::run_assistant(Assistant::Code, message.clone(), model.clone(), settings).await?;
        }

        Commands::Tools { assistant } => {
            commands::run_tools(assistant.as_deref(), &settings)?;
        }

        Commands::Call { tool, args } => {
            commands::run_call(tool, args.as_deref(), &settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
