//! DeenBot CLI entry point.

use anyhow::Result;
use clap::Parser;
use deenbot::cli::{commands, Cli, Commands};
use deenbot::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("deenbot={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Ingest { file, context_id } => {
            commands::run_ingest(file, context_id.as_deref(), settings).await?;
        }

        Commands::Ask {
            question,
            context_id,
            no_llm,
            lang,
            json,
        } => {
            commands::run_ask(question, context_id, *no_llm, *lang, *json, settings).await?;
        }

        Commands::Rank {
            question,
            context_id,
            strategy,
            lang,
        } => {
            commands::run_rank(question, context_id, *strategy, *lang, settings).await?;
        }

        Commands::Detect { text } => {
            commands::run_detect(text)?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Rechunk { context_id } => {
            commands::run_rechunk(context_id, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
