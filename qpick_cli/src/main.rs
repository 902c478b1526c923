//! qpick CLI - Pick the best question from the terminal
//!
//! Usage:
//!   qpick pick [OPTIONS]        Request candidates, scores or a winner
//!   qpick health                Check the proxy

mod client;
mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qpick")]
#[command(author = "qpick Team")]
#[command(version)]
#[command(about = "Pick the best question through the qpick proxy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the qpick proxy
    #[arg(
        long,
        global = true,
        env = "QPICK_PROXY_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    proxy: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Request candidates for a time window, optionally scored and with a winner
    Pick(commands::pick::PickArgs),

    /// Check that the proxy is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},qpick_cli={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Pick(args) => {
            commands::pick::run(&cli.proxy, args).await?;
        }

        Commands::Health => {
            commands::health::run(&cli.proxy).await?;
        }
    }

    Ok(())
}
