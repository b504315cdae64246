//! `mjnodes` command-line interface.
//!
//! Generates, varies, upscales and animates images through the
//! generation service, and manages local presets, keyword lists and
//! style references.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{handle_command, Commands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "mjnodes")]
#[command(about = "Generation job runner and prompt toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env()?;

    let json = config.log_json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mjnodes=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    let cli = Cli::parse();
    handle_command(cli.command, &config).await
}
