//! Command definitions and dispatch.

mod args;
mod catalog;
mod generate;
mod preset;
mod video;

use anyhow::Result;
use clap::Subcommand;

use mjnodes_client::{ApiConfig, HttpGenerationApi};
use mjnodes_pipeline::{Actions, Orchestrator};

use crate::config::CliConfig;
use args::ParamsArgs;
use catalog::{KeywordCommands, StyleCommands};
use generate::{ImagineArgs, PanArgs, RemixArgs, UpscaleArgs, VaryArgs};
use preset::PresetCommands;
use video::{AnimateArgs, AnimateImageArgs, ExtendVideoArgs, LoadVideoArgs};

/// Top-level CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate four images from a prompt
    Imagine(ImagineArgs),
    /// Create variations of one image
    Vary(VaryArgs),
    /// Create variations of one image with a new prompt
    Remix(RemixArgs),
    /// Upscale one image
    Upscale(UpscaleArgs),
    /// Extend one image in a direction
    Pan(PanArgs),
    /// Download the images of an existing job
    Download { job_id: String },
    /// Animate one image of a job
    Animate(AnimateArgs),
    /// Animate from a local start image
    AnimateImage(AnimateImageArgs),
    /// Extend a video job
    ExtendVideo(ExtendVideoArgs),
    /// Download a video of an existing job
    LoadVideo(LoadVideoArgs),
    /// Print normalized generation parameters
    Params(ParamsArgs),
    /// Manage parameter presets
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },
    /// Keyword lists
    Keywords {
        #[command(subcommand)]
        command: KeywordCommands,
    },
    /// Style references
    Styles {
        #[command(subcommand)]
        command: StyleCommands,
    },
}

/// Route a command to its handler. Only commands that reach the service
/// build the HTTP client, so local commands work without a token.
pub async fn handle_command(command: Commands, config: &CliConfig) -> Result<()> {
    match command {
        Commands::Imagine(args) => generate::imagine(&build_actions(config)?, config, args).await,
        Commands::Vary(args) => generate::vary(&build_actions(config)?, config, args).await,
        Commands::Remix(args) => generate::remix(&build_actions(config)?, config, args).await,
        Commands::Upscale(args) => generate::upscale(&build_actions(config)?, config, args).await,
        Commands::Pan(args) => generate::pan(&build_actions(config)?, config, args).await,
        Commands::Download { job_id } => {
            generate::download(&build_actions(config)?, config, &job_id).await
        }
        Commands::Animate(args) => video::animate(&build_actions(config)?, args).await,
        Commands::AnimateImage(args) => video::animate_image(&build_actions(config)?, args).await,
        Commands::ExtendVideo(args) => video::extend_video(&build_actions(config)?, args).await,
        Commands::LoadVideo(args) => video::load_video(&build_actions(config)?, config, args).await,
        Commands::Params(params) => preset::show_params(&params),
        Commands::Preset { command } => preset::handle_preset_command(command, config),
        Commands::Keywords { command } => catalog::handle_keyword_command(command, config),
        Commands::Styles { command } => catalog::handle_style_command(command, config),
    }
}

fn build_actions(config: &CliConfig) -> Result<Actions<HttpGenerationApi>> {
    let api = HttpGenerationApi::new(ApiConfig::from_env()?)?;
    tracing::debug!(api_url = %api.config().api_url, "Generation client ready");
    Ok(Actions::new(Orchestrator::new(api, config.poll)))
}
