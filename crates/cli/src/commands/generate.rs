//! Image job commands.

use anyhow::Result;
use clap::Args;

use mjnodes_client::HttpGenerationApi;
use mjnodes_core::options::{PanDirection, SpeedMode, UpscaleType};
use mjnodes_core::preset::PresetStore;
use mjnodes_pipeline::{Actions, ImageOutput, SourceSlot};

use super::args::RequestArgs;
use crate::config::CliConfig;
use crate::output::save_slots;

#[derive(Args, Debug)]
pub struct ImagineArgs {
    pub prompt: String,
    /// Negative prompt, sent as `--no`
    #[arg(long, default_value = "")]
    pub no: String,
    #[command(flatten)]
    pub request: RequestArgs,
    /// Submit only and print the job id
    #[arg(long)]
    pub enqueue: bool,
}

#[derive(Args, Debug)]
pub struct VaryArgs {
    pub job_id: String,
    #[arg(long, short, default_value_t = 0)]
    pub index: u8,
    /// Subtle variations instead of strong ones
    #[arg(long)]
    pub subtle: bool,
    #[arg(long, default_value = "fast")]
    pub mode: SpeedMode,
    #[arg(long)]
    pub enqueue: bool,
}

#[derive(Args, Debug)]
pub struct RemixArgs {
    pub job_id: String,
    pub prompt: String,
    #[arg(long, short, default_value_t = 0)]
    pub index: u8,
    #[arg(long, default_value = "")]
    pub no: String,
    /// Subtle variations instead of strong ones
    #[arg(long)]
    pub subtle: bool,
    #[command(flatten)]
    pub request: RequestArgs,
    #[arg(long)]
    pub enqueue: bool,
}

impl VaryArgs {
    pub fn strong(&self) -> bool {
        !self.subtle
    }
}

impl RemixArgs {
    pub fn strong(&self) -> bool {
        !self.subtle
    }
}

#[derive(Args, Debug)]
pub struct UpscaleArgs {
    pub job_id: String,
    #[arg(long, short, default_value_t = 0)]
    pub index: u8,
    /// v7_2x_subtle or v7_2x_creative
    #[arg(long = "type", default_value = "v7_2x_subtle")]
    pub upscale_type: UpscaleType,
    #[arg(long, default_value = "fast")]
    pub mode: SpeedMode,
    #[arg(long)]
    pub enqueue: bool,
}

#[derive(Args, Debug)]
pub struct PanArgs {
    pub job_id: String,
    #[arg(long, short, default_value_t = 0)]
    pub index: u8,
    /// up, down, left or right
    #[arg(long, default_value = "up")]
    pub direction: PanDirection,
    #[arg(long, default_value = "")]
    pub prompt: String,
    #[arg(long, default_value = "")]
    pub no: String,
    #[arg(long, default_value = "fast")]
    pub mode: SpeedMode,
    #[arg(long)]
    pub enqueue: bool,
}

pub async fn imagine(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    args: ImagineArgs,
) -> Result<()> {
    let params = args
        .request
        .resolve(&PresetStore::new(&config.presets_dir))?;
    let out = actions
        .imagine(&args.prompt, &args.no, params, args.enqueue)
        .await?;
    report(config, &out)
}

pub async fn vary(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    args: VaryArgs,
) -> Result<()> {
    let strong = args.strong();
    let out = actions
        .vary(
            SourceSlot::new(args.job_id, args.index),
            strong,
            args.mode,
            args.enqueue,
        )
        .await?;
    report(config, &out)
}

pub async fn remix(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    args: RemixArgs,
) -> Result<()> {
    let params = args
        .request
        .resolve(&PresetStore::new(&config.presets_dir))?;
    let strong = args.strong();
    let out = actions
        .remix(
            SourceSlot::new(args.job_id, args.index),
            &args.prompt,
            &args.no,
            strong,
            params,
            args.enqueue,
        )
        .await?;
    report(config, &out)
}

pub async fn upscale(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    args: UpscaleArgs,
) -> Result<()> {
    let out = actions
        .upscale(
            SourceSlot::new(args.job_id, args.index),
            args.upscale_type,
            args.mode,
            args.enqueue,
        )
        .await?;
    report(config, &out)
}

pub async fn pan(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    args: PanArgs,
) -> Result<()> {
    let out = actions
        .pan(
            SourceSlot::new(args.job_id, args.index),
            args.direction,
            &args.prompt,
            &args.no,
            args.mode,
            args.enqueue,
        )
        .await?;
    report(config, &out)
}

pub async fn download(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    job_id: &str,
) -> Result<()> {
    let slots = actions.download(job_id).await?;
    save_slots(&config.output_dir, job_id, slots.iter().map(Option::as_ref))?;
    Ok(())
}

fn report(config: &CliConfig, out: &ImageOutput) -> Result<()> {
    println!("job_id: {}", out.job_id());
    if let ImageOutput::Completed { job_id, images } = out {
        save_slots(&config.output_dir, job_id, images.iter().map(Some))?;
    }
    Ok(())
}
