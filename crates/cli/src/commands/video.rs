//! Video job commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use mjnodes_client::HttpGenerationApi;
use mjnodes_pipeline::{Actions, EndFrame, SourceSlot};

use super::args::{PromptArgs, VideoArgs};
use crate::config::CliConfig;
use crate::output::{load_image, save_video};

#[derive(Args, Debug)]
pub struct AnimateArgs {
    pub job_id: String,
    #[arg(long, short, default_value_t = 0)]
    pub index: u8,
    #[command(flatten)]
    pub video: VideoArgs,
    #[command(flatten)]
    pub prompt: PromptArgs,
}

#[derive(Args, Debug)]
pub struct AnimateImageArgs {
    /// Start frame image
    pub start: PathBuf,
    #[command(flatten)]
    pub end: EndFrameArgs,
    #[command(flatten)]
    pub video: VideoArgs,
    #[command(flatten)]
    pub prompt: PromptArgs,
}

#[derive(Args, Debug)]
pub struct ExtendVideoArgs {
    pub job_id: String,
    /// Batch variant to extend
    #[arg(long, short, default_value_t = 0)]
    pub index: u8,
    #[command(flatten)]
    pub end: EndFrameArgs,
    #[command(flatten)]
    pub video: VideoArgs,
    #[command(flatten)]
    pub prompt: PromptArgs,
}

#[derive(Args, Debug)]
pub struct LoadVideoArgs {
    pub job_id: String,
    #[arg(long, default_value_t = 0)]
    pub batch_index: u8,
    /// Resolution hint, e.g. 1080. Original size when omitted.
    #[arg(long)]
    pub size: Option<u32>,
}

#[derive(Args, Debug)]
pub struct EndFrameArgs {
    /// End frame image
    #[arg(long, conflicts_with = "looped")]
    pub end: Option<PathBuf>,
    /// Loop back to the start frame
    #[arg(long = "loop")]
    pub looped: bool,
}

impl EndFrameArgs {
    fn to_end_frame(&self) -> Result<EndFrame> {
        if self.looped {
            return Ok(EndFrame::Loop);
        }
        match &self.end {
            Some(path) => Ok(EndFrame::Image(load_image(path)?)),
            None => Ok(EndFrame::None),
        }
    }
}

pub async fn animate(actions: &Actions<HttpGenerationApi>, args: AnimateArgs) -> Result<()> {
    let job_id = actions
        .animate(
            SourceSlot::new(args.job_id, args.index),
            args.video.into(),
            &args.prompt.prompt,
            &args.prompt.no,
        )
        .await?;
    println!("job_id: {job_id}");
    Ok(())
}

pub async fn animate_image(
    actions: &Actions<HttpGenerationApi>,
    args: AnimateImageArgs,
) -> Result<()> {
    let start = load_image(&args.start)?;
    let end = args.end.to_end_frame()?;
    let job_id = actions
        .animate_from_image(
            &start,
            end,
            args.video.into(),
            &args.prompt.prompt,
            &args.prompt.no,
        )
        .await?;
    println!("job_id: {job_id}");
    Ok(())
}

pub async fn extend_video(
    actions: &Actions<HttpGenerationApi>,
    args: ExtendVideoArgs,
) -> Result<()> {
    let end = args.end.to_end_frame()?;
    let job_id = actions
        .extend_video(
            SourceSlot::new(args.job_id, args.index),
            end,
            args.video.into(),
            &args.prompt.prompt,
            &args.prompt.no,
        )
        .await?;
    println!("job_id: {job_id}");
    Ok(())
}

pub async fn load_video(
    actions: &Actions<HttpGenerationApi>,
    config: &CliConfig,
    args: LoadVideoArgs,
) -> Result<()> {
    let clip = actions
        .load_video(&args.job_id, args.batch_index, args.size)
        .await?;
    save_video(&config.output_dir, &args.job_id, args.batch_index, &clip)?;
    Ok(())
}
