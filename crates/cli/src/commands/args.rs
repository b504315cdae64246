//! Argument groups shared by several commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use mjnodes_core::options::{
    MotionIntensity, PersonalizeMode, Quality, SpeedMode, VideoResolution, Visibility,
};
use mjnodes_core::params::{ImagineParamsInput, Reference, RequestParams};
use mjnodes_core::preset::PresetStore;
use mjnodes_core::prompt::VideoParams;
use mjnodes_core::style::STYLE_IMAGE_EXTENSIONS;
use mjnodes_pipeline::convert::TempFileStager;

use crate::output::load_image;

/// Generation parameters as command-line flags.
#[derive(Args, Debug, Clone)]
pub struct ParamsArgs {
    /// Aspect ratio width
    #[arg(long, default_value_t = 1)]
    pub ar_w: u32,
    /// Aspect ratio height
    #[arg(long, default_value_t = 1)]
    pub ar_h: u32,
    #[arg(long, default_value_t = 100)]
    pub stylize: u32,
    #[arg(long, default_value_t = 0)]
    pub chaos: u32,
    #[arg(long, default_value_t = 0)]
    pub weird: u32,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// 1, 2 or 4
    #[arg(long, default_value = "1")]
    pub quality: Quality,
    #[arg(long)]
    pub raw: bool,
    #[arg(long)]
    pub tile: bool,
    #[arg(long)]
    pub draft: bool,
    /// fast, relax or turbo
    #[arg(long, default_value = "fast")]
    pub mode: SpeedMode,
    /// default, stealth or public
    #[arg(long, default_value = "default")]
    pub visibility: Visibility,
    /// off, default or custom
    #[arg(long, default_value = "off")]
    pub personalize: PersonalizeMode,
    /// Code used with `--personalize custom`
    #[arg(long, default_value = "")]
    pub personalize_code: String,
    /// Image prompt file
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Image prompt weight (0-3)
    #[arg(long)]
    pub iw: Option<f64>,
    /// Style reference: an image file or a style code
    #[arg(long)]
    pub sref: Option<String>,
    /// Style weight (0-1000)
    #[arg(long)]
    pub sw: Option<u32>,
    /// Style version for a textual style reference
    #[arg(long)]
    pub sv: Option<String>,
    /// Omni reference: an image file or a URL
    #[arg(long)]
    pub oref: Option<String>,
    /// Omni weight (1-1000)
    #[arg(long)]
    pub ow: Option<u32>,
}

impl ParamsArgs {
    /// Convert to structured input, loading any referenced image files.
    pub fn to_input(&self) -> Result<ImagineParamsInput> {
        Ok(ImagineParamsInput {
            ar_w: self.ar_w,
            ar_h: self.ar_h,
            stylize: self.stylize,
            chaos: self.chaos,
            weird: self.weird,
            seed: self.seed,
            quality: self.quality,
            raw: self.raw,
            tile: self.tile,
            draft: self.draft,
            mode: self.mode,
            visibility: self.visibility,
            personalize: self.personalize,
            personalize_code: self.personalize_code.clone(),
            image: self.image.as_deref().map(load_image).transpose()?,
            iw: self.iw,
            sref: self.sref.as_deref().map(reference).transpose()?,
            sw: self.sw,
            sv: self.sv.clone(),
            oref: self.oref.as_deref().map(reference).transpose()?,
            ow: self.ow,
        })
    }

    /// Normalize into a request parameter map, staging images to temp files.
    pub fn normalize(&self) -> Result<RequestParams> {
        Ok(self.to_input()?.normalize(&TempFileStager)?)
    }
}

/// Parameters either from flags or from a saved preset.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Use a saved preset instead of the parameter flags
    #[arg(long)]
    pub preset: Option<String>,

    #[command(flatten)]
    pub params: ParamsArgs,
}

impl RequestArgs {
    pub fn resolve(&self, presets: &PresetStore) -> Result<RequestParams> {
        match &self.preset {
            Some(name) => Ok(presets.load(name)?),
            None => self.params.normalize(),
        }
    }
}

/// Options of video jobs.
#[derive(Args, Debug, Clone)]
pub struct VideoArgs {
    /// low or high
    #[arg(long)]
    pub motion: Option<MotionIntensity>,
    /// 480 or 720
    #[arg(long, default_value = "480")]
    pub resolution: VideoResolution,
    /// 1, 2 or 4
    #[arg(long, default_value_t = 1)]
    pub batch_size: u8,
    /// fast, relax or turbo
    #[arg(long, default_value = "fast")]
    pub mode: SpeedMode,
    #[arg(long)]
    pub stealth: bool,
}

impl From<VideoArgs> for VideoParams {
    fn from(args: VideoArgs) -> Self {
        Self {
            motion: args.motion,
            resolution: args.resolution,
            batch_size: args.batch_size,
            mode: args.mode,
            stealth: args.stealth,
        }
    }
}

/// Prompt text with an optional negative part.
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    #[arg(long, default_value = "")]
    pub prompt: String,
    /// Negative prompt, sent as `--no`
    #[arg(long, default_value = "")]
    pub no: String,
}

/// A reference that names an existing image file is sent as an image;
/// anything else is passed through as text.
fn reference(raw: &str) -> Result<Reference> {
    let path = Path::new(raw);
    if is_image_file(path) {
        return Ok(Reference::Image(load_image(path)?));
    }
    Ok(Reference::from(raw))
}

fn is_image_file(path: &Path) -> bool {
    let has_image_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| STYLE_IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    has_image_ext && path.is_file()
}
