//! One entry point per generation operation.
//!
//! Each adapter validates its inputs, builds a [`JobRequest`], submits it
//! and either returns the job id right away (enqueue) or waits for the job
//! and fetches its results. Video operations always wait.

use image::RgbImage;
use serde_json::Value;

use mjnodes_client::{GenerationApi, Job, JobAction, JobRequest};
use mjnodes_core::error::CoreError;
use mjnodes_core::options::{validate_slot_index, PanDirection, SpeedMode, UpscaleType};
use mjnodes_core::params::{take_mode, take_stealth, ImageStager, RequestParams, KEY_NO};
use mjnodes_core::prompt::{build_prompt, VideoParams};

use crate::convert::{TempFileStager, VideoClip};
use crate::error::PipelineError;
use crate::orchestrator::{Orchestrator, SlotResults, DEFAULT_DOWNLOAD_SIZE};
use crate::progress::{ProgressSink, TracingProgress};

/// Value sent in place of an end frame to request a looping video.
pub const LOOP_END_FRAME: &str = "loop";

/// A result slot of an earlier job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSlot {
    pub job_id: String,
    pub index: u8,
}

impl SourceSlot {
    pub fn new(job_id: impl Into<String>, index: u8) -> Self {
        Self {
            job_id: job_id.into(),
            index,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_job_id(&self.job_id)?;
        validate_slot_index(self.index)
    }
}

fn validate_job_id(job_id: &str) -> Result<(), CoreError> {
    if job_id.trim().is_empty() {
        return Err(CoreError::Validation("job id must not be empty".to_string()));
    }
    Ok(())
}

/// Result of an image-producing operation.
#[derive(Debug, Clone)]
pub enum ImageOutput {
    /// Submitted only; results can be fetched later by id.
    Enqueued { job_id: String },
    /// Waited for completion and downloaded the images.
    Completed { job_id: String, images: Vec<RgbImage> },
}

impl ImageOutput {
    pub fn job_id(&self) -> &str {
        match self {
            Self::Enqueued { job_id } | Self::Completed { job_id, .. } => job_id,
        }
    }

    pub fn images(&self) -> &[RgbImage] {
        match self {
            Self::Enqueued { .. } => &[],
            Self::Completed { images, .. } => images,
        }
    }
}

/// End frame of a generated video.
#[derive(Debug, Clone, Default)]
pub enum EndFrame {
    #[default]
    None,
    Image(RgbImage),
    /// Blend the last frame back into the first.
    Loop,
}

/// Generation operations over a shared [`Orchestrator`].
pub struct Actions<A> {
    orchestrator: Orchestrator<A>,
    progress: Box<dyn ProgressSink>,
    stager: Box<dyn ImageStager + Send + Sync>,
    download_size: Option<u32>,
}

impl<A: GenerationApi> Actions<A> {
    pub fn new(orchestrator: Orchestrator<A>) -> Self {
        Self {
            orchestrator,
            progress: Box::new(TracingProgress),
            stager: Box::new(TempFileStager),
            download_size: Some(DEFAULT_DOWNLOAD_SIZE),
        }
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_stager(mut self, stager: impl ImageStager + Send + Sync + 'static) -> Self {
        self.stager = Box::new(stager);
        self
    }

    /// Size hint for image downloads. `None` fetches the original PNGs.
    pub fn with_download_size(mut self, size: Option<u32>) -> Self {
        self.download_size = size;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator<A> {
        &self.orchestrator
    }

    /// Generate four images from a prompt.
    ///
    /// `params` is a normalized option map; its `mode` entry selects the
    /// speed mode and is not forwarded as a parameter.
    pub async fn imagine(
        &self,
        prompt: &str,
        no: &str,
        mut params: RequestParams,
        enqueue: bool,
    ) -> Result<ImageOutput, PipelineError> {
        let mode = take_mode(&mut params)?;
        insert_no(&mut params, no);
        let request =
            JobRequest::new(JobAction::Imagine, prompt.trim(), mode).with_params(params);
        self.run_images(&request, &[0, 1, 2, 3], enqueue).await
    }

    /// Subtle or strong variation of one slot.
    pub async fn vary(
        &self,
        source: SourceSlot,
        strong: bool,
        mode: SpeedMode,
        enqueue: bool,
    ) -> Result<ImageOutput, PipelineError> {
        source.validate()?;
        let action = JobAction::Vary {
            source_job_id: source.job_id,
            index: source.index,
            strong,
        };
        let request = JobRequest::new(action, "", mode);
        self.run_images(&request, &[0, 1, 2, 3], enqueue).await
    }

    /// Variation of one slot with a new prompt.
    ///
    /// A `visibility` of `stealth` in `params` becomes the action's
    /// `stealth` flag.
    pub async fn remix(
        &self,
        source: SourceSlot,
        prompt: &str,
        no: &str,
        strong: bool,
        mut params: RequestParams,
        enqueue: bool,
    ) -> Result<ImageOutput, PipelineError> {
        source.validate()?;
        let mode = take_mode(&mut params)?;
        let stealth = take_stealth(&mut params);
        insert_no(&mut params, no);
        let action = JobAction::Remix {
            source_job_id: source.job_id,
            index: source.index,
            strong,
            stealth,
        };
        let request = JobRequest::new(action, prompt.trim(), mode).with_params(params);
        self.run_images(&request, &[0, 1, 2, 3], enqueue).await
    }

    /// Upscale one slot. The job yields a single image in slot 0.
    pub async fn upscale(
        &self,
        source: SourceSlot,
        upscale_type: UpscaleType,
        mode: SpeedMode,
        enqueue: bool,
    ) -> Result<ImageOutput, PipelineError> {
        source.validate()?;
        let action = JobAction::Upscale {
            source_job_id: source.job_id,
            index: source.index,
            upscale_type,
        };
        let request = JobRequest::new(action, "", mode);
        self.run_images(&request, &[0], enqueue).await
    }

    /// Extend one slot towards `direction`.
    pub async fn pan(
        &self,
        source: SourceSlot,
        direction: PanDirection,
        prompt: &str,
        no: &str,
        mode: SpeedMode,
        enqueue: bool,
    ) -> Result<ImageOutput, PipelineError> {
        source.validate()?;
        let action = JobAction::Pan {
            source_job_id: source.job_id,
            index: source.index,
            direction,
        };
        let request = JobRequest::new(action, build_prompt(prompt, no), mode);
        self.run_images(&request, &[0, 1, 2, 3], enqueue).await
    }

    /// Fetch whatever slots an existing job exposes.
    pub async fn download(&self, job_id: &str) -> Result<SlotResults, PipelineError> {
        validate_job_id(job_id)?;
        let job = Job::for_download(job_id.trim());
        let slots = self
            .orchestrator
            .collect_all_slots(&job, self.download_size)
            .await?;
        tracing::info!(
            job_id = %job.id,
            found = slots.iter().filter(|s| s.is_some()).count(),
            "[MJ] Download",
        );
        Ok(slots)
    }

    /// Animate one image slot. Returns the video job id.
    pub async fn animate(
        &self,
        source: SourceSlot,
        video: VideoParams,
        prompt: &str,
        no: &str,
    ) -> Result<String, PipelineError> {
        source.validate()?;
        video.validate()?;
        let mode = video.mode;
        let action = JobAction::Animate {
            source_job_id: source.job_id,
            index: source.index,
            video,
        };
        let request = JobRequest::new(action, build_prompt(prompt, no), mode);
        self.run_video(&request).await
    }

    /// Animate from a start image and an optional end frame.
    pub async fn animate_from_image(
        &self,
        start_image: &RgbImage,
        end: EndFrame,
        video: VideoParams,
        prompt: &str,
        no: &str,
    ) -> Result<String, PipelineError> {
        video.validate()?;
        let start_image = self.stager.stage(start_image)?;
        let end_image = self.stage_end_frame(&end)?;
        let mode = video.mode;
        let action = JobAction::AnimateFromImage {
            start_image,
            end_image,
            video,
        };
        let request = JobRequest::new(action, build_prompt(prompt, no), mode);
        self.run_video(&request).await
    }

    /// Extend a video variant, optionally towards an end frame.
    pub async fn extend_video(
        &self,
        source: SourceSlot,
        end: EndFrame,
        video: VideoParams,
        prompt: &str,
        no: &str,
    ) -> Result<String, PipelineError> {
        source.validate()?;
        video.validate()?;
        let end_image = self.stage_end_frame(&end)?;
        let mode = video.mode;
        let action = JobAction::ExtendVideo {
            source_job_id: source.job_id,
            index: source.index,
            end_image,
            video,
        };
        let request = JobRequest::new(action, build_prompt(prompt, no), mode);
        self.run_video(&request).await
    }

    /// Download one variant of a finished video job.
    pub async fn load_video(
        &self,
        job_id: &str,
        batch_index: u8,
        size: Option<u32>,
    ) -> Result<VideoClip, PipelineError> {
        validate_job_id(job_id)?;
        let job = Job::for_download(job_id.trim());
        let clip = self.orchestrator.fetch_video(&job, batch_index, size).await?;
        tracing::info!(job_id = %job.id, idx = batch_index, bytes = clip.len(), "[MJ] LoadVideo");
        Ok(clip)
    }

    // ---- private helpers ----

    async fn run_images(
        &self,
        request: &JobRequest,
        slots: &[u8],
        enqueue: bool,
    ) -> Result<ImageOutput, PipelineError> {
        if enqueue {
            let job = self.orchestrator.submit(request).await?;
            return Ok(ImageOutput::Enqueued { job_id: job.id });
        }
        let job = self
            .orchestrator
            .submit_and_wait(request, self.progress.as_ref())
            .await?;
        let images = self
            .orchestrator
            .fetch_slots(&job, slots, self.download_size)
            .await?;
        Ok(ImageOutput::Completed {
            job_id: job.id,
            images,
        })
    }

    async fn run_video(&self, request: &JobRequest) -> Result<String, PipelineError> {
        let job = self
            .orchestrator
            .submit_and_wait(request, self.progress.as_ref())
            .await?;
        Ok(job.id)
    }

    fn stage_end_frame(&self, end: &EndFrame) -> Result<Option<String>, CoreError> {
        match end {
            EndFrame::None => Ok(None),
            EndFrame::Loop => Ok(Some(LOOP_END_FRAME.to_string())),
            EndFrame::Image(img) => self.stager.stage(img).map(Some),
        }
    }
}

/// Forward a non-empty negative prompt as the `no` parameter.
fn insert_no(params: &mut RequestParams, no: &str) {
    let no = no.trim();
    if !no.is_empty() {
        params.insert(KEY_NO.to_string(), Value::from(no));
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn source_slot_rejects_out_of_range_index() {
        assert!(SourceSlot::new("abc", 3).validate().is_ok());
        assert_matches!(
            SourceSlot::new("abc", 4).validate(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn source_slot_rejects_blank_job_id() {
        assert_matches!(
            SourceSlot::new("  ", 0).validate(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn negative_prompt_is_trimmed_and_skipped_when_blank() {
        let mut params = RequestParams::new();
        insert_no(&mut params, "   ");
        assert!(params.is_empty());

        insert_no(&mut params, " text ");
        assert_eq!(params.get(KEY_NO), Some(&Value::from("text")));
    }

    #[test]
    fn image_output_accessors() {
        let out = ImageOutput::Enqueued {
            job_id: "j1".into(),
        };
        assert_eq!(out.job_id(), "j1");
        assert!(out.images().is_empty());
    }
}
