//! Drives submitted jobs to a terminal state and retrieves their results.
//!
//! [`Orchestrator::submit_and_wait`] polls the service until the job
//! completes or the time budget runs out. The timeout is checked before
//! each status query, and sleeps are clamped to the remaining budget, so
//! a job that never completes fails within one query latency of the
//! deadline.
//!
//! [`Orchestrator::collect_all_slots`] fetches every result slot of a job
//! independently. A failing slot is logged and reported as `None`; only a
//! job with no retrievable slot at all is an error.

use std::time::Duration;

use image::RgbImage;
use tokio::time::Instant;

use mjnodes_client::{GenerationApi, Job, JobRequest, JobStatus, SLOT_COUNT};
use mjnodes_core::options::validate_slot_index;

use crate::convert::{decode_image, VideoClip};
use crate::error::PipelineError;
use crate::logging::log_job;
use crate::progress::ProgressSink;

/// Size hint used when downloading result images.
pub const DEFAULT_DOWNLOAD_SIZE: u32 = 1024;

/// Results of a best-effort fetch, in slot order.
pub type SlotResults = [Option<RgbImage>; SLOT_COUNT];

/// Polling cadence and time budget for a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status queries.
    pub poll_interval: Duration,
    /// Total budget measured from the start of polling.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

/// How long to sleep before the next status query.
///
/// Returns the poll interval clamped to whatever is left of the budget.
pub fn next_sleep(elapsed: Duration, config: &PollConfig) -> Duration {
    config
        .poll_interval
        .min(config.timeout.saturating_sub(elapsed))
}

/// Job lifecycle driver over an injected [`GenerationApi`].
pub struct Orchestrator<A> {
    api: A,
    config: PollConfig,
}

impl<A: GenerationApi> Orchestrator<A> {
    pub fn new(api: A, config: PollConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Submit a job without waiting for it.
    pub async fn submit(&self, request: &JobRequest) -> Result<Job, PipelineError> {
        let response = self.api.submit(request).await?;
        let job = Job::submitted(response.job_id.unwrap_or_default(), request.prompt.clone());
        if !job.has_id() {
            tracing::error!(action = request.action.label(), "Service returned no job id");
            return Err(PipelineError::Submission(format!(
                "{} request returned no job id",
                request.action.label()
            )));
        }
        log_job(&job.id, request);
        Ok(job)
    }

    /// Submit a job and block until it completes or times out.
    pub async fn submit_and_wait(
        &self,
        request: &JobRequest,
        progress: &dyn ProgressSink,
    ) -> Result<Job, PipelineError> {
        let job = self.submit(request).await?;
        self.wait(job, progress).await
    }

    /// Poll an already submitted job until it completes or times out.
    pub async fn wait(&self, mut job: Job, progress: &dyn ProgressSink) -> Result<Job, PipelineError> {
        if !job.has_id() {
            return Err(PipelineError::Submission(
                "cannot wait for a job without an id".to_string(),
            ));
        }

        job.status = JobStatus::Polling;
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            let elapsed = start.elapsed();
            if elapsed >= self.config.timeout {
                job.status = JobStatus::TimedOut;
                tracing::warn!(
                    job_id = %job.id,
                    polls,
                    timeout_secs = self.config.timeout.as_secs(),
                    "Job timed out",
                );
                return Err(PipelineError::Timeout {
                    job_id: job.id,
                    timeout_secs: self.config.timeout.as_secs(),
                });
            }

            polls += 1;
            if let Some(record) = self.api.get_status(&job.id).await? {
                job.status = JobStatus::Completed;
                job.progress = 100;
                if job.prompt.is_empty() {
                    if let Some(prompt) = record.prompt {
                        job.prompt = prompt;
                    }
                }
                job.image_urls = (0..SLOT_COUNT as u8)
                    .map(|i| self.api.image_url(&job.id, i, None))
                    .collect();
                progress.update_absolute(1, 1);
                tracing::info!(
                    job_id = %job.id,
                    polls,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Job completed",
                );
                return Ok(job);
            }

            let delay = next_sleep(start.elapsed(), &self.config);
            tracing::debug!(
                job_id = %job.id,
                polls,
                delay_ms = delay.as_millis() as u64,
                "Job still running",
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Fetch every result slot of `job`, tolerating per-slot failures.
    ///
    /// `job` only needs an id; it does not have to come from
    /// [`submit_and_wait`](Self::submit_and_wait).
    pub async fn collect_all_slots(
        &self,
        job: &Job,
        size: Option<u32>,
    ) -> Result<SlotResults, PipelineError> {
        let mut slots: SlotResults = Default::default();

        for (index, slot) in slots.iter_mut().enumerate() {
            match self.fetch_slot(job, index as u8, size).await {
                Ok(img) => *slot = Some(img),
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.id,
                        slot = index,
                        error = %e,
                        "Result slot unavailable",
                    );
                }
            }
        }

        if slots.iter().all(Option::is_none) {
            return Err(PipelineError::NotFound {
                job_id: job.id.clone(),
            });
        }
        Ok(slots)
    }

    /// Fetch the given slots of a completed job. Any failure aborts.
    pub async fn fetch_slots(
        &self,
        job: &Job,
        indices: &[u8],
        size: Option<u32>,
    ) -> Result<Vec<RgbImage>, PipelineError> {
        let mut images = Vec::with_capacity(indices.len());
        for &index in indices {
            validate_slot_index(index)?;
            images.push(self.fetch_slot(job, index, size).await?);
        }
        Ok(images)
    }

    /// Download one video variant of a completed video job.
    pub async fn fetch_video(
        &self,
        job: &Job,
        index: u8,
        size: Option<u32>,
    ) -> Result<VideoClip, PipelineError> {
        validate_slot_index(index)?;
        let bytes = self.api.download_video(&job.id, index, size).await?;
        let clip = VideoClip::from_bytes(bytes)?;
        tracing::debug!(job_id = %job.id, index, bytes = clip.len(), "Fetched video");
        Ok(clip)
    }

    async fn fetch_slot(
        &self,
        job: &Job,
        index: u8,
        size: Option<u32>,
    ) -> Result<RgbImage, PipelineError> {
        let bytes = self.api.download_image(&job.id, index, size).await?;
        Ok(decode_image(&bytes)?)
    }
}
