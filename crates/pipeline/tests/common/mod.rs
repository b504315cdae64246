#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};

use mjnodes_client::{ApiError, GenerationApi, JobRecord, JobRequest, SubmitResponse};
use mjnodes_core::error::CoreError;
use mjnodes_core::params::ImageStager;
use mjnodes_pipeline::convert::encode_png;
use mjnodes_pipeline::{Orchestrator, PollConfig, ProgressSink};

/// When the fake service reports the job as finished.
#[derive(Debug, Clone, Copy)]
pub enum Completion {
    /// Completed on the n-th status query (1-based).
    AfterPolls(u32),
    Never,
}

/// What a download of one slot returns.
#[derive(Debug, Clone)]
pub enum SlotBehavior {
    Bytes(Vec<u8>),
    Status(u16),
}

/// Scripted stand-in for the generation service.
pub struct FakeApi {
    job_id: Option<String>,
    fail_on_submit: Option<u16>,
    completion: Completion,
    fail_on_poll: Option<u32>,
    slots: Vec<SlotBehavior>,
    video: Option<Vec<u8>>,
    polls: AtomicU32,
    requests: Mutex<Vec<JobRequest>>,
    downloads: Mutex<Vec<(u8, Option<u32>)>>,
}

impl FakeApi {
    /// A service that completes `job_id` on the first query and serves a
    /// valid image in every slot.
    pub fn new(job_id: &str) -> Self {
        Self {
            job_id: Some(job_id.to_string()),
            fail_on_submit: None,
            completion: Completion::AfterPolls(1),
            fail_on_poll: None,
            slots: (0..4).map(|i| SlotBehavior::Bytes(png_bytes(i))).collect(),
            video: None,
            polls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn completing(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    /// Answer submissions with a null job id.
    pub fn without_job_id(mut self) -> Self {
        self.job_id = None;
        self
    }

    /// Reject every submission with the given HTTP status.
    pub fn failing_submit(mut self, status: u16) -> Self {
        self.fail_on_submit = Some(status);
        self
    }

    /// Fail the n-th status query (1-based) with a 503.
    pub fn failing_poll(mut self, poll: u32) -> Self {
        self.fail_on_poll = Some(poll);
        self
    }

    pub fn with_slots(mut self, slots: Vec<SlotBehavior>) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_video(mut self, bytes: Vec<u8>) -> Self {
        self.video = Some(bytes);
        self
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<JobRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> JobRequest {
        self.requests().pop().expect("no request submitted")
    }

    pub fn downloads(&self) -> Vec<(u8, Option<u32>)> {
        self.downloads.lock().unwrap().clone()
    }
}

impl GenerationApi for FakeApi {
    async fn submit(&self, request: &JobRequest) -> Result<SubmitResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(status) = self.fail_on_submit {
            return Err(ApiError::Status {
                status,
                body: "rejected".to_string(),
            });
        }
        Ok(SubmitResponse {
            job_id: self.job_id.clone(),
        })
    }

    async fn get_status(&self, job_id: &str) -> Result<Option<JobRecord>, ApiError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_poll == Some(poll) {
            return Err(ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let done = match self.completion {
            Completion::AfterPolls(n) => poll >= n,
            Completion::Never => false,
        };
        Ok(done.then(|| JobRecord {
            id: job_id.to_string(),
            status: "completed".to_string(),
            prompt: Some("from service".to_string()),
        }))
    }

    async fn download_image(
        &self,
        _job_id: &str,
        index: u8,
        size: Option<u32>,
    ) -> Result<Vec<u8>, ApiError> {
        self.downloads.lock().unwrap().push((index, size));
        match self.slots.get(usize::from(index)) {
            Some(SlotBehavior::Bytes(bytes)) => Ok(bytes.clone()),
            Some(SlotBehavior::Status(status)) => Err(ApiError::Status {
                status: *status,
                body: "missing".to_string(),
            }),
            None => Err(ApiError::Status {
                status: 404,
                body: "missing".to_string(),
            }),
        }
    }

    async fn download_video(
        &self,
        _job_id: &str,
        _index: u8,
        _size: Option<u32>,
    ) -> Result<Vec<u8>, ApiError> {
        self.video.clone().ok_or(ApiError::Status {
            status: 404,
            body: "missing".to_string(),
        })
    }

    fn image_url(&self, job_id: &str, index: u8, _size: Option<u32>) -> String {
        format!("fake://{job_id}/{index}")
    }
}

/// Progress sink that records every update.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    updates: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl RecordingProgress {
    pub fn updates(&self) -> Vec<(u64, u64)> {
        self.updates.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn update_absolute(&self, value: u64, total: u64) {
        self.updates.lock().unwrap().push((value, total));
    }
}

/// Stager that returns predictable paths without touching the disk.
#[derive(Debug, Default)]
pub struct FakeStager {
    staged: AtomicU32,
}

impl ImageStager for FakeStager {
    fn stage(&self, _image: &RgbImage) -> Result<String, CoreError> {
        let n = self.staged.fetch_add(1, Ordering::SeqCst);
        Ok(format!("/tmp/staged_{n}.png"))
    }
}

/// A 2x2 PNG whose pixels encode `seed`, so slots are distinguishable.
pub fn png_bytes(seed: u8) -> Vec<u8> {
    encode_png(&test_image(seed)).unwrap()
}

pub fn test_image(seed: u8) -> RgbImage {
    RgbImage::from_pixel(2, 2, Rgb([seed, 0, 0]))
}

/// Smallest payload accepted as an MP4.
pub fn mp4_bytes() -> Vec<u8> {
    let mut bytes = vec![0, 0, 0, 20];
    bytes.extend_from_slice(b"ftypisom");
    bytes.extend_from_slice(&[0; 8]);
    bytes
}

pub fn poll_config(interval_secs: u64, timeout_secs: u64) -> PollConfig {
    PollConfig {
        poll_interval: Duration::from_secs(interval_secs),
        timeout: Duration::from_secs(timeout_secs),
    }
}

pub fn orchestrator(api: FakeApi) -> Orchestrator<FakeApi> {
    Orchestrator::new(api, poll_config(5, 600))
}
