//! Wire and domain models for generation jobs.

use serde::{Deserialize, Serialize};

use mjnodes_core::options::{PanDirection, SpeedMode, UpscaleType};
use mjnodes_core::params::RequestParams;
use mjnodes_core::prompt::VideoParams;

/// Number of result slots a job can expose.
pub const SLOT_COUNT: usize = 4;

/// Status string the service reports for a finished job.
pub const REMOTE_STATUS_COMPLETED: &str = "completed";

/// Lifecycle of a job as seen by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

/// A unit of remote generation work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Service-assigned identifier.
    pub id: String,
    pub prompt: String,
    pub status: JobStatus,
    /// 0-100.
    pub progress: u8,
    /// Download locators for each slot, filled once the job completes.
    pub image_urls: Vec<String>,
}

impl Job {
    /// A freshly submitted job.
    pub fn submitted(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            status: JobStatus::Submitted,
            progress: 0,
            image_urls: Vec::new(),
        }
    }

    /// A job known only by id, for downloading results of earlier work.
    pub fn for_download(id: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            progress: 100,
            ..Self::submitted(id, "")
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// The operation a job performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum JobAction {
    Imagine,
    Vary {
        source_job_id: String,
        index: u8,
        strong: bool,
    },
    Remix {
        source_job_id: String,
        index: u8,
        strong: bool,
        stealth: bool,
    },
    Upscale {
        source_job_id: String,
        index: u8,
        upscale_type: UpscaleType,
    },
    Pan {
        source_job_id: String,
        index: u8,
        direction: PanDirection,
    },
    Animate {
        source_job_id: String,
        index: u8,
        video: VideoParams,
    },
    AnimateFromImage {
        start_image: String,
        /// Path of the end frame, or `"loop"`.
        end_image: Option<String>,
        video: VideoParams,
    },
    ExtendVideo {
        source_job_id: String,
        index: u8,
        end_image: Option<String>,
        video: VideoParams,
    },
}

impl JobAction {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Imagine => "Imagine",
            Self::Vary { strong: true, .. } => "Vary (Strong)",
            Self::Vary { strong: false, .. } => "Vary (Subtle)",
            Self::Remix { strong: true, .. } => "Remix (Strong)",
            Self::Remix { strong: false, .. } => "Remix (Subtle)",
            Self::Upscale { .. } => "Upscale",
            Self::Pan { .. } => "Pan",
            Self::Animate { .. } => "Animate",
            Self::AnimateFromImage { .. } => "AnimateFromImage",
            Self::ExtendVideo { .. } => "ExtendVideo",
        }
    }

    /// Job this action derives from, if any.
    pub fn source_job_id(&self) -> Option<&str> {
        match self {
            Self::Imagine | Self::AnimateFromImage { .. } => None,
            Self::Vary { source_job_id, .. }
            | Self::Remix { source_job_id, .. }
            | Self::Upscale { source_job_id, .. }
            | Self::Pan { source_job_id, .. }
            | Self::Animate { source_job_id, .. }
            | Self::ExtendVideo { source_job_id, .. } => Some(source_job_id),
        }
    }
}

/// Body of a job submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(flatten)]
    pub action: JobAction,
    pub prompt: String,
    pub mode: SpeedMode,
    #[serde(default)]
    pub params: RequestParams,
}

impl JobRequest {
    pub fn new(action: JobAction, prompt: impl Into<String>, mode: SpeedMode) -> Self {
        Self {
            action,
            prompt: prompt.into(),
            mode,
            params: RequestParams::new(),
        }
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }
}

/// Response of the submit endpoint. The id may be absent or null when the
/// service accepted the request but did not create a job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Job record returned by the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl JobRecord {
    pub fn is_completed(&self) -> bool {
        self.status == REMOTE_STATUS_COMPLETED
    }
}
