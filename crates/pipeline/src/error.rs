use mjnodes_client::ApiError;
use mjnodes_core::error::CoreError;

use crate::convert::ConvertError;

/// Errors surfaced by job orchestration and the node adapters.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The service accepted the call but returned no usable job id.
    #[error("Job submission failed: {0}")]
    Submission(String),

    /// The job did not reach a terminal state within the budget.
    #[error("Job {job_id} timed out after {timeout_secs}s")]
    Timeout { job_id: String, timeout_secs: u64 },

    /// Network or protocol failure from the service client.
    #[error(transparent)]
    Transport(#[from] ApiError),

    /// No result slot of the job could be retrieved.
    #[error("No retrievable results for job {job_id}")]
    NotFound { job_id: String },

    /// Validation, preset or other domain failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}
