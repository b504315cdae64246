//! Client for the generation service.
//!
//! [`GenerationApi`] is the seam the orchestrator depends on: submit a
//! job, query its status, download result bytes by slot.
//! [`HttpGenerationApi`] implements it over HTTP with [`reqwest`].

use std::future::Future;

use crate::config::ApiConfig;
use crate::models::{JobRecord, JobRequest, SubmitResponse};

/// Errors from the service client layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Client configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Operations the orchestrator needs from the generation service.
///
/// Implementations must report transport failures as errors rather than
/// returning empty data.
pub trait GenerationApi: Send + Sync {
    /// Submit a job. The returned id may be empty if the service
    /// rejected the request without an error status.
    fn submit(
        &self,
        request: &JobRequest,
    ) -> impl Future<Output = Result<SubmitResponse, ApiError>> + Send;

    /// Query a job. `Ok(None)` means the job has not finished yet.
    fn get_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<Option<JobRecord>, ApiError>> + Send;

    /// Download the encoded image in result slot `index`.
    fn download_image(
        &self,
        job_id: &str,
        index: u8,
        size: Option<u32>,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;

    /// Download the encoded video for batch variant `index`.
    fn download_video(
        &self,
        job_id: &str,
        index: u8,
        size: Option<u32>,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;

    /// Download locator of result slot `index`.
    fn image_url(&self, job_id: &str, index: u8, size: Option<u32>) -> String;
}

/// HTTP client for the generation service.
pub struct HttpGenerationApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpGenerationApi {
    /// Build a client with the configured request timeout.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Download locator of video batch variant `index`.
    pub fn video_url(&self, job_id: &str, index: u8, size: Option<u32>) -> String {
        match size {
            Some(size) => format!("{}/video/{job_id}/{index}_{size}_N.mp4", self.config.cdn_url),
            None => format!("{}/video/{job_id}/{index}.mp4", self.config.cdn_url),
        }
    }

    // ---- private helpers ----

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl GenerationApi for HttpGenerationApi {
    /// `POST /v1/jobs`
    async fn submit(&self, request: &JobRequest) -> Result<SubmitResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/v1/jobs", self.config.api_url))
            .bearer_auth(&self.config.token)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /v1/jobs/{id}`. A 404 or a non-completed status means the
    /// job is still running.
    async fn get_status(&self, job_id: &str) -> Result<Option<JobRecord>, ApiError> {
        let response = self
            .client
            .get(format!("{}/v1/jobs/{job_id}", self.config.api_url))
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record: JobRecord = Self::parse_response(response).await?;
        tracing::trace!(job_id, status = %record.status, "Job status");
        Ok(record.is_completed().then_some(record))
    }

    async fn download_image(
        &self,
        job_id: &str,
        index: u8,
        size: Option<u32>,
    ) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&self.image_url(job_id, index, size)).await
    }

    async fn download_video(
        &self,
        job_id: &str,
        index: u8,
        size: Option<u32>,
    ) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&self.video_url(job_id, index, size)).await
    }

    fn image_url(&self, job_id: &str, index: u8, size: Option<u32>) -> String {
        match size {
            Some(size) => format!("{}/{job_id}/0_{index}_{size}_N.webp", self.config.cdn_url),
            None => format!("{}/{job_id}/0_{index}.png", self.config.cdn_url),
        }
    }
}
