//! Client library for the remote generation service.
//!
//! Provides the [`api::GenerationApi`] trait the orchestrator depends on,
//! its HTTP implementation, job and request models, and configuration
//! loading.

pub mod api;
pub mod config;
pub mod models;

pub use api::{ApiError, GenerationApi, HttpGenerationApi};
pub use config::ApiConfig;
pub use models::{Job, JobAction, JobRecord, JobRequest, JobStatus, SubmitResponse, SLOT_COUNT};
