//! Job orchestration and node adapters.
//!
//! [`orchestrator::Orchestrator`] drives jobs against any
//! [`mjnodes_client::GenerationApi`]; [`actions::Actions`] exposes one
//! method per generation operation on top of it.

pub mod actions;
pub mod convert;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod progress;

pub use actions::{Actions, EndFrame, ImageOutput, SourceSlot};
pub use error::PipelineError;
pub use orchestrator::{Orchestrator, PollConfig, SlotResults};
pub use progress::{NoProgress, ProgressSink, TracingProgress};
