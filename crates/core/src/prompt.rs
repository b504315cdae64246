//! Prompt assembly and video job options.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::options::{MotionIntensity, SpeedMode, VideoResolution};

/// Combine a prompt with a negative prompt.
///
/// Both parts are trimmed. A non-empty negative becomes a `--no <terms>`
/// suffix, or the whole prompt when the positive part is empty.
pub fn build_prompt(prompt: &str, no: &str) -> String {
    let p = prompt.trim();
    let n = no.trim();
    match (p.is_empty(), n.is_empty()) {
        (_, true) => p.to_string(),
        (true, false) => format!("--no {n}"),
        (false, false) => format!("{p} --no {n}"),
    }
}

/// Batch sizes a video job accepts.
pub const VALID_VIDEO_BATCH_SIZES: &[u8] = &[1, 2, 4];

/// Options shared by the animate and extend-video operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    pub motion: Option<MotionIntensity>,
    pub resolution: VideoResolution,
    pub batch_size: u8,
    pub mode: SpeedMode,
    pub stealth: bool,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            motion: None,
            resolution: VideoResolution::default(),
            batch_size: 1,
            mode: SpeedMode::default(),
            stealth: false,
        }
    }
}

impl VideoParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !VALID_VIDEO_BATCH_SIZES.contains(&self.batch_size) {
            return Err(CoreError::Validation(format!(
                "Invalid video batch size {}. Must be one of: 1, 2, 4",
                self.batch_size
            )));
        }
        Ok(())
    }
}
