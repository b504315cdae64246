//! Progress reporting for long-running jobs.

/// Receives absolute progress updates (`value` out of `total`).
pub trait ProgressSink: Send + Sync {
    fn update_absolute(&self, value: u64, total: u64);
}

/// Discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update_absolute(&self, _value: u64, _total: u64) {}
}

/// Logs each update as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn update_absolute(&self, value: u64, total: u64) {
        let percent = if total > 0 {
            ((value as f64 / total as f64) * 100.0) as u8
        } else {
            0
        };
        tracing::info!(value, total, percent, "Job progress");
    }
}
