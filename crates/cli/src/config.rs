//! Settings for the command-line front end.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use mjnodes_pipeline::PollConfig;

/// Process-wide settings that are not specific to one command.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub poll: PollConfig,
    pub presets_dir: PathBuf,
    /// Keyword roots in override order; later roots win.
    pub keywords_dirs: Vec<PathBuf>,
    pub styles_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default    |
    /// |-------------------------|------------|
    /// | `MJ_POLL_INTERVAL_SECS` | `5`        |
    /// | `MJ_JOB_TIMEOUT_SECS`   | `600`      |
    /// | `MJ_PRESETS_DIR`        | `presets`  |
    /// | `MJ_KEYWORDS_DIRS`      | `keywords` |
    /// | `MJ_STYLES_DIRS`        | `styles`   |
    /// | `MJ_OUTPUT_DIR`         | `output`   |
    /// | `MJ_LOG_FORMAT`         | `text`     |
    pub fn from_env() -> Result<Self> {
        let defaults = PollConfig::default();
        let poll = PollConfig {
            poll_interval: env_secs("MJ_POLL_INTERVAL_SECS", defaults.poll_interval)?,
            timeout: env_secs("MJ_JOB_TIMEOUT_SECS", defaults.timeout)?,
        };

        Ok(Self {
            poll,
            presets_dir: env_path("MJ_PRESETS_DIR", "presets"),
            keywords_dirs: parse_dirs(&env_or("MJ_KEYWORDS_DIRS", "keywords")),
            styles_dirs: parse_dirs(&env_or("MJ_STYLES_DIRS", "styles")),
            output_dir: env_path("MJ_OUTPUT_DIR", "output"),
            log_json: env_or("MJ_LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_path(name: &str, default: &str) -> PathBuf {
    PathBuf::from(env_or(name, default))
}

fn env_secs(name: &str, default: Duration) -> Result<Duration> {
    match std::env::var(name) {
        Ok(raw) => parse_secs(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds, got '{raw}'"))?;
    Ok(Duration::from_secs(secs))
}

/// Split a comma-separated directory list, skipping blank entries.
pub fn parse_dirs(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
