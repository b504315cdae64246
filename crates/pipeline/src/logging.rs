//! One-line job summaries for the console log.

use serde_json::Value;

use mjnodes_client::{JobAction, JobRequest};

/// Short display name for a parameter key.
pub fn short_name(key: &str) -> &str {
    match key {
        "stylize" => "s",
        "chaos" => "c",
        "weird" => "w",
        "quality" => "q",
        "visibility" => "vis",
        "personalize" => "p",
        "source" => "src",
        "index" => "idx",
        "direction" => "dir",
        "image" => "img",
        "resolution" => "res",
        other => other,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the action-specific fields and parameters of a request as
/// `key=value` pairs using short names.
pub fn describe_request(request: &JobRequest) -> String {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: String| fields.push((short_name(key).to_string(), value));

    if let Some(source) = request.action.source_job_id() {
        push("source", source.to_string());
    }
    match &request.action {
        JobAction::Imagine | JobAction::AnimateFromImage { .. } => {}
        JobAction::Vary { index, .. } | JobAction::Remix { index, .. } => {
            push("index", index.to_string());
        }
        JobAction::Upscale { index, upscale_type, .. } => {
            push("index", index.to_string());
            push("type", upscale_type.to_string());
        }
        JobAction::Pan { index, direction, .. } => {
            push("index", index.to_string());
            push("direction", direction.to_string());
        }
        JobAction::Animate { index, video, .. } | JobAction::ExtendVideo { index, video, .. } => {
            push("index", index.to_string());
            push("resolution", video.resolution.to_string());
            if let Some(motion) = video.motion {
                push("motion", motion.to_string());
            }
        }
    }
    if let JobAction::AnimateFromImage { video, .. } = &request.action {
        push("resolution", video.resolution.to_string());
        if let Some(motion) = video.motion {
            push("motion", motion.to_string());
        }
    }
    for (key, value) in &request.params {
        push(key, display_value(value));
    }

    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emit one `info` event describing a submitted job.
pub fn log_job(job_id: &str, request: &JobRequest) {
    let action = request.action.label();
    let params = describe_request(request);
    if request.prompt.is_empty() {
        tracing::info!(job_id, mode = %request.mode, params = %params, "[MJ] {action}");
    } else {
        tracing::info!(
            job_id,
            mode = %request.mode,
            prompt = %request.prompt,
            params = %params,
            "[MJ] {action}",
        );
    }
}
