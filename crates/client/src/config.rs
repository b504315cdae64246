use std::time::Duration;

use crate::api::ApiError;

/// Default service endpoint.
pub const DEFAULT_API_URL: &str = "https://api.midjourney.com";
/// Default CDN serving job results.
pub const DEFAULT_CDN_URL: &str = "https://cdn.midjourney.com";
/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the generation service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_url: String,
    pub cdn_url: String,
    pub token: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_url: impl Into<String>, cdn_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: trim_base(api_url.into()),
            cdn_url: trim_base(cdn_url.into()),
            token: token.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Default                       |
    /// |---------------------------|-------------------------------|
    /// | `MJ_API_TOKEN`            | required                      |
    /// | `MJ_API_URL`              | `https://api.midjourney.com`  |
    /// | `MJ_CDN_URL`              | `https://cdn.midjourney.com`  |
    /// | `MJ_REQUEST_TIMEOUT_SECS` | `60`                          |
    pub fn from_env() -> Result<Self, ApiError> {
        let token = std::env::var("MJ_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Config("MJ_API_TOKEN must be set".into()))?;

        let api_url = std::env::var("MJ_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let cdn_url = std::env::var("MJ_CDN_URL").unwrap_or_else(|_| DEFAULT_CDN_URL.into());

        let request_timeout_secs: u64 = match std::env::var("MJ_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ApiError::Config(format!("MJ_REQUEST_TIMEOUT_SECS must be a valid u64, got '{raw}'"))
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            request_timeout: Duration::from_secs(request_timeout_secs),
            ..Self::new(api_url, cdn_url, token)
        })
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_removed() {
        let config = ApiConfig::new("http://host:1/", "http://cdn//", "t");
        assert_eq!(config.api_url, "http://host:1");
        assert_eq!(config.cdn_url, "http://cdn");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }
}
