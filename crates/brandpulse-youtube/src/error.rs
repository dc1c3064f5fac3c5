use thiserror::Error;

/// Errors returned by the `YouTube` API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client. The request
    /// URL is stripped because it carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Daily quota or rate limit exhausted for the key used.
    #[error("YouTube quota exceeded: {0}")]
    QuotaExceeded(String),

    /// 403 for a reason other than quota, e.g. comments disabled.
    #[error("YouTube request forbidden: {0}")]
    Forbidden(String),

    /// Missing, invalid, or revoked API key.
    #[error("YouTube request unauthorized: {0}")]
    Unauthorized(String),

    #[error("YouTube API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("no YouTube API keys configured")]
    NoApiKeys,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl YoutubeError {
    /// Quota and credential failures. These are terminal for the current
    /// page or video and are never retried.
    #[must_use]
    pub fn is_quota_or_auth(&self) -> bool {
        matches!(
            self,
            YoutubeError::QuotaExceeded(_)
                | YoutubeError::Forbidden(_)
                | YoutubeError::Unauthorized(_)
        )
    }
}
