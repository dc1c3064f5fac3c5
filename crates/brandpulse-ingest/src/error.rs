use std::path::PathBuf;

use brandpulse_db::DbError;
use brandpulse_youtube::YoutubeError;
use thiserror::Error;

/// Failures reported by a [`crate::VideoPlatform`].
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Quota exhausted or credentials rejected. Never retried.
    #[error("quota or credential failure: {0}")]
    QuotaOrAuth(String),

    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    #[must_use]
    pub fn is_quota_or_auth(&self) -> bool {
        matches!(self, PlatformError::QuotaOrAuth(_))
    }
}

impl From<YoutubeError> for PlatformError {
    fn from(err: YoutubeError) -> Self {
        if err.is_quota_or_auth() {
            PlatformError::QuotaOrAuth(err.to_string())
        } else {
            PlatformError::Other(err.to_string())
        }
    }
}

/// Errors that end an ingestion run.
///
/// Per-video and per-comment failures never surface here: they are logged
/// and the unit is skipped.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Bad date range or missing keyword record. Raised before any run is
    /// opened.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("upstream quota error: {0}")]
    UpstreamQuota(String),

    #[error("video platform error: {0}")]
    Platform(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("snapshot error for {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<PlatformError> for IngestError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::QuotaOrAuth(message) => IngestError::UpstreamQuota(message),
            PlatformError::Other(message) => IngestError::Platform(message),
        }
    }
}

impl From<DbError> for IngestError {
    fn from(err: DbError) -> Self {
        IngestError::Persistence(err.to_string())
    }
}
