//! Shared domain types and configuration for the BrandPulse ingestion pipeline.

mod app_config;
mod aspect;
mod config;
mod types;

pub use app_config::{AppConfig, ClassifierEndpoints, Environment, FusionConfig, LexiconPaths};
pub use aspect::{Aspect, UnknownAspect};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    Bucket, ClassifiedComment, Comment, CommentPage, CommentRecord, KeywordRecord, Label,
    Language, RunSummary, Scores, ScrapeId, SearchHit, Video, VideoStats,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
