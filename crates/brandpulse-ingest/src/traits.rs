//! Collaborator seams for the orchestrator.
//!
//! Production wires [`brandpulse_youtube::YoutubeClient`] and
//! [`crate::PgStore`]; tests substitute in-memory mocks.

use async_trait::async_trait;
use brandpulse_core::{
    Bucket, CommentPage, CommentRecord, KeywordRecord, RunSummary, ScrapeId, SearchHit,
    VideoStats,
};
use brandpulse_db::ScrapeResults;
use brandpulse_youtube::YoutubeClient;
use chrono::NaiveDate;

use crate::error::{IngestError, PlatformError};

/// Video search, statistics and comment pages.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    async fn search(&self, query: &str, max_results: u32)
        -> Result<Vec<SearchHit>, PlatformError>;

    async fn video_stats(&self, video_id: &str) -> Result<VideoStats, PlatformError>;

    async fn comment_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError>;
}

#[async_trait]
impl VideoPlatform for YoutubeClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, PlatformError> {
        Ok(YoutubeClient::search(self, query, max_results).await?)
    }

    async fn video_stats(&self, video_id: &str) -> Result<VideoStats, PlatformError> {
        Ok(YoutubeClient::video_stats(self, video_id).await?)
    }

    async fn comment_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError> {
        Ok(YoutubeClient::comment_page(self, video_id, page_token).await?)
    }
}

/// Source of the brand and keywords a run searches for.
#[async_trait]
pub trait KeywordStore: Send + Sync {
    /// The most recently saved combination, if any.
    async fn latest(&self) -> Result<Option<KeywordRecord>, IngestError>;
}

/// What the run ledger records when a run opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStart {
    pub scrape_id: ScrapeId,
    pub brand: String,
    pub keywords: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Bucket storage plus the per-run ledger.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Writes every record of one bucket. Returns the number of rows written.
    async fn bulk_insert(
        &self,
        bucket: Bucket,
        records: &[CommentRecord],
    ) -> Result<u64, IngestError>;

    async fn find_by(&self, brand: &str, scrape_id: &str) -> Result<ScrapeResults, IngestError>;

    async fn open_run(&self, run: &RunStart) -> Result<(), IngestError>;

    async fn complete_run(
        &self,
        scrape_id: &ScrapeId,
        summary: &RunSummary,
    ) -> Result<(), IngestError>;

    async fn fail_run(&self, scrape_id: &ScrapeId, message: &str) -> Result<(), IngestError>;
}
