//! One ingestion run, end to end.
//!
//! ```text
//! Idle -> Discovering -> Harvesting -> Classifying -> Persisting -> Done
//!            \______________\_____________\______________\-------> Failed
//! ```
//!
//! The run ledger row is opened on entering `Discovering` and closed on
//! `Done` or `Failed`. Buckets are written once, after every video unit has
//! finished; a failure while persisting leaves earlier buckets in place.

use std::path::PathBuf;
use std::sync::Arc;

use brandpulse_classify::{clean_comment, strip_emojis, CommentClassifier};
use brandpulse_core::{
    AppConfig, Bucket, Comment, CommentRecord, KeywordRecord, Label, Language, RunSummary,
    ScrapeId, Video,
};
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::buckets::RunAccumulator;
use crate::discovery::discover;
use crate::error::IngestError;
use crate::harvest::harvest_comments;
use crate::snapshot::write_snapshots;
use crate::traits::{KeywordStore, Persistence, RunStart, VideoPlatform};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The date window a run keeps comments from. Both ends are inclusive
/// whole days in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl IngestionRequest {
    /// Parses `YYYY-MM-DD` bounds and checks their order.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Validation`] for a malformed date or a start
    /// after the end.
    pub fn parse(start_date: &str, end_date: &str) -> Result<Self, IngestError> {
        let parse = |label: &str, raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
                IngestError::Validation(format!("{label} date {raw:?} is not YYYY-MM-DD: {e}"))
            })
        };
        let request = Self {
            start_date: parse("start", start_date)?,
            end_date: parse("end", end_date)?,
        };
        request.validate()?;
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns [`IngestError::Validation`] if the start is after the end.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.start_date > self.end_date {
            return Err(IngestError::Validation(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start_date <= day && day <= self.end_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Discovering,
    Harvesting,
    Classifying,
    Persisting,
    Done,
    Failed,
}

impl RunState {
    /// Forward one step, or to `Failed` from any non-terminal state.
    #[must_use]
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::{Classifying, Discovering, Done, Failed, Harvesting, Idle, Persisting};
        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed)
            | (Idle, Discovering)
            | (Discovering, Harvesting)
            | (Harvesting, Classifying)
            | (Classifying, Persisting)
            | (Persisting, Done) => true,
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Discovering => "discovering",
            RunState::Harvesting => "harvesting",
            RunState::Classifying => "classifying",
            RunState::Persisting => "persisting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller gets back from [`Orchestrator::ingest`]. Serializes with a
/// `status` of `success` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestOutcome {
    Success(RunSummary),
    Error { message: String },
}

/// Run limits taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSettings {
    pub max_search_results: u32,
    pub max_comments_per_video: usize,
    pub max_concurrent_videos: usize,
    pub keyword_match_ratio: f64,
    /// `None` disables CSV snapshots.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_search_results: 50,
            max_comments_per_video: 200,
            max_concurrent_videos: 1,
            keyword_match_ratio: 0.3,
            snapshot_dir: None,
        }
    }
}

impl IngestSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_search_results: config.max_search_results,
            max_comments_per_video: config.max_comments_per_video,
            max_concurrent_videos: config.max_concurrent_videos,
            keyword_match_ratio: config.fusion.keyword_match_ratio,
            snapshot_dir: Some(config.snapshot_dir.clone()),
        }
    }
}

/// Logs every state change of one run.
struct RunTracker {
    scrape_id: ScrapeId,
    state: RunState,
}

impl RunTracker {
    fn new(scrape_id: ScrapeId) -> Self {
        Self {
            scrape_id,
            state: RunState::Idle,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {} -> {next}",
            self.state
        );
        tracing::info!(
            scrape_id = %self.scrape_id,
            from = %self.state,
            to = %next,
            "run state changed"
        );
        self.state = next;
    }
}

/// Fields every unit of a run needs.
struct RunContext {
    scrape_id: ScrapeId,
    brand: String,
    keywords: Vec<String>,
    request: IngestionRequest,
}

/// Drives ingestion runs against injected collaborators.
pub struct Orchestrator {
    platform: Arc<dyn VideoPlatform>,
    keywords: Arc<dyn KeywordStore>,
    store: Arc<dyn Persistence>,
    classifier: Arc<CommentClassifier>,
    settings: IngestSettings,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        keywords: Arc<dyn KeywordStore>,
        store: Arc<dyn Persistence>,
        classifier: Arc<CommentClassifier>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            platform,
            keywords,
            store,
            classifier,
            settings,
        }
    }

    /// Runs one ingestion and folds any failure into
    /// [`IngestOutcome::Error`].
    pub async fn ingest(
        &self,
        request: &IngestionRequest,
        cancel: &CancellationToken,
    ) -> IngestOutcome {
        match self.run(request, cancel).await {
            Ok(summary) => IngestOutcome::Success(summary),
            Err(e) => {
                tracing::error!(error = %e, "ingestion run failed");
                IngestOutcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Runs one ingestion.
    ///
    /// Cancellation is checked before each video; a cancelled run still
    /// persists what it classified and returns a summary flagged
    /// `cancelled`.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Validation`] for a bad date range or a missing
    ///   keyword record. No run is opened.
    /// - [`IngestError::UpstreamQuota`] or [`IngestError::Platform`] if the
    ///   search call fails.
    /// - [`IngestError::Persistence`] or [`IngestError::Snapshot`] if
    ///   writing results fails.
    pub async fn run(
        &self,
        request: &IngestionRequest,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, IngestError> {
        request.validate()?;
        let KeywordRecord {
            brand, keywords, ..
        } = self.keywords.latest().await?.ok_or_else(|| {
            IngestError::Validation("no saved keyword combination".to_string())
        })?;
        if brand.trim().is_empty() || keywords.is_empty() {
            return Err(IngestError::Validation(
                "saved keyword combination has no brand or no keywords".to_string(),
            ));
        }

        let ctx = RunContext {
            scrape_id: ScrapeId::mint(Utc::now()),
            brand,
            keywords,
            request: *request,
        };
        let mut tracker = RunTracker::new(ctx.scrape_id.clone());

        tracker.advance(RunState::Discovering);
        self.store
            .open_run(&RunStart {
                scrape_id: ctx.scrape_id.clone(),
                brand: ctx.brand.clone(),
                keywords: ctx.keywords.clone(),
                start_date: request.start_date,
                end_date: request.end_date,
            })
            .await?;
        tracing::info!(
            scrape_id = %ctx.scrape_id,
            brand = %ctx.brand,
            keywords = ?ctx.keywords,
            start_date = %request.start_date,
            end_date = %request.end_date,
            "ingestion started"
        );

        let summary = match self.execute(&ctx, &mut tracker, cancel).await {
            Ok(summary) => summary,
            Err(e) => {
                tracker.advance(RunState::Failed);
                self.fail_run_best_effort(&ctx.scrape_id, &e.to_string())
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = self.store.complete_run(&ctx.scrape_id, &summary).await {
            tracker.advance(RunState::Failed);
            self.fail_run_best_effort(&ctx.scrape_id, &e.to_string())
                .await;
            return Err(e);
        }

        tracker.advance(RunState::Done);
        tracing::info!(
            scrape_id = %summary.scrape_id,
            english_aspects = summary.english_aspects,
            sinhala_aspects = summary.sinhala_aspects,
            english_garbage = summary.english_garbage,
            sinhala_garbage = summary.sinhala_garbage,
            cancelled = summary.cancelled,
            "ingestion complete"
        );
        Ok(summary)
    }

    async fn execute(
        &self,
        ctx: &RunContext,
        tracker: &mut RunTracker,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, IngestError> {
        let videos = discover(
            self.platform.as_ref(),
            &ctx.keywords,
            self.settings.max_search_results,
            self.settings.keyword_match_ratio,
        )
        .await?;

        tracker.advance(RunState::Harvesting);
        let harvested = self.harvest_all(&videos, cancel).await;

        tracker.advance(RunState::Classifying);
        let acc = RunAccumulator::new();
        self.classify_all(ctx, &harvested, &acc, cancel).await;
        let cancelled = cancel.is_cancelled();
        if cancelled {
            tracing::warn!(scrape_id = %ctx.scrape_id, "run cancelled; persisting partial results");
        }

        tracker.advance(RunState::Persisting);
        let (buckets, skipped_languages) = acc.into_parts();
        for bucket in Bucket::ALL {
            let Some(records) = buckets.get(&bucket).filter(|r| !r.is_empty()) else {
                continue;
            };
            let rows = self.store.bulk_insert(bucket, records).await?;
            tracing::info!(scrape_id = %ctx.scrape_id, table = %bucket, rows, "bucket persisted");
        }

        if let Some(dir) = &self.settings.snapshot_dir {
            write_snapshots(dir, &ctx.scrape_id, &buckets)?;
        }

        let count = |bucket: Bucket| buckets.get(&bucket).map_or(0, Vec::len);
        Ok(RunSummary {
            brand: ctx.brand.clone(),
            keywords: ctx.keywords.clone(),
            scrape_id: ctx.scrape_id.clone(),
            english_aspects: count(Bucket::EnglishValid),
            sinhala_aspects: count(Bucket::SinhalaValid),
            english_garbage: count(Bucket::EnglishGarbage),
            sinhala_garbage: count(Bucket::SinhalaGarbage),
            skipped_languages,
            cancelled,
        })
    }

    /// Harvests every video, up to `max_concurrent_videos` at a time. Videos
    /// whose harvest fails are dropped; results keep discovery order.
    async fn harvest_all<'v>(
        &self,
        videos: &'v [Video],
        cancel: &CancellationToken,
    ) -> Vec<(&'v Video, Vec<Comment>)> {
        let max_concurrent = self.settings.max_concurrent_videos.max(1);
        let max_comments = self.settings.max_comments_per_video;

        let results: Vec<Option<(&Video, Vec<Comment>)>> = stream::iter(videos)
            .map(|video| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                match harvest_comments(self.platform.as_ref(), &video.id, max_comments).await {
                    Ok(comments) => Some((video, comments)),
                    Err(e) => {
                        tracing::warn!(
                            video_id = %video.id,
                            error = %e,
                            "skipping video: comment harvest failed"
                        );
                        None
                    }
                }
            })
            .buffered(max_concurrent)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    async fn classify_all(
        &self,
        ctx: &RunContext,
        harvested: &[(&Video, Vec<Comment>)],
        acc: &RunAccumulator,
        cancel: &CancellationToken,
    ) {
        let max_concurrent = self.settings.max_concurrent_videos.max(1);

        stream::iter(harvested)
            .map(|(video, comments)| async move {
                if cancel.is_cancelled() {
                    return;
                }
                self.classify_video(ctx, video, comments, acc).await;
            })
            .buffer_unordered(max_concurrent)
            .collect::<Vec<()>>()
            .await;
    }

    async fn classify_video(
        &self,
        ctx: &RunContext,
        video: &Video,
        comments: &[Comment],
        acc: &RunAccumulator,
    ) {
        let mut kept = 0_usize;

        for comment in comments {
            if !ctx.request.contains(comment.published_at) {
                continue;
            }

            let cleaned = clean_comment(&comment.text);
            if cleaned.is_empty() {
                acc.skip(Language::Other);
                continue;
            }
            if !acc.first_sighting(&cleaned) {
                continue;
            }

            let classified = self.classifier.classify(&cleaned).await;
            if classified.label() == Label::Skip {
                acc.skip(classified.language());
                continue;
            }
            let Some(bucket) = classified.bucket() else {
                continue;
            };

            acc.push(
                bucket,
                CommentRecord {
                    scrape_id: ctx.scrape_id.clone(),
                    brand: ctx.brand.clone(),
                    trigger_keywords: ctx.keywords.clone(),
                    comment: strip_emojis(&comment.text),
                    aspect: classified.aspect(),
                    published_at: comment.published_at,
                    scores: classified.scores(),
                },
            );
            kept += 1;
        }

        tracing::debug!(
            video_id = %video.id,
            harvested = comments.len(),
            kept,
            "video classified"
        );
    }

    async fn fail_run_best_effort(&self, scrape_id: &ScrapeId, message: &str) {
        if let Err(e) = self.store.fail_run(scrape_id, message).await {
            tracing::error!(
                scrape_id = %scrape_id,
                error = %e,
                "failed to mark scrape run as failed"
            );
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
