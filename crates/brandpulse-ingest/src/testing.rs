//! In-memory collaborators for orchestrator tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use brandpulse_classify::{
    ClassifierError, CommentClassifier, LanguageDetector, LexiconStore, TextClassifier,
};
use brandpulse_core::{
    Aspect, Bucket, Comment, CommentPage, CommentRecord, KeywordRecord, RunSummary, ScrapeId,
    SearchHit, VideoStats,
};
use brandpulse_db::{AspectGroup, ScrapeResults};
use chrono::{NaiveDate, Utc};

use crate::error::{IngestError, PlatformError};
use crate::traits::{KeywordStore, Persistence, RunStart, VideoPlatform};

/// A comment published at noon UTC on `date` (`YYYY-MM-DD`).
pub(crate) fn comment(id: &str, text: &str, date: &str) -> Comment {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date");
    Comment {
        id: id.to_string(),
        text: text.to_string(),
        author: "tester".to_string(),
        published_at: day.and_hms_opt(12, 0, 0).expect("noon").and_utc(),
        like_count: 0,
    }
}

type PageKey = (String, Option<String>);

#[derive(Default)]
pub(crate) struct MockPlatform {
    search: Option<Result<Vec<SearchHit>, PlatformError>>,
    stats: HashMap<String, Result<VideoStats, PlatformError>>,
    pages: HashMap<PageKey, Result<CommentPage, PlatformError>>,
    search_calls: Mutex<Vec<(String, u32)>>,
    stats_calls: Mutex<Vec<String>>,
    page_calls: AtomicUsize,
}

impl MockPlatform {
    pub(crate) fn with_search(mut self, hits: Vec<SearchHit>) -> Self {
        self.search = Some(Ok(hits));
        self
    }

    pub(crate) fn with_search_error(mut self, err: PlatformError) -> Self {
        self.search = Some(Err(err));
        self
    }

    pub(crate) fn with_stats(mut self, video_id: &str, stats: VideoStats) -> Self {
        self.stats.insert(video_id.to_string(), Ok(stats));
        self
    }

    pub(crate) fn with_stats_error(mut self, video_id: &str, err: PlatformError) -> Self {
        self.stats.insert(video_id.to_string(), Err(err));
        self
    }

    pub(crate) fn with_page(
        mut self,
        video_id: &str,
        token: Option<&str>,
        page: CommentPage,
    ) -> Self {
        self.pages
            .insert((video_id.to_string(), token.map(ToString::to_string)), Ok(page));
        self
    }

    pub(crate) fn with_page_error(
        mut self,
        video_id: &str,
        token: Option<&str>,
        err: PlatformError,
    ) -> Self {
        self.pages
            .insert((video_id.to_string(), token.map(ToString::to_string)), Err(err));
        self
    }

    pub(crate) fn search_calls(&self) -> Vec<(String, u32)> {
        self.search_calls.lock().unwrap().clone()
    }

    pub(crate) fn stats_calls(&self) -> Vec<String> {
        self.stats_calls.lock().unwrap().clone()
    }

    pub(crate) fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoPlatform for MockPlatform {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, PlatformError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        self.search.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn video_stats(&self, video_id: &str) -> Result<VideoStats, PlatformError> {
        self.stats_calls.lock().unwrap().push(video_id.to_string());
        self.stats
            .get(video_id)
            .cloned()
            .unwrap_or_else(|| Err(PlatformError::Other(format!("no stats for {video_id}"))))
    }

    async fn comment_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(&(video_id.to_string(), page_token.map(ToString::to_string)))
            .cloned()
            .unwrap_or_else(|| Ok(CommentPage::default()))
    }
}

pub(crate) struct MockKeywords(pub Option<KeywordRecord>);

impl MockKeywords {
    pub(crate) fn saved(brand: &str, keywords: &[&str]) -> Self {
        Self(Some(KeywordRecord {
            brand: brand.to_string(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
            created_at: Utc::now(),
        }))
    }
}

#[async_trait]
impl KeywordStore for MockKeywords {
    async fn latest(&self) -> Result<Option<KeywordRecord>, IngestError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub(crate) struct MockPersistence {
    pub inserted: Mutex<BTreeMap<Bucket, Vec<CommentRecord>>>,
    pub opened: Mutex<Vec<RunStart>>,
    pub completed: Mutex<Vec<RunSummary>>,
    pub failed: Mutex<Vec<String>>,
    fail_bucket: Option<Bucket>,
}

impl MockPersistence {
    pub(crate) fn failing_on(bucket: Bucket) -> Self {
        Self {
            fail_bucket: Some(bucket),
            ..Self::default()
        }
    }

    pub(crate) fn rows(&self, bucket: Bucket) -> Vec<CommentRecord> {
        self.inserted
            .lock()
            .unwrap()
            .get(&bucket)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Persistence for MockPersistence {
    async fn bulk_insert(
        &self,
        bucket: Bucket,
        records: &[CommentRecord],
    ) -> Result<u64, IngestError> {
        if self.fail_bucket == Some(bucket) {
            return Err(IngestError::Persistence(format!("{bucket} insert refused")));
        }
        self.inserted
            .lock()
            .unwrap()
            .entry(bucket)
            .or_default()
            .extend_from_slice(records);
        Ok(u64::try_from(records.len()).unwrap())
    }

    async fn find_by(&self, brand: &str, scrape_id: &str) -> Result<ScrapeResults, IngestError> {
        let group = |bucket: Bucket| -> Vec<AspectGroup> {
            let mut groups: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
            for record in self.rows(bucket) {
                if record.brand != brand || record.scrape_id.as_str() != scrape_id {
                    continue;
                }
                if let Some(aspect) = record.aspect {
                    groups.entry(aspect.as_str()).or_default().push(record.comment);
                }
            }
            groups
                .into_iter()
                .map(|(aspect, comments)| AspectGroup {
                    aspect: aspect.to_string(),
                    comments,
                })
                .collect()
        };
        Ok(ScrapeResults {
            brand: brand.to_string(),
            scrape_id: scrape_id.to_string(),
            english: group(Bucket::EnglishValid),
            sinhala: group(Bucket::SinhalaValid),
        })
    }

    async fn open_run(&self, run: &RunStart) -> Result<(), IngestError> {
        self.opened.lock().unwrap().push(run.clone());
        Ok(())
    }

    async fn complete_run(
        &self,
        _scrape_id: &ScrapeId,
        summary: &RunSummary,
    ) -> Result<(), IngestError> {
        self.completed.lock().unwrap().push(summary.clone());
        Ok(())
    }

    async fn fail_run(&self, _scrape_id: &ScrapeId, message: &str) -> Result<(), IngestError> {
        self.failed.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub(crate) struct FixedDetector(pub &'static str);

impl LanguageDetector for FixedDetector {
    fn detect(&self, _text: &str) -> Option<String> {
        Some(self.0.to_string())
    }
}

/// Never calls anything garbage and always favours one aspect.
pub(crate) struct FixedClassifier(pub Aspect);

#[async_trait]
impl TextClassifier for FixedClassifier {
    async fn predict(&self, _text: &str) -> Result<Vec<f64>, ClassifierError> {
        let mut probs = vec![0.02; Aspect::COUNT];
        probs[self.0.index()] = 0.9;
        Ok(probs)
    }

    async fn predict_garbage(&self, _text: &str) -> Result<bool, ClassifierError> {
        Ok(false)
    }
}

/// English comments are valid `CustomerSupport`; Sinhala comments are
/// garbage when they contain `garbage_word`, else valid `TrustAndSecurity`.
pub(crate) fn classifier(garbage_word: &str) -> Arc<CommentClassifier> {
    let lexicon = LexiconStore::from_parts(
        vec![garbage_word.to_string()],
        Vec::<(Aspect, Vec<String>)>::new(),
        Vec::<String>::new(),
    );
    Arc::new(
        CommentClassifier::new(
            Arc::new(lexicon),
            Arc::new(FixedClassifier(Aspect::CustomerSupport)),
            Arc::new(FixedClassifier(Aspect::TrustAndSecurity)),
        )
        .with_detector(Arc::new(FixedDetector("en"))),
    )
}
