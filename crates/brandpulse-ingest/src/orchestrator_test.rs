use std::sync::Arc;

use brandpulse_core::{Aspect, Bucket, CommentPage, Language, SearchHit, VideoStats};
use chrono::{TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::error::PlatformError;
use crate::testing::{classifier, comment, MockKeywords, MockPersistence, MockPlatform};

const SI_GARBAGE: &str = "සබ්ස්ක්‍රයිබ්";

fn january() -> IngestionRequest {
    IngestionRequest::parse("2024-01-01", "2024-01-31").unwrap()
}

fn hit(id: &str, title: &str) -> SearchHit {
    SearchHit {
        video_id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
    }
}

fn page(comments: Vec<Comment>) -> CommentPage {
    CommentPage {
        comments,
        next_page_token: None,
    }
}

fn orchestrator(
    platform: MockPlatform,
    keywords: MockKeywords,
    store: &Arc<MockPersistence>,
    settings: IngestSettings,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(platform),
        Arc::new(keywords),
        Arc::clone(store) as Arc<dyn Persistence>,
        classifier(SI_GARBAGE),
        settings,
    )
}

/// One accepted video whose only page holds `comments`.
fn single_video(comments: Vec<Comment>) -> MockPlatform {
    MockPlatform::default()
        .with_search(vec![hit("vid-1", "Savings account tips")])
        .with_stats("vid-1", VideoStats::default())
        .with_page("vid-1", None, page(comments))
}

#[tokio::test]
async fn end_to_end_buckets_one_english_and_one_sinhala_garbage() {
    let platform = single_video(vec![
        comment("c1", "The savings account app is great 👍", "2024-01-10"),
        comment("c2", &format!("{SI_GARBAGE} කරන්න"), "2024-01-15"),
        comment("c3", "Lovely service", "2024-02-05"),
    ]);
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings", "account"]),
        &store,
        IngestSettings::default(),
    );

    let outcome = orch.ingest(&january(), &CancellationToken::new()).await;

    let IngestOutcome::Success(summary) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(summary.brand, "Acme");
    assert_eq!(summary.keywords, vec!["savings", "account"]);
    assert_eq!(summary.english_aspects, 1);
    assert_eq!(summary.sinhala_garbage, 1);
    assert_eq!(summary.sinhala_aspects, 0);
    assert_eq!(summary.english_garbage, 0);
    assert!(summary.skipped_languages.is_empty());
    assert!(!summary.cancelled);

    let english = store.rows(Bucket::EnglishValid);
    assert_eq!(english.len(), 1);
    assert_eq!(english[0].comment, "The savings account app is great ");
    assert_eq!(english[0].aspect, Some(Aspect::CustomerSupport));
    assert_eq!(english[0].brand, "Acme");
    assert_eq!(english[0].scrape_id, summary.scrape_id);
    assert_eq!(english[0].trigger_keywords, vec!["savings", "account"]);

    let garbage = store.rows(Bucket::SinhalaGarbage);
    assert_eq!(garbage.len(), 1);
    assert_eq!(garbage[0].aspect, None);
    assert_eq!(garbage[0].scores, None);

    let opened = store.opened.lock().unwrap().clone();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].scrape_id, summary.scrape_id);
    assert_eq!(store.completed.lock().unwrap().len(), 1);
    assert!(store.failed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_comments_are_classified_once() {
    let platform = single_video(vec![
        comment("c1", "Great support team", "2024-01-10"),
        comment("c2", "  great SUPPORT team 🙂", "2024-01-11"),
        comment("c3", "Great support team", "2024-01-12"),
    ]);
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();

    assert_eq!(summary.english_aspects, 1);
    assert!(summary.skipped_languages.is_empty());
    assert_eq!(store.rows(Bucket::EnglishValid)[0].comment, "Great support team");
}

#[tokio::test]
async fn tamil_and_empty_comments_are_counted_as_skips() {
    let platform = single_video(vec![
        comment("c1", "வங்கி சேவை நன்றாக உள்ளது", "2024-01-10"),
        comment("c2", "🙏🙏", "2024-01-10"),
        comment("c3", "sinhala valid නියමයි", "2024-01-10"),
    ]);
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();

    assert_eq!(summary.skipped_languages.get(&Language::Ta), Some(&1));
    assert_eq!(summary.skipped_languages.get(&Language::Other), Some(&1));
    assert_eq!(summary.sinhala_aspects, 1);

    let sinhala = store.rows(Bucket::SinhalaValid);
    assert_eq!(sinhala[0].aspect, Some(Aspect::TrustAndSecurity));
    assert!(sinhala[0].scores.is_some());
}

#[tokio::test]
async fn end_date_includes_the_whole_day() {
    let platform = single_video(vec![
        comment("c1", "first day", "2024-01-01"),
        comment("c2", "last day", "2024-01-31"),
        comment("c3", "day before", "2023-12-31"),
    ]);
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();
    assert_eq!(summary.english_aspects, 2);
}

#[tokio::test]
async fn failed_harvest_skips_only_that_video() {
    let platform = MockPlatform::default()
        .with_search(vec![hit("bad", "savings one"), hit("good", "savings two")])
        .with_stats("bad", VideoStats::default())
        .with_stats("good", VideoStats::default())
        .with_page_error("bad", None, PlatformError::QuotaOrAuth("quota".to_string()))
        .with_page("good", None, page(vec![comment("c1", "works fine", "2024-01-05")]));
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();
    assert_eq!(summary.english_aspects, 1);
}

#[tokio::test]
async fn missing_keyword_record_fails_without_opening_a_run() {
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        MockPlatform::default(),
        MockKeywords(None),
        &store,
        IngestSettings::default(),
    );

    let outcome = orch.ingest(&january(), &CancellationToken::new()).await;

    assert!(
        matches!(outcome, IngestOutcome::Error { ref message } if message.contains("no saved keyword")),
        "got {outcome:?}"
    );
    assert!(store.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_keywords_are_a_validation_error() {
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        MockPlatform::default(),
        MockKeywords::saved("Acme", &[]),
        &store,
        IngestSettings::default(),
    );

    let err = orch
        .run(&january(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Validation(_)));
}

#[test]
fn reversed_or_malformed_dates_are_rejected() {
    assert!(matches!(
        IngestionRequest::parse("2024-02-01", "2024-01-01"),
        Err(IngestError::Validation(_))
    ));
    assert!(matches!(
        IngestionRequest::parse("2024/01/01", "2024-01-31"),
        Err(IngestError::Validation(_))
    ));
    assert!(IngestionRequest::parse("2024-01-01", "2024-01-01").is_ok());
}

#[test]
fn request_window_compares_calendar_days() {
    let req = january();
    assert!(req.contains(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
    assert!(!req.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
}

#[tokio::test]
async fn search_quota_error_fails_the_run() {
    let platform = MockPlatform::default()
        .with_search_error(PlatformError::QuotaOrAuth("daily limit".to_string()));
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let outcome = orch.ingest(&january(), &CancellationToken::new()).await;

    let IngestOutcome::Error { message } = outcome else {
        panic!("expected error, got {outcome:?}");
    };
    assert!(message.contains("upstream quota"));
    assert_eq!(store.opened.lock().unwrap().len(), 1);
    assert_eq!(store.failed.lock().unwrap().len(), 1);
    assert!(store.completed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn persistence_failure_keeps_earlier_buckets() {
    let platform = single_video(vec![
        comment("c1", "english one", "2024-01-10"),
        comment("c2", &format!("{SI_GARBAGE} ලයික්"), "2024-01-10"),
    ]);
    let store = Arc::new(MockPersistence::failing_on(Bucket::SinhalaGarbage));
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let err = orch
        .run(&january(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Persistence(_)));
    assert_eq!(store.rows(Bucket::EnglishValid).len(), 1);
    assert_eq!(store.failed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_run_skips_videos_and_still_completes() {
    let platform = single_video(vec![comment("c1", "never seen", "2024-01-10")]);
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let summary = orch.run(&january(), &cancel).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.english_aspects, 0);
    assert!(store.inserted.lock().unwrap().is_empty());
    assert_eq!(store.completed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_videos_share_one_dedup_set() {
    let mut platform = MockPlatform::default().with_search(vec![
        hit("a", "savings a"),
        hit("b", "savings b"),
        hit("c", "savings c"),
    ]);
    for id in ["a", "b", "c"] {
        platform = platform.with_stats(id, VideoStats::default()).with_page(
            id,
            None,
            page(vec![
                comment(&format!("{id}-1"), "shared comment text", "2024-01-10"),
                comment(&format!("{id}-2"), &format!("unique comment {id}"), "2024-01-10"),
            ]),
        );
    }
    let store = Arc::new(MockPersistence::default());
    let settings = IngestSettings {
        max_concurrent_videos: 4,
        ..IngestSettings::default()
    };
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        settings,
    );

    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();
    assert_eq!(summary.english_aspects, 4);
}

#[tokio::test]
async fn snapshots_are_written_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let platform = single_video(vec![comment("c1", "snapshot me", "2024-01-10")]);
    let store = Arc::new(MockPersistence::default());
    let settings = IngestSettings {
        snapshot_dir: Some(dir.path().to_path_buf()),
        ..IngestSettings::default()
    };
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        settings,
    );

    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();

    let expected = dir.path().join(format!(
        "aspect_classification/English/english_aspects_{}.csv",
        summary.scrape_id.file_suffix()
    ));
    assert!(expected.exists(), "missing {}", expected.display());
}

#[tokio::test]
async fn results_lookup_groups_by_aspect() {
    let platform = single_video(vec![
        comment("c1", "first english", "2024-01-10"),
        comment("c2", "second english", "2024-01-11"),
    ]);
    let store = Arc::new(MockPersistence::default());
    let orch = orchestrator(
        platform,
        MockKeywords::saved("Acme", &["savings"]),
        &store,
        IngestSettings::default(),
    );
    let summary = orch.run(&january(), &CancellationToken::new()).await.unwrap();

    let results = store
        .find_by("Acme", summary.scrape_id.as_str())
        .await
        .unwrap();

    assert_eq!(results.english.len(), 1);
    assert_eq!(results.english[0].aspect, Aspect::CustomerSupport.as_str());
    assert_eq!(
        results.english[0].comments,
        vec!["first english", "second english"]
    );
    assert!(results.sinhala.is_empty());
}

#[test]
fn outcome_serializes_with_status_tag() {
    let error = IngestOutcome::Error {
        message: "boom".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&error).unwrap(),
        serde_json::json!({ "status": "error", "message": "boom" })
    );

    let success = IngestOutcome::Success(RunSummary {
        brand: "Acme".to_string(),
        keywords: vec!["savings".to_string()],
        scrape_id: ScrapeId::from("2024-01-01T00:00:00.000000".to_string()),
        english_aspects: 1,
        sinhala_aspects: 0,
        english_garbage: 0,
        sinhala_garbage: 0,
        skipped_languages: std::collections::BTreeMap::new(),
        cancelled: false,
    });
    let json = serde_json::to_value(&success).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["english_aspects"], 1);
}

#[test]
fn state_machine_only_moves_forward_or_fails() {
    assert!(RunState::Idle.can_advance_to(RunState::Discovering));
    assert!(RunState::Persisting.can_advance_to(RunState::Done));
    assert!(RunState::Harvesting.can_advance_to(RunState::Failed));
    assert!(!RunState::Idle.can_advance_to(RunState::Classifying));
    assert!(!RunState::Classifying.can_advance_to(RunState::Harvesting));
    assert!(!RunState::Done.can_advance_to(RunState::Failed));
    assert!(!RunState::Failed.can_advance_to(RunState::Idle));
}

#[test]
fn default_settings_disable_snapshots() {
    let settings = IngestSettings::default();
    assert_eq!(settings.max_comments_per_video, 200);
    assert_eq!(settings.max_concurrent_videos, 1);
    assert!(settings.snapshot_dir.is_none());
}
