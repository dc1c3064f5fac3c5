use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Aspect;

/// Dominant language of a comment, as decided by the language router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Si,
    Ta,
    Other,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Si => "si",
            Language::Ta => "ta",
            Language::Other => "other",
        }
    }

    /// Map a raw detector code onto the routed set. Anything outside
    /// `en`/`si`/`ta` becomes [`Language::Other`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Language::En,
            "si" => Language::Si,
            "ta" => Language::Ta,
            _ => Language::Other,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Valid,
    Garbage,
    Skip,
}

/// A top-level comment harvested from a video. Never persisted raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub like_count: u64,
}

/// One candidate video from a platform search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub description: String,
}

/// One page of top-level comments and the cursor for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub next_page_token: Option<String>,
}

/// Extended statistics fetched for an accepted video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoStats {
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub comment_count: Option<u64>,
    pub published_at: Option<DateTime<Utc>>,
    pub description: String,
}

/// A keyword-matching video accepted by discovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub stats: VideoStats,
    pub hashtags: Vec<String>,
    pub keyword_hits: usize,
}

/// Scores recorded for a Sinhala comment resolved through lexicon fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub model_score: f64,
    pub lexicon_score: f64,
    /// Weighted combination, in `[0, 1]`.
    pub final_score: f64,
}

/// The classification outcome for one distinct comment.
///
/// Constructed only through [`ClassifiedComment::valid`],
/// [`ClassifiedComment::garbage`] and [`ClassifiedComment::skip`], so a
/// valid comment always carries an aspect and the other labels never do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedComment {
    cleaned_text: String,
    language: Language,
    label: Label,
    aspect: Option<Aspect>,
    scores: Option<Scores>,
}

impl ClassifiedComment {
    #[must_use]
    pub fn valid(
        cleaned_text: impl Into<String>,
        language: Language,
        aspect: Aspect,
        scores: Option<Scores>,
    ) -> Self {
        Self {
            cleaned_text: cleaned_text.into(),
            language,
            label: Label::Valid,
            aspect: Some(aspect),
            scores,
        }
    }

    #[must_use]
    pub fn garbage(cleaned_text: impl Into<String>, language: Language) -> Self {
        Self {
            cleaned_text: cleaned_text.into(),
            language,
            label: Label::Garbage,
            aspect: None,
            scores: None,
        }
    }

    #[must_use]
    pub fn skip(cleaned_text: impl Into<String>, language: Language) -> Self {
        Self {
            cleaned_text: cleaned_text.into(),
            language,
            label: Label::Skip,
            aspect: None,
            scores: None,
        }
    }

    #[must_use]
    pub fn cleaned_text(&self) -> &str {
        &self.cleaned_text
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    #[must_use]
    pub fn aspect(&self) -> Option<Aspect> {
        self.aspect
    }

    #[must_use]
    pub fn scores(&self) -> Option<Scores> {
        self.scores
    }

    /// The persistence bucket this comment belongs to, or `None` for skips
    /// and languages that are never persisted.
    #[must_use]
    pub fn bucket(&self) -> Option<Bucket> {
        Bucket::for_outcome(self.language, self.label)
    }
}

/// The four partitions a run's classified comments are persisted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    EnglishValid,
    SinhalaValid,
    EnglishGarbage,
    SinhalaGarbage,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::EnglishValid,
        Bucket::SinhalaValid,
        Bucket::EnglishGarbage,
        Bucket::SinhalaGarbage,
    ];

    #[must_use]
    pub fn for_outcome(language: Language, label: Label) -> Option<Self> {
        match (language, label) {
            (Language::En, Label::Valid) => Some(Bucket::EnglishValid),
            (Language::Si, Label::Valid) => Some(Bucket::SinhalaValid),
            (Language::En, Label::Garbage) => Some(Bucket::EnglishGarbage),
            (Language::Si, Label::Garbage) => Some(Bucket::SinhalaGarbage),
            _ => None,
        }
    }

    #[must_use]
    pub fn language(self) -> Language {
        match self {
            Bucket::EnglishValid | Bucket::EnglishGarbage => Language::En,
            Bucket::SinhalaValid | Bucket::SinhalaGarbage => Language::Si,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        matches!(self, Bucket::EnglishValid | Bucket::SinhalaValid)
    }

    /// Backing table name. Static so it can be spliced into SQL safely.
    #[must_use]
    pub fn table_name(self) -> &'static str {
        match self {
            Bucket::EnglishValid => "english_aspects",
            Bucket::SinhalaValid => "sinhala_aspects",
            Bucket::EnglishGarbage => "english_garbage",
            Bucket::SinhalaGarbage => "sinhala_garbage",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Unique token grouping every record produced by one ingestion run.
///
/// Minted from the run's start time with microsecond precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrapeId(String);

const SCRAPE_ID_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

impl ScrapeId {
    #[must_use]
    pub fn mint(started_at: DateTime<Utc>) -> Self {
        Self(started_at.format(SCRAPE_ID_FORMAT).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compact `YYYYMMDD_HHMMSS_ffffff` form used in snapshot file names.
    /// Keeps the microseconds so two runs never share a suffix.
    ///
    /// Ids that were not minted by [`ScrapeId::mint`] fall back to their
    /// alphanumeric characters.
    #[must_use]
    pub fn file_suffix(&self) -> String {
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f").map_or_else(
            |_| self.0.chars().filter(char::is_ascii_alphanumeric).collect(),
            |dt| dt.format("%Y%m%d_%H%M%S_%6f").to_string(),
        )
    }
}

impl From<String> for ScrapeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ScrapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted row of a bucket table.
///
/// `comment` is the emoji-stripped original text. Scores are present only
/// for Sinhala valid comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub scrape_id: ScrapeId,
    pub brand: String,
    pub trigger_keywords: Vec<String>,
    pub comment: String,
    pub aspect: Option<Aspect>,
    pub published_at: DateTime<Utc>,
    pub scores: Option<Scores>,
}

/// The most recently saved brand/keyword combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRecord {
    pub brand: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-run counts, returned once when a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub brand: String,
    pub keywords: Vec<String>,
    pub scrape_id: ScrapeId,
    pub english_aspects: usize,
    pub sinhala_aspects: usize,
    pub english_garbage: usize,
    pub sinhala_garbage: usize,
    pub skipped_languages: BTreeMap<Language, usize>,
    /// Set when cancellation stopped the run before every video was processed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}
