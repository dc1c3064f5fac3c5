use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Weights and thresholds for Sinhala aspect fusion and video acceptance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionConfig {
    pub model_weight: f64,
    pub lexicon_weight: f64,
    /// Downgrade to `Others` when the chosen aspect's model probability is below this...
    pub downgrade_model_threshold: f64,
    /// ...and its normalized lexicon score is below this.
    pub downgrade_lexicon_threshold: f64,
    /// Minimum share of keywords a video must mention to be accepted.
    pub keyword_match_ratio: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            model_weight: 0.7,
            lexicon_weight: 0.3,
            downgrade_model_threshold: 0.4,
            downgrade_lexicon_threshold: 0.1,
            keyword_match_ratio: 0.3,
        }
    }
}

/// Where the lexicon store reads its word lists from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconPaths {
    pub sinhala_garbage: PathBuf,
    pub sinhala_aspects: PathBuf,
    pub english_words: PathBuf,
    /// Load an empty lexicon instead of failing when a file is absent.
    pub allow_empty: bool,
}

/// Inference endpoints for the four classifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierEndpoints {
    pub english_garbage: String,
    pub english_aspect: String,
    pub sinhala_garbage: String,
    pub sinhala_aspect: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub youtube_api_keys: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_search_results: u32,
    pub max_comments_per_video: usize,
    pub max_concurrent_videos: usize,
    pub snapshot_dir: PathBuf,
    pub lexicon: LexiconPaths,
    pub classifiers: ClassifierEndpoints,
    pub fusion: FusionConfig,
    pub phrase_override: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "youtube_api_keys",
                &format!("[{} redacted]", self.youtube_api_keys.len()),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_search_results", &self.max_search_results)
            .field("max_comments_per_video", &self.max_comments_per_video)
            .field("max_concurrent_videos", &self.max_concurrent_videos)
            .field("snapshot_dir", &self.snapshot_dir)
            .field("lexicon", &self.lexicon)
            .field("classifiers", &self.classifiers)
            .field("fusion", &self.fusion)
            .field("phrase_override", &self.phrase_override)
            .finish()
    }
}
