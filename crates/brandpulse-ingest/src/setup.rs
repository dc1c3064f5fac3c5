//! Startup wiring: builds every collaborator once from [`AppConfig`].

use std::sync::Arc;

use brandpulse_classify::{CommentClassifier, LexiconStore, TeiClassifier};
use brandpulse_core::AppConfig;
use brandpulse_youtube::{KeyPool, YoutubeClient};
use sqlx::PgPool;

use crate::error::IngestError;
use crate::orchestrator::{IngestSettings, Orchestrator};
use crate::store::PgStore;
use crate::traits::KeywordStore;

/// Loads the lexicons, builds the classifier and platform clients, and
/// returns an orchestrator backed by `pool`.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] if a lexicon cannot be loaded, no
/// API key is configured, or an HTTP client cannot be built.
pub fn build_orchestrator(config: &AppConfig, pool: PgPool) -> Result<Orchestrator, IngestError> {
    let configuration = |what: &str, e: &dyn std::fmt::Display| {
        IngestError::Configuration(format!("{what}: {e}"))
    };

    let lexicon = LexiconStore::load(&config.lexicon).map_err(|e| configuration("lexicon", &e))?;

    let keys = KeyPool::new(config.youtube_api_keys.iter().cloned())
        .map_err(|e| configuration("youtube keys", &e))?;
    let platform = YoutubeClient::new(keys, config.request_timeout_secs)
        .map_err(|e| configuration("youtube client", &e))?;

    let english = TeiClassifier::new(
        &config.classifiers.english_garbage,
        &config.classifiers.english_aspect,
        config.request_timeout_secs,
    )
    .map_err(|e| configuration("english classifier", &e))?;
    let sinhala = TeiClassifier::new(
        &config.classifiers.sinhala_garbage,
        &config.classifiers.sinhala_aspect,
        config.request_timeout_secs,
    )
    .map_err(|e| configuration("sinhala classifier", &e))?;

    let classifier =
        CommentClassifier::new(Arc::new(lexicon), Arc::new(english), Arc::new(sinhala))
            .with_fusion(config.fusion)
            .with_phrase_override(config.phrase_override);

    let store = Arc::new(PgStore::new(pool));
    let keywords: Arc<dyn KeywordStore> = store.clone();
    tracing::info!(
        api_keys = config.youtube_api_keys.len(),
        max_concurrent_videos = config.max_concurrent_videos,
        "ingestion collaborators ready"
    );

    Ok(Orchestrator::new(
        Arc::new(platform),
        keywords,
        store,
        Arc::new(classifier),
        IngestSettings::from_app_config(config),
    ))
}
