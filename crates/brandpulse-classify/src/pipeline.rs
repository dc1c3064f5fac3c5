//! Per-comment classification: route, filter, resolve.

use std::sync::Arc;

use brandpulse_core::{Aspect, ClassifiedComment, FusionConfig, Language};

use crate::aspect::{
    checked_probabilities, fuse_sinhala, matches_override_phrase, resolve_english,
};
use crate::classifier::TextClassifier;
use crate::error::ClassifierError;
use crate::garbage::{filter_english, filter_sinhala, GarbageVerdict};
use crate::language::{route, LanguageDetector, WhatlangDetector};
use crate::lexicon::LexiconStore;

/// Classifies cleaned comment text into a [`ClassifiedComment`].
///
/// Holds no per-run state: the same text always yields the same outcome
/// for the same classifier answers. Deduplication belongs to the caller.
pub struct CommentClassifier {
    lexicon: Arc<LexiconStore>,
    detector: Arc<dyn LanguageDetector>,
    english: Arc<dyn TextClassifier>,
    sinhala: Arc<dyn TextClassifier>,
    fusion: FusionConfig,
    phrase_override: bool,
}

impl CommentClassifier {
    /// A classifier with the `whatlang` detector, default fusion settings,
    /// and the phrase override enabled.
    #[must_use]
    pub fn new(
        lexicon: Arc<LexiconStore>,
        english: Arc<dyn TextClassifier>,
        sinhala: Arc<dyn TextClassifier>,
    ) -> Self {
        Self {
            lexicon,
            detector: Arc::new(WhatlangDetector),
            english,
            sinhala,
            fusion: FusionConfig::default(),
            phrase_override: true,
        }
    }

    #[must_use]
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    #[must_use]
    pub fn with_phrase_override(mut self, enabled: bool) -> Self {
        self.phrase_override = enabled;
        self
    }

    #[must_use]
    pub fn route(&self, cleaned: &str) -> Language {
        route(cleaned, &self.lexicon, self.detector.as_ref())
    }

    /// Classify one cleaned comment.
    ///
    /// Tamil and unsupported languages are skipped. A classifier failure is
    /// logged and the comment is skipped under its routed language.
    pub async fn classify(&self, cleaned: &str) -> ClassifiedComment {
        let language = self.route(cleaned);
        let result = match language {
            Language::En => self.classify_english(cleaned).await,
            Language::Si => self.classify_sinhala(cleaned).await,
            Language::Ta | Language::Other => return ClassifiedComment::skip(cleaned, language),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(language = %language, error = %e, "classifier failed; skipping comment");
            ClassifiedComment::skip(cleaned, language)
        })
    }

    async fn classify_english(&self, cleaned: &str) -> Result<ClassifiedComment, ClassifierError> {
        if filter_english(cleaned, self.english.as_ref())
            .await?
            .is_garbage()
        {
            return Ok(ClassifiedComment::garbage(cleaned, Language::En));
        }

        let probs = checked_probabilities("en", &self.english.predict(cleaned).await?)?;
        let mut aspect = resolve_english(&probs);
        if self.phrase_override && matches_override_phrase(cleaned) {
            aspect = Aspect::DigitalBankingExperience;
        }
        Ok(ClassifiedComment::valid(cleaned, Language::En, aspect, None))
    }

    async fn classify_sinhala(&self, cleaned: &str) -> Result<ClassifiedComment, ClassifierError> {
        let verdict = filter_sinhala(cleaned, &self.lexicon, self.sinhala.as_ref()).await?;
        if let GarbageVerdict::Garbage(reason) = verdict {
            tracing::debug!(?reason, "sinhala comment rejected as garbage");
            return Ok(ClassifiedComment::garbage(cleaned, Language::Si));
        }

        let probs = checked_probabilities("si", &self.sinhala.predict(cleaned).await?)?;
        let hits = self.lexicon.aspect_hits(cleaned);
        let fused = fuse_sinhala(&probs, &hits, &self.fusion);
        Ok(ClassifiedComment::valid(
            cleaned,
            Language::Si,
            fused.aspect,
            Some(fused.scores),
        ))
    }
}
