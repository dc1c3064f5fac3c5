//! Noise rejection ahead of aspect resolution.

use std::sync::LazyLock;

use regex::Regex;

use crate::classifier::TextClassifier;
use crate::error::ClassifierError;
use crate::lexicon::LexiconStore;

/// Sinhala comments shorter than this many characters are garbage.
const MIN_SINHALA_CHARS: usize = 3;

static SYMBOLS_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w\s]+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GarbageReason {
    /// A Sinhala garbage-lexicon word occurs in the comment.
    LexiconMatch(String),
    TooShort,
    SymbolsOnly,
    /// The garbage classifier voted noise.
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GarbageVerdict {
    Valid,
    Garbage(GarbageReason),
}

impl GarbageVerdict {
    #[must_use]
    pub fn is_garbage(&self) -> bool {
        matches!(self, GarbageVerdict::Garbage(_))
    }
}

/// English comments go straight to the garbage classifier.
///
/// # Errors
///
/// Propagates the classifier's [`ClassifierError`].
pub async fn filter_english(
    text: &str,
    classifier: &dyn TextClassifier,
) -> Result<GarbageVerdict, ClassifierError> {
    Ok(if classifier.predict_garbage(text).await? {
        GarbageVerdict::Garbage(GarbageReason::Model)
    } else {
        GarbageVerdict::Valid
    })
}

/// Sinhala comments run the lexicon and shape rules first; the classifier is
/// only consulted when none of them fire.
///
/// # Errors
///
/// Propagates the classifier's [`ClassifierError`].
pub async fn filter_sinhala(
    text: &str,
    lexicon: &LexiconStore,
    classifier: &dyn TextClassifier,
) -> Result<GarbageVerdict, ClassifierError> {
    if let Some(reason) = sinhala_rule_verdict(text, lexicon) {
        return Ok(GarbageVerdict::Garbage(reason));
    }
    filter_english(text, classifier).await
}

/// The rule-based Sinhala checks, in order: lexicon substring, length,
/// symbols-only. `None` means the classifier has to decide.
#[must_use]
pub fn sinhala_rule_verdict(text: &str, lexicon: &LexiconStore) -> Option<GarbageReason> {
    let cleaned = text.trim().to_lowercase();
    if let Some(word) = lexicon.garbage_match(&cleaned) {
        return Some(GarbageReason::LexiconMatch(word.to_string()));
    }
    if cleaned.chars().count() < MIN_SINHALA_CHARS {
        return Some(GarbageReason::TooShort);
    }
    if SYMBOLS_ONLY_RE.is_match(&cleaned) {
        return Some(GarbageReason::SymbolsOnly);
    }
    None
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct GarbageModel(bool);

    #[async_trait]
    impl TextClassifier for GarbageModel {
        async fn predict(&self, _text: &str) -> Result<Vec<f64>, ClassifierError> {
            Ok(vec![0.0; 6])
        }

        async fn predict_garbage(&self, _text: &str) -> Result<bool, ClassifierError> {
            Ok(self.0)
        }
    }

    fn lexicon() -> LexiconStore {
        LexiconStore::from_parts(
            vec!["subscribe".to_string(), "ලයික්".to_string()],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn lexicon_match_comes_first() {
        assert_eq!(
            sinhala_rule_verdict("ලයික් කරන්න", &lexicon()),
            Some(GarbageReason::LexiconMatch("ලයික්".to_string()))
        );
    }

    #[test]
    fn short_and_symbol_only_text_is_garbage() {
        let lexicon = LexiconStore::empty();
        assert_eq!(
            sinhala_rule_verdict("හා", &lexicon),
            Some(GarbageReason::TooShort)
        );
        assert_eq!(
            sinhala_rule_verdict("!!!???", &lexicon),
            Some(GarbageReason::SymbolsOnly)
        );
        assert_eq!(sinhala_rule_verdict("ණය ගන්න පුළුවන්ද", &lexicon), None);
    }

    #[tokio::test]
    async fn sinhala_rules_short_circuit_the_model() {
        let verdict = filter_sinhala("subscribe pls", &lexicon(), &GarbageModel(false))
            .await
            .unwrap();
        assert_eq!(
            verdict,
            GarbageVerdict::Garbage(GarbageReason::LexiconMatch("subscribe".to_string()))
        );
    }

    #[tokio::test]
    async fn sinhala_falls_back_to_model() {
        let text = "ණය ගන්න පුළුවන්ද";
        let garbage = filter_sinhala(text, &lexicon(), &GarbageModel(true)).await.unwrap();
        let valid = filter_sinhala(text, &lexicon(), &GarbageModel(false)).await.unwrap();
        assert_eq!(garbage, GarbageVerdict::Garbage(GarbageReason::Model));
        assert_eq!(valid, GarbageVerdict::Valid);
    }

    #[tokio::test]
    async fn english_uses_model_only() {
        let verdict = filter_english("ok", &GarbageModel(false)).await.unwrap();
        assert!(!verdict.is_garbage());
    }
}
