//! Aspect resolution.
//!
//! English comments take the classifier's argmax. Sinhala comments fuse the
//! classifier's probabilities with lexicon keyword hits, then fall back to
//! [`Aspect::Others`] when neither signal is confident.

use brandpulse_core::{Aspect, FusionConfig, Scores};

use crate::error::ClassifierError;

/// Phrases that force a valid English comment into
/// [`Aspect::DigitalBankingExperience`] when the override is enabled.
pub const OVERRIDE_PHRASES: &[&str] = &["can i use", "best app", "how to use"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedAspect {
    pub aspect: Aspect,
    /// Scores of the final aspect (after any downgrade).
    pub scores: Scores,
    pub downgraded: bool,
}

/// Index of the largest value; ties go to the lowest index.
fn argmax(values: &[f64; Aspect::COUNT]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Check a classifier's probability vector: one finite, non-negative value
/// per aspect.
///
/// # Errors
///
/// Returns [`ClassifierError::Response`] naming `source` when the vector has
/// the wrong length or holds a NaN, infinite, or negative value.
pub fn checked_probabilities(
    source: &str,
    probs: &[f64],
) -> Result<[f64; Aspect::COUNT], ClassifierError> {
    let fixed: [f64; Aspect::COUNT] =
        probs.try_into().map_err(|_| ClassifierError::Response {
            endpoint: source.to_string(),
            reason: format!(
                "expected {} aspect probabilities, got {}",
                Aspect::COUNT,
                probs.len()
            ),
        })?;
    if let Some(bad) = fixed.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(ClassifierError::Response {
            endpoint: source.to_string(),
            reason: format!("invalid aspect probability {bad}"),
        });
    }
    Ok(fixed)
}

/// The English classifier's most probable aspect.
#[must_use]
pub fn resolve_english(probs: &[f64; Aspect::COUNT]) -> Aspect {
    Aspect::from_index(argmax(probs)).unwrap_or(Aspect::Others)
}

/// Fuse classifier probabilities with lexicon hit counts.
///
/// Hits are normalized by the largest hit count in the comment (or 1 when
/// there are none). Each aspect scores
/// `model_weight * p + lexicon_weight * lexicon`; the best wins unless its
/// model probability and lexicon score are both under the downgrade
/// thresholds, in which case the comment becomes [`Aspect::Others`].
#[must_use]
pub fn fuse_sinhala(
    model: &[f64; Aspect::COUNT],
    hits: &[usize; Aspect::COUNT],
    config: &FusionConfig,
) -> FusedAspect {

    let max_hits = hits.iter().copied().max().filter(|m| *m > 0).unwrap_or(1);
    let mut lexicon = [0.0; Aspect::COUNT];
    for (slot, h) in lexicon.iter_mut().zip(hits) {
        #[allow(clippy::cast_precision_loss)]
        let normalized = *h as f64 / max_hits as f64;
        *slot = normalized;
    }

    let combined: [f64; Aspect::COUNT] = std::array::from_fn(|i| {
        config.model_weight * model[i] + config.lexicon_weight * lexicon[i]
    });

    let mut chosen = argmax(&combined);
    let downgraded = model[chosen] < config.downgrade_model_threshold
        && lexicon[chosen] < config.downgrade_lexicon_threshold;
    if downgraded {
        chosen = Aspect::Others.index();
    }

    FusedAspect {
        aspect: Aspect::from_index(chosen).unwrap_or(Aspect::Others),
        scores: Scores {
            model_score: model[chosen],
            lexicon_score: lexicon[chosen],
            final_score: combined[chosen].clamp(0.0, 1.0),
        },
        downgraded,
    }
}

/// Whether `text` contains one of [`OVERRIDE_PHRASES`].
#[must_use]
pub fn matches_override_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    OVERRIDE_PHRASES.iter().any(|p| lower.contains(p))
}
