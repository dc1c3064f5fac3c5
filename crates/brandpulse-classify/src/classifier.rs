use async_trait::async_trait;

use crate::error::ClassifierError;

/// An external probabilistic text classifier for one language.
///
/// Implementations are black boxes: the pipeline only sees probabilities
/// over the six aspects and a binary garbage verdict.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Probabilities over the aspects, indexed by
    /// [`Aspect::index`](brandpulse_core::Aspect::index).
    async fn predict(&self, text: &str) -> Result<Vec<f64>, ClassifierError>;

    /// `true` when the garbage model labels `text` as noise.
    async fn predict_garbage(&self, text: &str) -> Result<bool, ClassifierError>;
}
