//! HTTP adapter for sequence-classification models served by a text
//! embeddings inference (TEI) server.
//!
//! Each model is served on its own endpoint. `POST {endpoint}/predict` with
//! `{"inputs": text}` answers with one `{label, score}` entry per class.

use std::time::Duration;

use async_trait::async_trait;
use brandpulse_core::Aspect;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::classifier::TextClassifier;
use crate::error::ClassifierError;

/// Garbage models put the noise class at label 0.
const GARBAGE_LABELS: &[&str] = &["label_0", "garbage"];
const VALID_LABELS: &[&str] = &["label_1", "valid"];

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

/// TEI answers a single input with a flat list, but some deployments wrap
/// it in an outer batch list.
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Single(Vec<Prediction>),
    Batch(Vec<Vec<Prediction>>),
}

impl PredictResponse {
    fn into_predictions(self) -> Vec<Prediction> {
        match self {
            PredictResponse::Single(p) => p,
            PredictResponse::Batch(batch) => batch.into_iter().next().unwrap_or_default(),
        }
    }
}

/// A garbage model and an aspect model for one language.
pub struct TeiClassifier {
    client: Client,
    garbage_url: String,
    aspect_url: String,
}

impl TeiClassifier {
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        garbage_endpoint: &str,
        aspect_endpoint: &str,
        timeout_secs: u64,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            garbage_url: predict_url(garbage_endpoint),
            aspect_url: predict_url(aspect_endpoint),
        })
    }

    async fn call(&self, url: &str, text: &str) -> Result<Vec<Prediction>, ClassifierError> {
        let response = self
            .client
            .post(url)
            .json(&PredictRequest { inputs: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: PredictResponse =
            response
                .json()
                .await
                .map_err(|e| ClassifierError::Response {
                    endpoint: url.to_string(),
                    reason: e.to_string(),
                })?;
        let predictions = parsed.into_predictions();
        if predictions.is_empty() {
            return Err(ClassifierError::Response {
                endpoint: url.to_string(),
                reason: "empty prediction list".to_string(),
            });
        }
        Ok(predictions)
    }
}

#[async_trait]
impl TextClassifier for TeiClassifier {
    async fn predict(&self, text: &str) -> Result<Vec<f64>, ClassifierError> {
        let predictions = self.call(&self.aspect_url, text).await?;

        let mut probs = vec![0.0; Aspect::COUNT];
        let mut seen = [false; Aspect::COUNT];
        for p in &predictions {
            match Aspect::from_label(&p.label) {
                Ok(aspect) => {
                    probs[aspect.index()] = p.score;
                    seen[aspect.index()] = true;
                }
                Err(e) => {
                    tracing::debug!(endpoint = %self.aspect_url, error = %e, "ignoring label");
                }
            }
        }
        let mapped = seen.iter().filter(|s| **s).count();
        if mapped != Aspect::COUNT {
            return Err(ClassifierError::Response {
                endpoint: self.aspect_url.clone(),
                reason: format!(
                    "expected {} aspect labels in response, got {mapped}",
                    Aspect::COUNT
                ),
            });
        }
        Ok(probs)
    }

    async fn predict_garbage(&self, text: &str) -> Result<bool, ClassifierError> {
        let predictions = self.call(&self.garbage_url, text).await?;
        let top = predictions
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| ClassifierError::Response {
                endpoint: self.garbage_url.clone(),
                reason: "empty prediction list".to_string(),
            })?;

        let label = top.label.to_lowercase();
        if GARBAGE_LABELS.contains(&label.as_str()) {
            Ok(true)
        } else if VALID_LABELS.contains(&label.as_str()) {
            Ok(false)
        } else {
            Err(ClassifierError::Response {
                endpoint: self.garbage_url.clone(),
                reason: format!("unexpected garbage label {:?}", top.label),
            })
        }
    }
}

fn predict_url(endpoint: &str) -> String {
    format!("{}/predict", endpoint.trim_end_matches('/'))
}
