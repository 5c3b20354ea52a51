//! Display-ready classification predictions.

use serde::Serialize;

use super::confidence::format_confidence;

/// A classification label paired with its formatted confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    /// Raw model label. Multi-name labels are comma separated.
    pub classification: String,
    /// Confidence as a percentage string, without the `%` sign.
    pub confidence: String,
}

impl Prediction {
    pub fn new(classification: impl Into<String>, confidence: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            confidence: confidence.into(),
        }
    }

    /// Build a prediction from a raw label and probability.
    pub fn from_probability(classification: impl Into<String>, probability: f32) -> Self {
        Self::new(classification, format_confidence(probability))
    }

    /// The label up to the first comma.
    pub fn display_name(&self) -> &str {
        match self.classification.split_once(',') {
            Some((name, _)) => name,
            None => &self.classification,
        }
    }
}
