//! Text formatting for prediction display.

use super::prediction::Prediction;

/// Message shown when a classification produced nothing to display.
pub const NO_PREDICTIONS_MESSAGE: &str = "No predictions. (Check console log.)";

/// Formats classifier output for a single text label.
#[derive(Debug, Clone, Copy)]
pub struct PredictionPresenter {
    top_k: usize,
}

impl Default for PredictionPresenter {
    fn default() -> Self {
        Self { top_k: 1 }
    }
}

impl PredictionPresenter {
    /// Show at most `top_k` predictions (floored at 1).
    pub fn new(top_k: usize) -> Self {
        Self { top_k: top_k.max(1) }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// One `"<name> - <confidence>"` line per shown prediction.
    ///
    /// Predictions are expected in descending confidence order.
    pub fn format_lines(&self, predictions: &[Prediction]) -> Vec<String> {
        predictions
            .iter()
            .take(self.top_k)
            .map(|p| format!("{} - {}", p.display_name(), p.confidence))
            .collect()
    }

    /// The full message for a classification result.
    pub fn render(&self, predictions: Option<&[Prediction]>) -> String {
        match predictions {
            Some(predictions) if !predictions.is_empty() => {
                self.format_lines(predictions).join("\n")
            }
            _ => NO_PREDICTIONS_MESSAGE.to_string(),
        }
    }
}
