//! ONNX vision backend using Candle.
//!
//! Image classification models exported to ONNX run through the pure Rust
//! Candle runtime. Compiled only with the `onnx` feature; without it,
//! [`load_onnx_backend`] reports that support is missing.

#[cfg(feature = "onnx")]
mod classifier;
mod preprocess;

#[cfg(feature = "onnx")]
pub use classifier::OnnxVisionBackend;
pub use preprocess::{fit, ImagePreprocessor};

use std::sync::Arc;

use crate::engine::{BackendError, ClassificationObservation, VisionBackend};
use crate::models::ModelPath;

/// Configuration for ONNX model loading.
#[derive(Debug, Clone)]
pub struct OnnxConfig {
    pub model_id: String,
    pub preprocessor: ImagePreprocessor,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            model_id: "flower-classifier".to_string(),
            preprocessor: ImagePreprocessor::default(),
        }
    }
}

/// Load an ONNX classification model and its labels as a vision backend.
#[cfg(feature = "onnx")]
pub fn load_onnx_backend(
    model_path: &ModelPath,
    labels: Vec<String>,
    config: &OnnxConfig,
) -> Result<Arc<dyn VisionBackend>, BackendError> {
    let backend = OnnxVisionBackend::load(model_path, labels, config)?;
    Ok(Arc::new(backend))
}

/// Stub for builds without the `onnx` feature.
#[cfg(not(feature = "onnx"))]
pub fn load_onnx_backend(
    _model_path: &ModelPath,
    _labels: Vec<String>,
    _config: &OnnxConfig,
) -> Result<Arc<dyn VisionBackend>, BackendError> {
    Err(BackendError::ModelNotLoaded(
        "ONNX support not compiled in. Enable 'onnx' feature.".into(),
    ))
}

/// Turn raw model scores into labelled observations, highest first.
///
/// Scores that are not already a probability distribution are softmaxed.
pub fn scores_to_observations(scores: &[f32], labels: &[String]) -> Vec<ClassificationObservation> {
    let probabilities = if is_distribution(scores) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    let mut observations: Vec<_> = labels
        .iter()
        .zip(probabilities)
        .map(|(label, p)| ClassificationObservation::new(label.clone(), p))
        .collect();
    observations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    observations
}

fn is_distribution(scores: &[f32]) -> bool {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    in_range && (sum - 1.0).abs() < 1e-3
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
