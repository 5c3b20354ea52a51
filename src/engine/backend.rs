//! Vision backend seam.
//!
//! A backend evaluates one [`ClassificationRequest`] against a compiled model
//! and reports whatever the model produced. Interpreting that output is the
//! classifier's job.

use super::error::BackendError;
use super::request::ClassificationRequest;

/// One raw classification output: a label and its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationObservation {
    pub identifier: String,
    pub confidence: f32,
}

impl ClassificationObservation {
    pub fn new(identifier: impl Into<String>, confidence: f32) -> Self {
        Self {
            identifier: identifier.into(),
            confidence,
        }
    }
}

/// Raw output shapes a vision model can produce.
#[derive(Debug, Clone)]
pub enum VisionOutput {
    /// Labelled observations, sorted by confidence descending.
    Classifications(Vec<ClassificationObservation>),
    /// Unlabelled feature vector (e.g. an embedding head).
    FeatureValues(Vec<f32>),
    /// An image-to-image model's output buffer.
    PixelBuffer { width: u32, height: u32 },
}

impl VisionOutput {
    /// Name of the output shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Classifications(_) => "classifications",
            Self::FeatureValues(_) => "feature_values",
            Self::PixelBuffer { .. } => "pixel_buffer",
        }
    }
}

/// Performs inference for classification requests.
///
/// `Ok(None)` means the backend completed without producing any results.
#[async_trait::async_trait]
pub trait VisionBackend: Send + Sync {
    fn backend_id(&self) -> &str;

    async fn perform(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Option<VisionOutput>, BackendError>;
}
