//! Classification engine.
//!
//! Builds classification requests, runs them against a [`VisionBackend`],
//! and turns raw observations into display-ready predictions.

pub mod backend;
pub mod error;
pub mod onnx;
pub mod request;

mod classifier;
mod model;
mod pending;

pub use backend::{ClassificationObservation, VisionBackend, VisionOutput};
pub use classifier::{ImageClassifier, PredictionTicket};
pub use error::{BackendError, ClassifyError};
pub use model::{ClassifierModel, SharedModel};
pub use pending::{PendingRequest, PredictionHandler, QueuedRequest};
pub use request::{ClassificationRequest, CropAndScale, Outcome, RequestId, RequestState};

// Backend re-exports
pub use onnx::{load_onnx_backend, ImagePreprocessor, OnnxConfig};
