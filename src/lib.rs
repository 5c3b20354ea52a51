//! bloom-core
//!
//! Classifies photos with a pre-trained flower model. A captured image is
//! turned into a classification request, evaluated by a vision backend on a
//! worker task, and the observations come back as display-ready predictions.
//!
//! # Layout
//!
//! - [`vision`]: pure value types (orientation, confidence text, predictions)
//! - [`engine`]: the asynchronous request pipeline and backend seam
//! - [`models`]: model artifact loading and integrity checks
//! - [`telemetry`]: logging, spans, metrics
//! - [`config`]: `BLOOM_*` environment configuration

pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod telemetry;
pub mod vision;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use config::EnvConfig;
use engine::{
    load_onnx_backend, BackendError, ClassifierModel, CropAndScale, ImageClassifier,
    ImagePreprocessor, OnnxConfig, SharedModel,
};
use models::{LoadError, ModelLoader};
use vision::PredictionPresenter;

/// Model and presentation settings for a [`Runtime`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub base_path: PathBuf,
    pub model_path: String,
    pub labels_path: String,
    pub model_sha256: Option<String>,
    pub input_size: u32,
    pub crop_and_scale: CropAndScale,
    pub top_k: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            model_path: config::DEFAULT_MODEL_PATH.to_string(),
            labels_path: config::DEFAULT_LABELS_PATH.to_string(),
            model_sha256: None,
            input_size: config::DEFAULT_INPUT_SIZE,
            crop_and_scale: CropAndScale::default(),
            top_k: config::DEFAULT_TOP_K,
        }
    }
}

impl From<&EnvConfig> for RuntimeConfig {
    fn from(env: &EnvConfig) -> Self {
        Self {
            base_path: env.base_path.clone(),
            model_path: env.model_path.clone(),
            labels_path: env.labels_path.clone(),
            model_sha256: env.model_sha256.clone(),
            input_size: env.input_size,
            crop_and_scale: env.crop_and_scale,
            top_k: env.top_k,
        }
    }
}

/// Errors building the classifier model.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Validate artifacts on disk and build the ONNX-backed model.
pub fn load_model(config: &RuntimeConfig) -> Result<ClassifierModel, BootstrapError> {
    let loader = ModelLoader::new(config.base_path.clone());
    let model_path = loader.validate_path(&config.model_path)?;
    if let Some(expected) = &config.model_sha256 {
        loader.verify_sha256(&model_path, expected)?;
    }
    let labels_path = loader.validate_path(&config.labels_path)?;
    let labels = loader.load_labels(&labels_path)?;

    let model_id = model_path
        .as_path()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("flower-classifier")
        .to_string();
    let onnx_config = OnnxConfig {
        model_id: model_id.clone(),
        preprocessor: ImagePreprocessor::new(config.input_size),
    };
    let backend = load_onnx_backend(&model_path, labels, &onnx_config)?;
    telemetry::record_model_load("onnx");
    info!(model_id = %model_id, crop = config.crop_and_scale.as_str(), "classifier model ready");

    Ok(ClassifierModel::new(model_id, backend).with_crop_and_scale(config.crop_and_scale))
}

/// A classification runtime: one lazily built model plus presentation settings.
pub struct Runtime {
    config: RuntimeConfig,
    model: SharedModel,
    presenter: PredictionPresenter,
}

impl Runtime {
    /// Runtime that loads its model from disk on first use.
    pub fn new(config: RuntimeConfig) -> Self {
        let presenter = PredictionPresenter::new(config.top_k);
        Self {
            config,
            model: SharedModel::new(),
            presenter,
        }
    }

    /// Runtime around an already constructed model.
    pub fn with_model(config: RuntimeConfig, model: ClassifierModel) -> Self {
        let presenter = PredictionPresenter::new(config.top_k);
        Self {
            config,
            model: SharedModel::from_model(model),
            presenter,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn presenter(&self) -> PredictionPresenter {
        self.presenter
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_initialized()
    }

    /// A classifier on the current tokio runtime, loading the model if needed.
    pub async fn classifier(&self) -> Result<ImageClassifier, BootstrapError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                // Hashing and graph parsing are blocking.
                let config = self.config.clone();
                tokio::task::spawn_blocking(move || load_model(&config))
                    .await
                    .map_err(|e| BackendError::Aborted(format!("model load task failed: {}", e)))?
            })
            .await?;
        Ok(ImageClassifier::from_current(model))
    }
}
