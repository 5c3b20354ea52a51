//! Shared classifier model handle.
//!
//! Building a model is expensive, so one [`ClassifierModel`] is created per
//! process and shared by `Arc` with every classifier that needs it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::backend::VisionBackend;
use super::request::CropAndScale;

/// Immutable handle to a compiled classification model.
pub struct ClassifierModel {
    model_id: String,
    crop_and_scale: CropAndScale,
    backend: Arc<dyn VisionBackend>,
}

impl fmt::Debug for ClassifierModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierModel")
            .field("model_id", &self.model_id)
            .field("crop_and_scale", &self.crop_and_scale)
            .field("backend", &self.backend.backend_id())
            .finish()
    }
}

impl ClassifierModel {
    pub fn new(model_id: impl Into<String>, backend: Arc<dyn VisionBackend>) -> Self {
        Self {
            model_id: model_id.into(),
            crop_and_scale: CropAndScale::default(),
            backend,
        }
    }

    pub fn with_crop_and_scale(mut self, crop_and_scale: CropAndScale) -> Self {
        self.crop_and_scale = crop_and_scale;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn crop_and_scale(&self) -> CropAndScale {
        self.crop_and_scale
    }

    pub fn backend(&self) -> &Arc<dyn VisionBackend> {
        &self.backend
    }
}

/// Lazily constructed, process-wide model slot.
///
/// The first caller pays the construction cost. Concurrent first callers
/// wait for the same initialization; the model is never torn down.
#[derive(Debug, Default)]
pub struct SharedModel {
    cell: OnceCell<Arc<ClassifierModel>>,
}

impl SharedModel {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// A slot that already holds `model`.
    pub fn from_model(model: ClassifierModel) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(model))),
        }
    }

    /// Get the model, constructing it with `init` on first use.
    ///
    /// If `init` fails the slot stays empty and a later call retries.
    pub async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<Arc<ClassifierModel>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ClassifierModel, E>>,
    {
        self.cell
            .get_or_try_init(|| async move { init().await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    /// The model, if it has been constructed.
    pub fn get(&self) -> Option<Arc<ClassifierModel>> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
