//! Image classifier: builds requests, runs them, and maps results.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, warn, Instrument};

use super::backend::VisionOutput;
use super::error::ClassifyError;
use super::model::ClassifierModel;
use super::pending::{PendingRequest, QueuedRequest};
use super::request::{ClassificationRequest, Outcome, RequestId};
use crate::telemetry::{record_classification, RequestSpan, SpanExt};
use crate::vision::{CapturedImage, Prediction};

/// Makes classification predictions for captured images.
///
/// Every call builds its own [`ClassificationRequest`] against the shared
/// model, so one classifier can serve any number of concurrent callers.
/// Completion handlers run on the runtime's worker tasks, or on a helper
/// thread if the runtime has shut down, never inside the call that
/// submitted the request.
#[derive(Debug, Clone)]
pub struct ImageClassifier {
    model: Arc<ClassifierModel>,
    runtime: Handle,
}

impl ImageClassifier {
    pub fn new(model: Arc<ClassifierModel>, runtime: Handle) -> Self {
        Self { model, runtime }
    }

    /// Create a classifier bound to the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn from_current(model: Arc<ClassifierModel>) -> Self {
        Self::new(model, Handle::current())
    }

    pub fn model(&self) -> &Arc<ClassifierModel> {
        &self.model
    }

    /// Submit `image` for classification and call `on_complete` with the result.
    ///
    /// Failures are logged and delivered as `None`. The handler is called
    /// exactly once.
    ///
    /// # Panics
    /// Panics if the image has no pixel buffer.
    pub fn classify<F>(&self, image: &CapturedImage, on_complete: F) -> RequestId
    where
        F: FnOnce(Option<Vec<Prediction>>) + Send + 'static,
    {
        let mut request = self.create_request(image);
        let request_id = request.id();
        let queued = QueuedRequest::new(PendingRequest::new(request_id, on_complete));
        let model = Arc::clone(&self.model);

        request.mark_submitted();
        self.runtime.spawn(async move {
            let Some(mut pending) = queued.start() else {
                return;
            };
            if let Ok(predictions) = execute(&model, &mut request).await {
                pending.fulfill(predictions);
            }
        });

        request_id
    }

    /// Classify `image` and wait for the result, keeping the failure reason.
    ///
    /// # Panics
    /// Panics if the image has no pixel buffer.
    pub async fn predict(&self, image: &CapturedImage) -> Result<Vec<Prediction>, ClassifyError> {
        let mut request = self.create_request(image);
        request.mark_submitted();
        execute(&self.model, &mut request).await
    }

    /// Submit `image` and receive the result through a ticket future.
    ///
    /// # Panics
    /// Panics if the image has no pixel buffer.
    pub fn submit(&self, image: &CapturedImage) -> PredictionTicket {
        let (tx, rx) = oneshot::channel();
        let request_id = self.classify(image, move |predictions| {
            // Receiver may have been dropped; nothing to deliver to.
            let _ = tx.send(predictions);
        });
        PredictionTicket { request_id, rx }
    }

    fn create_request(&self, image: &CapturedImage) -> ClassificationRequest {
        let pixels = match image.pixels() {
            Some(pixels) => Arc::clone(pixels),
            None => panic!("captured image has no underlying pixel buffer"),
        };
        ClassificationRequest::new(
            self.model.model_id(),
            pixels,
            image.pixel_orientation(),
            self.model.crop_and_scale(),
        )
    }
}

/// Run one request against the model and convert its output.
async fn execute(
    model: &ClassifierModel,
    request: &mut ClassificationRequest,
) -> Result<Vec<Prediction>, ClassifyError> {
    let span = RequestSpan::new(&request.id().to_string(), request.model_id());
    let started = Instant::now();

    let result = model
        .backend()
        .perform(request)
        .instrument(span.clone())
        .await
        .map_err(ClassifyError::from)
        .and_then(into_predictions);

    let latency = started.elapsed();
    let outcome = match &result {
        Ok(_) => Outcome::Success,
        Err(ClassifyError::Backend(_)) => Outcome::BackendError,
        Err(ClassifyError::NoResults) => Outcome::NoResults,
        Err(ClassifyError::TypeMismatch { .. }) => Outcome::TypeMismatch,
    };
    span.record_result(&result);
    span.record_completion(outcome.as_str(), latency);

    match &result {
        Ok(predictions) => {
            span.record_predictions(predictions.len());
            debug!(parent: &span, count = predictions.len(), "classification complete");
        }
        Err(err) if err.is_warning() => {
            warn!(parent: &span, error = %err, "classification produced nothing");
        }
        Err(err) => {
            error!(parent: &span, error = %err, "classification failed");
        }
    }

    request.complete(outcome);
    record_classification(outcome.as_str(), latency);
    result
}

/// Map backend output to predictions, preserving the backend's ordering.
fn into_predictions(output: Option<VisionOutput>) -> Result<Vec<Prediction>, ClassifyError> {
    match output {
        None => Err(ClassifyError::NoResults),
        Some(VisionOutput::Classifications(observations)) if observations.is_empty() => {
            Err(ClassifyError::NoResults)
        }
        Some(VisionOutput::Classifications(observations)) => Ok(observations
            .into_iter()
            .map(|obs| Prediction::from_probability(obs.identifier, obs.confidence))
            .collect()),
        Some(other) => Err(ClassifyError::TypeMismatch { found: other.kind() }),
    }
}

/// Pending result of [`ImageClassifier::submit`].
///
/// Resolves to `None` on any classification failure.
#[derive(Debug)]
pub struct PredictionTicket {
    request_id: RequestId,
    rx: oneshot::Receiver<Option<Vec<Prediction>>>,
}

impl PredictionTicket {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

impl Future for PredictionTicket {
    type Output = Option<Vec<Prediction>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.ok().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::ClassificationObservation;

    #[test]
    fn test_absent_output_is_no_results() {
        assert!(matches!(into_predictions(None), Err(ClassifyError::NoResults)));
    }

    #[test]
    fn test_empty_classifications_is_no_results() {
        let output = Some(VisionOutput::Classifications(vec![]));
        assert!(matches!(into_predictions(output), Err(ClassifyError::NoResults)));
    }

    #[test]
    fn test_feature_values_are_type_mismatch() {
        let output = Some(VisionOutput::FeatureValues(vec![0.5, 0.5]));
        match into_predictions(output) {
            Err(ClassifyError::TypeMismatch { found }) => assert_eq!(found, "feature_values"),
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_observations_keep_order_and_labels() {
        let output = Some(VisionOutput::Classifications(vec![
            ClassificationObservation::new("sunflower", 0.8),
            ClassificationObservation::new("daisy, marguerite", 0.15),
            ClassificationObservation::new("tulip", 0.007),
        ]));
        let predictions = into_predictions(output).unwrap();
        assert_eq!(
            predictions,
            vec![
                Prediction::new("sunflower", "80.0"),
                Prediction::new("daisy, marguerite", "15.0"),
                Prediction::new("tulip", "0.70"),
            ]
        );
    }
}
