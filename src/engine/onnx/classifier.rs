//! ONNX image classification backend.

use std::collections::HashMap;
use std::sync::Arc;

use candle_core::{Device, Tensor};
use candle_onnx::onnx::ModelProto;
use tracing::{debug, info};

use super::{scores_to_observations, ImagePreprocessor, OnnxConfig};
use crate::engine::{BackendError, ClassificationRequest, VisionBackend, VisionOutput};
use crate::models::ModelPath;

/// Image classifier evaluated with Candle's ONNX interpreter.
pub struct OnnxVisionBackend {
    model_id: String,
    model: Arc<ModelProto>,
    input_name: String,
    output_name: String,
    labels: Arc<Vec<String>>,
    preprocessor: ImagePreprocessor,
}

impl OnnxVisionBackend {
    /// Read the model file and bind it to `labels`.
    pub fn load(
        model_path: &ModelPath,
        labels: Vec<String>,
        config: &OnnxConfig,
    ) -> Result<Self, BackendError> {
        let model = candle_onnx::read_file(model_path.as_path())
            .map_err(|e| BackendError::ModelError(format!("failed to read ONNX model: {}", e)))?;
        Self::from_proto(model, labels, config)
    }

    /// Bind a parsed model graph to `labels`. The first graph input takes
    /// the image tensor and the first graph output holds the scores.
    pub fn from_proto(
        model: ModelProto,
        labels: Vec<String>,
        config: &OnnxConfig,
    ) -> Result<Self, BackendError> {
        let graph = model
            .graph
            .as_ref()
            .ok_or_else(|| BackendError::ModelError("ONNX model has no graph".into()))?;
        let input_name = graph
            .input
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| BackendError::ModelError("ONNX graph has no inputs".into()))?;
        let output_name = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| BackendError::ModelError("ONNX graph has no outputs".into()))?;

        info!(
            model_id = %config.model_id,
            input = %input_name,
            output = %output_name,
            labels = labels.len(),
            "ONNX classifier loaded"
        );

        Ok(Self {
            model_id: config.model_id.clone(),
            model: Arc::new(model),
            input_name,
            output_name,
            labels: Arc::new(labels),
            preprocessor: config.preprocessor.clone(),
        })
    }
}

#[async_trait::async_trait]
impl VisionBackend for OnnxVisionBackend {
    fn backend_id(&self) -> &str {
        &self.model_id
    }

    async fn perform(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Option<VisionOutput>, BackendError> {
        let preprocessor = self.preprocessor.clone();
        let pixels = request.shared_pixels();
        let orientation = request.orientation();
        let mode = request.crop_and_scale();
        let model = Arc::clone(&self.model);
        let labels = Arc::clone(&self.labels);
        let input_name = self.input_name.clone();
        let output_name = self.output_name.clone();

        let scores = tokio::task::spawn_blocking(move || -> Result<Vec<f32>, BackendError> {
            let data = preprocessor.prepare_pixels(&pixels, orientation, mode);
            let input = Tensor::from_vec(data, preprocessor.shape(), &Device::Cpu)
                .map_err(|e| BackendError::InputValidation(e.to_string()))?;
            let mut inputs = HashMap::new();
            inputs.insert(input_name, input);

            let mut outputs = candle_onnx::simple_eval(&model, inputs)
                .map_err(|e| BackendError::ModelError(e.to_string()))?;
            let output = outputs.remove(&output_name).ok_or_else(|| {
                BackendError::ModelError(format!("missing output '{}'", output_name))
            })?;
            output
                .flatten_all()
                .and_then(|t| t.to_dtype(candle_core::DType::F32))
                .and_then(|t| t.to_vec1::<f32>())
                .map_err(|e| BackendError::ModelError(e.to_string()))
        })
        .await
        .map_err(|e| BackendError::Aborted(e.to_string()))??;

        debug!(scores = scores.len(), "ONNX evaluation finished");

        if scores.is_empty() {
            return Ok(None);
        }
        // Output width not matching the label set means this isn't a classifier head.
        if scores.len() != labels.len() {
            return Ok(Some(VisionOutput::FeatureValues(scores)));
        }
        Ok(Some(VisionOutput::Classifications(scores_to_observations(
            &scores, &labels,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_onnx::onnx::{GraphProto, NodeProto, ValueInfoProto};
    use image::{Rgb, RgbImage};

    use crate::engine::{ClassifierModel, ClassifyError, CropAndScale, ImageClassifier};
    use crate::vision::{CapturedImage, ImageOrientation, PixelOrientation};

    fn value(name: &str) -> ValueInfoProto {
        ValueInfoProto {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Graph that returns its input unchanged, so the scores are the
    /// preprocessed channel values.
    fn identity_model() -> ModelProto {
        ModelProto {
            graph: Some(GraphProto {
                node: vec![NodeProto {
                    op_type: "Identity".to_string(),
                    input: vec!["pixels".to_string()],
                    output: vec!["scores".to_string()],
                    ..Default::default()
                }],
                input: vec![value("pixels")],
                output: vec![value("scores")],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Single-pixel input: three scores, one per RGB channel.
    fn config() -> OnnxConfig {
        OnnxConfig {
            model_id: "identity".to_string(),
            preprocessor: ImagePreprocessor::new(1),
        }
    }

    fn request(color: [u8; 3]) -> ClassificationRequest {
        ClassificationRequest::new(
            "identity",
            Arc::new(RgbImage::from_pixel(4, 4, Rgb(color))),
            PixelOrientation::Up,
            CropAndScale::CenterCrop,
        )
    }

    #[test]
    fn test_from_proto_discovers_io_names() {
        let backend =
            OnnxVisionBackend::from_proto(identity_model(), labels(&["r", "g", "b"]), &config())
                .unwrap();
        assert_eq!(backend.input_name, "pixels");
        assert_eq!(backend.output_name, "scores");
        assert_eq!(backend.backend_id(), "identity");
    }

    #[test]
    fn test_from_proto_rejects_incomplete_graphs() {
        let no_graph = ModelProto::default();
        assert!(matches!(
            OnnxVisionBackend::from_proto(no_graph, labels(&["a"]), &config()),
            Err(BackendError::ModelError(_))
        ));

        let mut no_inputs = identity_model();
        if let Some(graph) = no_inputs.graph.as_mut() {
            graph.input.clear();
        }
        assert!(matches!(
            OnnxVisionBackend::from_proto(no_inputs, labels(&["a"]), &config()),
            Err(BackendError::ModelError(_))
        ));
    }

    #[tokio::test]
    async fn test_matching_width_yields_sorted_classifications() {
        let backend = OnnxVisionBackend::from_proto(
            identity_model(),
            labels(&["red", "green", "blue"]),
            &config(),
        )
        .unwrap();

        let output = backend.perform(&request([40, 200, 120])).await.unwrap();
        let observations = match output {
            Some(VisionOutput::Classifications(observations)) => observations,
            other => panic!("expected classifications, got {:?}", other),
        };

        let names: Vec<_> = observations.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(names, ["green", "blue", "red"]);
        let total: f32 = observations.iter().map(|o| o.confidence).sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_width_mismatch_yields_feature_values() {
        let backend =
            OnnxVisionBackend::from_proto(identity_model(), labels(&["rose", "tulip"]), &config())
                .unwrap();

        let output = backend.perform(&request([255, 0, 0])).await.unwrap();
        match output {
            Some(VisionOutput::FeatureValues(values)) => assert_eq!(values.len(), 3),
            other => panic!("expected feature values, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_width_mismatch_surfaces_as_type_mismatch() {
        let backend =
            OnnxVisionBackend::from_proto(identity_model(), labels(&["rose", "tulip"]), &config())
                .unwrap();
        let model = ClassifierModel::new("identity", Arc::new(backend));
        let classifier = ImageClassifier::from_current(Arc::new(model));
        let image = CapturedImage::new(RgbImage::new(4, 4), ImageOrientation::Up);

        match classifier.predict(&image).await {
            Err(ClassifyError::TypeMismatch { found }) => assert_eq!(found, "feature_values"),
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }
}
