//! Classification request type and lifecycle.

use std::fmt;
use std::sync::Arc;

use image::RgbImage;
use uuid::Uuid;

use crate::vision::PixelOrientation;

/// Unique identifier for a classification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the backend fits the image to the model's input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropAndScale {
    /// Scale the short side to fit, then crop the center square.
    #[default]
    CenterCrop,
    /// Scale to fit inside the input, preserving aspect ratio.
    ScaleFit,
    /// Stretch to fill the input, ignoring aspect ratio.
    ScaleFill,
}

impl CropAndScale {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "center-crop" | "centercrop" | "center_crop" => Some(Self::CenterCrop),
            "scale-fit" | "scalefit" | "scale_fit" => Some(Self::ScaleFit),
            "scale-fill" | "scalefill" | "scale_fill" => Some(Self::ScaleFill),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CenterCrop => "center-crop",
            Self::ScaleFit => "scale-fit",
            Self::ScaleFill => "scale-fill",
        }
    }
}

/// Lifecycle of a single request. Completed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Created,
    Submitted,
    Completed(Outcome),
}

/// Terminal outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    BackendError,
    NoResults,
    TypeMismatch,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::BackendError => "backend_error",
            Self::NoResults => "no_results",
            Self::TypeMismatch => "type_mismatch",
        }
    }
}

/// A single inference request against the shared model.
///
/// Each call to the classifier builds a fresh request, so concurrent
/// classifications never share request state.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    id: RequestId,
    model_id: String,
    pixels: Arc<RgbImage>,
    orientation: PixelOrientation,
    crop_and_scale: CropAndScale,
    state: RequestState,
}

impl ClassificationRequest {
    pub fn new(
        model_id: impl Into<String>,
        pixels: Arc<RgbImage>,
        orientation: PixelOrientation,
        crop_and_scale: CropAndScale,
    ) -> Self {
        Self {
            id: RequestId::new(),
            model_id: model_id.into(),
            pixels,
            orientation,
            crop_and_scale,
            state: RequestState::Created,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Shared handle to the pixel buffer, for work moved off the request.
    pub fn shared_pixels(&self) -> Arc<RgbImage> {
        Arc::clone(&self.pixels)
    }

    pub fn orientation(&self) -> PixelOrientation {
        self.orientation
    }

    pub fn crop_and_scale(&self) -> CropAndScale {
        self.crop_and_scale
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Move `Created -> Submitted`. No-op in any other state.
    pub fn mark_submitted(&mut self) {
        if self.state == RequestState::Created {
            self.state = RequestState::Submitted;
        }
    }

    /// Record the terminal outcome. The first completion wins.
    pub fn complete(&mut self, outcome: Outcome) {
        if !matches!(self.state, RequestState::Completed(_)) {
            self.state = RequestState::Completed(outcome);
        }
    }
}
