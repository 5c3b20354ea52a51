//! Vision value types: captured images, orientation, predictions.
//!
//! Everything here is pure and synchronous. The asynchronous request
//! pipeline lives in [`crate::engine`].

mod captured;
pub mod confidence;
pub mod orientation;
mod prediction;
pub mod presenter;

pub use captured::CapturedImage;
pub use confidence::format_confidence;
pub use orientation::{to_backend_orientation, ImageOrientation, PixelOrientation};
pub use prediction::Prediction;
pub use presenter::{PredictionPresenter, NO_PREDICTIONS_MESSAGE};
