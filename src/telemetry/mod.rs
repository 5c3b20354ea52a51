//! Telemetry: structured logging, request spans, and metrics.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{record_classification, record_model_load};
pub use spans::{RequestSpan, SpanExt};
