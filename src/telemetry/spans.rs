//! Span utilities for classification requests.

use std::time::Duration;

use tracing::{info_span, Span};

/// Extension trait for filling in request span fields.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;

    /// Record the terminal outcome label and elapsed time.
    fn record_completion(&self, outcome: &'static str, latency: Duration);

    /// Record how many predictions were delivered.
    fn record_predictions(&self, count: usize);
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }

    fn record_completion(&self, outcome: &'static str, latency: Duration) {
        self.record("outcome", outcome);
        self.record("latency_ms", latency.as_millis() as u64);
    }

    fn record_predictions(&self, count: usize) {
        self.record("predictions", count as u64);
    }
}

/// Factory for classification request spans.
pub struct RequestSpan;

impl RequestSpan {
    /// Span for one classification request.
    ///
    /// `status`, `error.message`, `outcome`, `latency_ms` and `predictions`
    /// start empty and are filled in through [`SpanExt`].
    pub fn new(request_id: &str, model_id: &str) -> Span {
        info_span!(
            "classification_request",
            request_id = %request_id,
            model_id = %model_id,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            outcome = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            predictions = tracing::field::Empty,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured<F: FnOnce()>(f: F) -> String {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(capture.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_completion_fields_reach_events() {
        let out = captured(|| {
            let span = RequestSpan::new("req-1", "flowers");
            let result: Result<(), &str> = Err("nothing classified");
            span.record_result(&result);
            span.record_completion("no_results", Duration::from_millis(12));
            tracing::warn!(parent: &span, "classification produced nothing");
        });

        assert!(out.contains("classification_request"));
        assert!(out.contains("no_results"));
        assert!(out.contains("nothing classified"));
        assert!(out.contains("flowers"));
    }

    #[test]
    fn test_prediction_count_recorded() {
        let out = captured(|| {
            let span = RequestSpan::new("req-2", "flowers");
            span.record_result(&Ok::<_, &str>(()));
            span.record_predictions(5);
            tracing::info!(parent: &span, "classification complete");
        });

        assert!(out.contains("\"predictions\":5"));
        assert!(out.contains("\"status\":\"ok\""));
    }
}
