//! Per-request completion guard.

use std::fmt;
use std::thread;

use tracing::warn;

use super::request::RequestId;
use crate::vision::Prediction;

/// Completion continuation supplied by the caller of `classify`.
pub type PredictionHandler = Box<dyn FnOnce(Option<Vec<Prediction>>) + Send + 'static>;

/// Links one in-flight request to its caller's continuation.
///
/// The handler runs exactly once, when the guard is dropped. Until
/// [`fulfill`](Self::fulfill) is called the result is `None`, so every exit
/// path (early return, error, or a panic unwinding through the task)
/// still resolves the caller.
pub struct PendingRequest {
    request_id: RequestId,
    handler: Option<PredictionHandler>,
    predictions: Option<Vec<Prediction>>,
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("request_id", &self.request_id)
            .field("resolved", &self.handler.is_none())
            .field("predictions", &self.predictions.as_ref().map(Vec::len))
            .finish()
    }
}

impl PendingRequest {
    pub fn new<F>(request_id: RequestId, handler: F) -> Self
    where
        F: FnOnce(Option<Vec<Prediction>>) + Send + 'static,
    {
        Self {
            request_id,
            handler: Some(Box::new(handler)),
            predictions: None,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Set the result delivered on resolve.
    pub fn fulfill(&mut self, predictions: Vec<Prediction>) {
        self.predictions = Some(predictions);
    }

    /// Deliver the result now instead of at end of scope.
    pub fn resolve(self) {
        drop(self);
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler(self.predictions.take());
        }
    }
}

/// A [`PendingRequest`] handed to a task that has not started yet.
///
/// A task can be dropped before its first poll, for instance when the
/// runtime has already shut down. In that case the drop happens on the
/// submitting thread, so the request is resolved on a separate thread
/// instead and the submitter never runs the handler itself.
pub struct QueuedRequest {
    pending: Option<PendingRequest>,
}

impl fmt::Debug for QueuedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedRequest")
            .field("pending", &self.pending)
            .finish()
    }
}

impl QueuedRequest {
    pub fn new(pending: PendingRequest) -> Self {
        Self {
            pending: Some(pending),
        }
    }

    /// Take the request once its task is running.
    pub fn start(mut self) -> Option<PendingRequest> {
        self.pending.take()
    }
}

impl Drop for QueuedRequest {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let request_id = pending.request_id();
        let spawned = thread::Builder::new()
            .name("bloom-resolve".into())
            .spawn(move || pending.resolve());
        if let Err(e) = spawned {
            // The closure, and the request with it, is dropped here.
            warn!(request_id = %request_id, error = %e, "resolving unstarted request inline");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_unfulfilled_guard_resolves_none() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        {
            let _pending = PendingRequest::new(RequestId::new(), move |p| {
                sink.lock().unwrap().push(p);
            });
        }
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_none());
    }

    #[test]
    fn test_fulfilled_guard_delivers_predictions() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut pending = PendingRequest::new(RequestId::new(), move |p| {
            *sink.lock().unwrap() = p;
        });
        pending.fulfill(vec![Prediction::new("rose", "91.2")]);
        pending.resolve();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_handler_runs_once_on_panic_unwind() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _pending = PendingRequest::new(RequestId::new(), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            panic!("backend blew up");
        }));
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_started_request_resolves_on_current_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let queued = QueuedRequest::new(PendingRequest::new(RequestId::new(), move |p| {
            tx.send((thread::current().id(), p)).unwrap();
        }));
        let pending = queued.start().unwrap();
        drop(pending);

        let (resolved_on, predictions) = rx.try_recv().unwrap();
        assert_eq!(resolved_on, thread::current().id());
        assert!(predictions.is_none());
    }

    #[test]
    fn test_unstarted_request_resolves_off_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let queued = QueuedRequest::new(PendingRequest::new(RequestId::new(), move |p| {
            tx.send((thread::current().id(), p)).unwrap();
        }));
        drop(queued);

        let (resolved_on, predictions) = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert_ne!(resolved_on, thread::current().id());
        assert!(predictions.is_none());
        assert!(rx.recv_timeout(std::time::Duration::from_millis(50)).is_err());
    }
}
