//! Progress-callback trait for batch and per-document events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress`] to receive events as the
//! orchestrator works through the batch. The callback approach keeps the
//! library ignorant of how the host application communicates: the CLI
//! forwards events to a terminal progress bar, a server could forward them
//! to a WebSocket or a database record.
//!
//! # Thread safety
//!
//! In parallel mode the per-document methods may be called concurrently
//! from different tasks; implementations must protect shared mutable state
//! (e.g. with `Mutex` or atomics). All methods have default no-op bodies so
//! callers only override what they care about.

use std::sync::Arc;
use std::time::Duration;

/// Called by the batch orchestrator as documents move through the pipeline.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after input discovery, before any document is processed.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document's extraction begins.
    fn on_document_start(&self, stem: &str) {
        let _ = stem;
    }

    /// Called when a document yielded no extractable text and was skipped.
    fn on_document_skipped(&self, stem: &str) {
        let _ = stem;
    }

    /// Called when a document's text and audio artifacts are in place.
    ///
    /// `elapsed` is the wall-clock duration of the whole per-document
    /// operation, extraction through synthesis.
    fn on_document_complete(&self, stem: &str, elapsed: Duration) {
        let _ = (stem, elapsed);
    }

    /// Called when a document failed (extraction, I/O, or synthesis).
    fn on_document_error(&self, stem: &str, error: &str) {
        let _ = (stem, error);
    }

    /// Called once after every dispatched document has finished.
    fn on_batch_complete(&self, processed: usize, skipped: usize, failed: usize) {
        let _ = (processed, skipped, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: AtomicUsize,
        errors: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_document_start(&self, _stem: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_skipped(&self, _stem: &str) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _stem: &str, _elapsed: Duration) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_error(&self, _stem: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(3);
        cb.on_document_start("report");
        cb.on_document_skipped("blank");
        cb.on_document_complete("report", Duration::from_secs(2));
        cb.on_document_error("broken", "corrupt xref");
        cb.on_batch_complete(1, 1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            skips: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };

        tracker.on_document_start("a");
        tracker.on_document_complete("a", Duration::from_millis(120));
        tracker.on_document_start("b");
        tracker.on_document_skipped("b");
        tracker.on_document_start("c");
        tracker.on_document_error("c", "synthesis failed");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_document_start("doc");
    }
}
