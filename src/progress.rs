//! Progress-callback trait for per-chunk summarization events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the chunk sequence.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a channel, a progress bar, or a log sink without
//! the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so a future concurrent
//! pipeline could fire events from multiple tasks; the current pipeline is
//! strictly sequential, so events arrive in chunk order and the completed
//! fraction `completed / total` is monotonically non-decreasing from 0 to 1.

use std::sync::Arc;

/// Called by the pipeline as it submits each chunk for summarization.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once after chunking, before any chunk is submitted.
    ///
    /// # Arguments
    /// * `total_chunks` — number of chunks that will be submitted
    fn on_run_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before a chunk's request is sent.
    ///
    /// # Arguments
    /// * `index` — 0-indexed chunk position
    /// * `total` — total chunk count
    fn on_chunk_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a chunk produced a summary.
    ///
    /// `completed / total` after this call gives the progress fraction.
    ///
    /// # Arguments
    /// * `index`       — 0-indexed chunk position
    /// * `total`       — total chunk count
    /// * `summary_len` — byte length of the produced summary
    fn on_chunk_complete(&self, index: usize, total: usize, summary_len: usize) {
        let _ = (index, total, summary_len);
    }

    /// Called when a chunk exhausted its attempts (or hit a permanent
    /// failure) and produced no summary. The run continues.
    fn on_chunk_failed(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called once after every chunk has been attempted.
    ///
    /// # Arguments
    /// * `total_chunks`  — chunks attempted
    /// * `success_count` — chunks that produced a summary
    fn on_run_complete(&self, total_chunks: usize, success_count: usize) {
        let _ = (total_chunks, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        failures: AtomicUsize,
        fractions: Mutex<Vec<(usize, usize)>>,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_chunk_start(&self, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, index: usize, total: usize, _summary_len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.fractions.lock().unwrap().push((index + 1, total));
        }

        fn on_chunk_failed(&self, index: usize, total: usize) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            self.fractions.lock().unwrap().push((index + 1, total));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(4);
        cb.on_chunk_start(0, 4);
        cb.on_chunk_complete(0, 4, 120);
        cb.on_chunk_failed(1, 4);
        cb.on_run_complete(4, 3);
    }

    #[test]
    fn tracking_callback_sees_monotonic_fractions() {
        let cb = TrackingCallback::default();
        cb.on_run_start(3);
        for i in 0..3 {
            cb.on_chunk_start(i, 3);
            if i == 1 {
                cb.on_chunk_failed(i, 3);
            } else {
                cb.on_chunk_complete(i, 3, 80);
            }
        }
        cb.on_run_complete(3, 2);

        assert_eq!(cb.starts.load(Ordering::SeqCst), 3);
        assert_eq!(cb.completes.load(Ordering::SeqCst), 2);
        assert_eq!(cb.failures.load(Ordering::SeqCst), 1);

        let fractions = cb.fractions.lock().unwrap();
        assert_eq!(*fractions, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_chunk_complete(0, 10, 512);
    }
}
