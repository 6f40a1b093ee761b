//! Progress-callback trait for per-archive batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::batch::run_batch`] works through its archives. The CLI
//! uses this to drive an indicatif progress bar; library users can forward
//! the events wherever they like.
//!
//! # Example
//!
//! ```rust
//! use edgequake_zip2pdf::{BatchProgressCallback, ConversionConfig, ConversionOutcome};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_archive_complete(&self, index: usize, total: usize, path: &Path, _outcome: &ConversionOutcome) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index, total, path.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::batch::BatchReport;
use crate::convert::ConversionOutcome;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch runner as it processes each archive.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Archives are processed one at a time, but the
/// trait is `Send + Sync` so a callback can be shared with other threads.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once, after planning, with the number of archives to convert.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an archive is extracted.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — archives in the batch
    /// * `path`  — the archive
    fn on_archive_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called once the archive has a final outcome.
    fn on_archive_complete(
        &self,
        index: usize,
        total: usize,
        path: &Path,
        outcome: &ConversionOutcome,
    ) {
        let _ = (index, total, path, outcome);
    }

    /// Called once after every archive has been attempted.
    fn on_batch_complete(&self, report: &BatchReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        finished: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn on_archive_start(&self, _index: usize, _total: usize, _path: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_archive_complete(
            &self,
            _index: usize,
            _total: usize,
            _path: &Path,
            _outcome: &ConversionOutcome,
        ) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _report: &BatchReport) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let path = PathBuf::from("a.cbz");
        cb.on_batch_start(2);
        cb.on_archive_start(1, 2, &path);
        cb.on_archive_complete(1, 2, &path, &ConversionOutcome::NotAnArchive);
        cb.on_batch_complete(&BatchReport::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let path = PathBuf::from("a.cbz");

        tracker.on_batch_start(2);
        tracker.on_archive_start(1, 2, &path);
        tracker.on_archive_complete(
            1,
            2,
            &path,
            &ConversionOutcome::BelowThreshold {
                found: 3,
                required: 12,
            },
        );
        tracker.on_archive_start(2, 2, &path);
        tracker.on_batch_complete(&BatchReport::default());

        assert_eq!(tracker.total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_archive_start(1, 10, Path::new("x.cbr"));
    }
}
