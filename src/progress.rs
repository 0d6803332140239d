//! Progress reporting for batch parsing.
//!
//! Batch operations push a [`Progress`] snapshot to a callback after every
//! archive instead of making callers poll.
//!
//! # Example
//!
//! ```rust
//! use ichatpack::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("Progress: {:.1}%", pct);
//!     }
//! });
//!
//! for i in 0..10usize {
//!     callback(Progress::new(i + 1, Some(10), (i + 1) * 25));
//! }
//! ```

use std::sync::Arc;

/// Snapshot of a running batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    /// Archives finished so far, successfully or not.
    pub files_processed: usize,

    /// Archives in the batch, if known.
    pub total_files: Option<usize>,

    /// Records recovered so far.
    pub messages_processed: usize,

    /// Archives that failed so far.
    pub failures: usize,
}

impl Progress {
    /// Creates a new progress snapshot.
    pub fn new(
        files_processed: usize,
        total_files: Option<usize>,
        messages_processed: usize,
    ) -> Self {
        Self {
            files_processed,
            total_files,
            messages_processed,
            failures: 0,
        }
    }

    /// Sets the failure count.
    #[must_use]
    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// Returns `None` if the batch size is not known.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ichatpack::progress::Progress;
    ///
    /// let progress = Progress::new(5, Some(10), 120);
    /// assert_eq!(progress.percentage(), Some(50.0));
    ///
    /// let unknown = Progress::new(5, None, 120);
    /// assert_eq!(unknown.percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_files.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.files_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether every archive has been processed.
    pub fn is_complete(&self) -> bool {
        self.total_files
            .is_some_and(|total| self.files_processed >= total)
    }

    /// Returns the number of archives still to process.
    pub fn remaining_files(&self) -> Option<usize> {
        self.total_files
            .map(|total| total.saturating_sub(self.files_processed))
    }
}

/// Thread-safe callback receiving [`Progress`] updates.
///
/// With the `parallel` feature the callback is invoked from worker threads.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
///
/// ```rust
/// use ichatpack::progress::no_progress;
///
/// let callback = no_progress();
/// callback(ichatpack::progress::Progress::default()); // Does nothing
/// ```
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| {
        if let (Some(pct), Some(total)) = (progress.percentage(), progress.total_files) {
            eprint!(
                "\rParsing: {:.1}% ({}/{} files, {} failed)",
                pct, progress.files_processed, total, progress.failures
            );
            if progress.is_complete() {
                eprintln!();
            }
        }
    })
}
