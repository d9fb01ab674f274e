//! Progress reporting for exports.
//!
//! The document builder loads the whole window before rendering, so the
//! total number of records is known up front. A [`ProgressCallback`] set
//! with [`DocumentBuilder::with_progress`](crate::document::DocumentBuilder::with_progress)
//! is invoked once per rendered record. Skipped view-once records are counted
//! when the replay passes them, with one extra report for any that trail the
//! last rendered record.
//!
//! # Example
//!
//! ```rust
//! use chatexport::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("Progress: {:.1}%", pct);
//!     }
//! });
//!
//! for i in 0..10usize {
//!     callback(Progress::new(i + 1, Some(10)));
//! }
//! ```

use std::sync::Arc;

/// Progress of one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Records handled so far, including skipped view-once records.
    pub records_processed: usize,

    /// Records loaded for the window, if known.
    pub total_records: Option<usize>,

    /// `Log` elements opened so far.
    pub days: usize,
}

impl Progress {
    /// Creates a new progress instance.
    pub fn new(records_processed: usize, total_records: Option<usize>) -> Self {
        Self {
            records_processed,
            total_records,
            days: 0,
        }
    }

    /// Sets the number of opened days.
    #[must_use]
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// Returns `None` if the total is not known.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatexport::progress::Progress;
    ///
    /// let progress = Progress::new(50, Some(100));
    /// assert_eq!(progress.percentage(), Some(50.0));
    ///
    /// let unknown = Progress::new(50, None);
    /// assert_eq!(unknown.percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_records.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.records_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether every loaded record has been handled.
    pub fn is_complete(&self) -> bool {
        self.total_records
            .map(|total| self.records_processed >= total)
            .unwrap_or(false)
    }

    /// Returns the number of records still to render.
    pub fn remaining(&self) -> Option<usize> {
        self.total_records
            .map(|total| total.saturating_sub(self.records_processed))
    }
}

/// Callback type for receiving progress updates.
///
/// # Example
///
/// ```rust
/// use chatexport::progress::{Progress, ProgressCallback};
/// use std::sync::Arc;
///
/// let callback: ProgressCallback = Arc::new(|progress| {
///     println!("Rendered {} records", progress.records_processed);
/// });
///
/// callback(Progress::new(10, Some(20)));
/// ```
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
///
/// Prints at most once per whole percent so large exports don't flood the
/// terminal.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| {
        let Some(total) = progress.total_records else {
            return;
        };
        let step = (total / 100).max(1);
        if progress.records_processed % step == 0 || progress.is_complete() {
            if let Some(pct) = progress.percentage() {
                eprintln!("Progress: {:.1}%", pct);
            }
        }
    })
}
