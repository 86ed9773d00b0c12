//! Batch processing of independent documents

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::report::Reporter;

/// What processing one document did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// The document was changed or produced output
    pub touched: bool,
    /// Items merged within the document
    pub merged: usize,
}

impl DocumentOutcome {
    pub fn touched(touched: bool) -> Self {
        Self { touched, merged: 0 }
    }
}

/// Counters shared by the workers of a batch
#[derive(Debug, Default)]
pub struct BatchStats {
    processed: AtomicUsize,
    touched: AtomicUsize,
    skipped: AtomicUsize,
    merged: AtomicUsize,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: DocumentOutcome) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if outcome.touched {
            self.touched.fetch_add(1, Ordering::Relaxed);
        }
        self.merged.fetch_add(outcome.merged, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            processed: self.processed.load(Ordering::Relaxed),
            touched: self.touched.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            merged: self.merged.load(Ordering::Relaxed),
        }
    }
}

/// Final counts of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub touched: usize,
    pub skipped: usize,
    pub merged: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed: {}, touched: {}, skipped: {}, merged: {}",
            self.processed, self.touched, self.skipped, self.merged
        )
    }
}

fn run_one<T, E, F>(item: &T, stats: &BatchStats, reporter: &dyn Reporter, process: &F)
where
    T: fmt::Debug,
    E: fmt::Display,
    F: Fn(&T) -> Result<DocumentOutcome, E>,
{
    match process(item) {
        Ok(outcome) => stats.record(outcome),
        Err(e) => {
            reporter.error(&format!("Skipped {item:?}: {e:#}"));
            stats.record_skipped();
        }
    }
}

/// Run `process` over every item, on the rayon pool when the `parallel`
/// feature is enabled. A failing item is reported and counted as skipped;
/// the batch always runs to completion.
#[cfg(feature = "parallel")]
pub fn process_batch<T, E, F>(items: &[T], reporter: &dyn Reporter, process: F) -> BatchSummary
where
    T: fmt::Debug + Sync,
    E: fmt::Display,
    F: Fn(&T) -> Result<DocumentOutcome, E> + Sync,
{
    let stats = BatchStats::new();
    items
        .par_iter()
        .for_each(|item| run_one(item, &stats, reporter, &process));
    stats.summary()
}

/// Run `process` over every item in order. A failing item is reported and
/// counted as skipped; the batch always runs to completion.
#[cfg(not(feature = "parallel"))]
pub fn process_batch<T, E, F>(items: &[T], reporter: &dyn Reporter, process: F) -> BatchSummary
where
    T: fmt::Debug + Sync,
    E: fmt::Display,
    F: Fn(&T) -> Result<DocumentOutcome, E> + Sync,
{
    let stats = BatchStats::new();
    for item in items {
        run_one(item, &stats, reporter, &process);
    }
    stats.summary()
}
