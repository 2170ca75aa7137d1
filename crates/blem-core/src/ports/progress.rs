//! Progress reporting port for UI integration.

use crate::domain::ClassificationResult;

/// Events emitted during classification for progress tracking.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Classification started for a sample.
    Started {
        /// Source of the sample.
        source: String,
        /// Index of the sample in the run (0-based).
        index: usize,
    },
    /// A sample was classified.
    Completed {
        /// The classification result.
        result: ClassificationResult,
    },
    /// A sample was skipped due to an error.
    Skipped {
        /// Source of the sample.
        source: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All samples have been processed.
    Finished {
        /// Samples classified.
        processed: usize,
        /// Samples skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
