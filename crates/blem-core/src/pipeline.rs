//! Runs a feature source through the classifier.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::domain::ClassificationResult;
use crate::inference::{ExpressionMlp, ExpressionTracker};
use crate::ports::{FeatureSource, ProgressEvent, ProgressSink, ResultOutput};

/// Options for a classification run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Only write results whose expression differs from the previous sample
    /// of the same source.
    pub changes_only: bool,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Samples classified.
    pub processed: usize,
    /// Samples skipped (unreadable or wrong shape).
    pub skipped: usize,
    /// Results written to the output.
    pub written: usize,
    /// Classified samples that carried a label.
    pub labeled: usize,
    /// Labeled samples whose prediction matched.
    pub correct: usize,
}

impl RunSummary {
    /// Fraction of labeled samples classified correctly.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> Option<f32> {
        (self.labeled > 0).then(|| self.correct as f32 / self.labeled as f32)
    }
}

/// Classifies every sample of `source`, writing results to `output`.
///
/// Samples that fail to load or have the wrong length are reported as
/// skipped and do not stop the run. `timestamp` supplies the time stamp
/// recorded on each result.
///
/// # Errors
///
/// Returns an error only if writing or flushing the output fails.
pub fn run(
    model: &ExpressionMlp,
    source: &dyn FeatureSource,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
    options: RunOptions,
    timestamp: &dyn Fn() -> String,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut trackers: HashMap<String, ExpressionTracker> = HashMap::new();

    for (index, sample) in source.samples().enumerate() {
        let sample = match sample {
            Ok(s) => s,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    source: format!("sample {index}"),
                    reason: format!("{e:#}"),
                });
                summary.skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            source: sample.source.clone(),
            index,
        });

        let prediction = match model.predict(&sample.features) {
            Ok(p) => p,
            Err(e) => {
                warn!("{}#{}: {e}", sample.source, sample.index);
                progress.on_event(ProgressEvent::Skipped {
                    source: format!("{}#{}", sample.source, sample.index),
                    reason: e.to_string(),
                });
                summary.skipped += 1;
                continue;
            }
        };

        let changed = trackers
            .entry(sample.source.clone())
            .or_default()
            .observe(&prediction);

        let result = ClassificationResult {
            source: sample.source,
            index: sample.index,
            timestamp: timestamp(),
            prediction,
            label: sample.label,
        };

        summary.processed += 1;
        if let Some(correct) = result.correct() {
            summary.labeled += 1;
            if correct {
                summary.correct += 1;
            }
        }

        if options.changes_only && !changed {
            debug!("{}#{}: unchanged, not written", result.source, result.index);
        } else {
            output.write(&result)?;
            summary.written += 1;
        }

        progress.on_event(ProgressEvent::Completed { result });
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        processed: summary.processed,
        skipped: summary.skipped,
    });

    if let Some(accuracy) = summary.accuracy() {
        info!(
            "Accuracy: {}/{} labeled samples ({:.1}%)",
            summary.correct,
            summary.labeled,
            accuracy * 100.0
        );
    }

    Ok(summary)
}
