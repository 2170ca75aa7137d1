//! Progress bar adapter using indicatif.

use blem_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress reporting on stderr.
///
/// Counts input files when the total is known; falls back to a spinner.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of input files, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise only report skips
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = IndicatifBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} samples {prefix} {msg}")
            {
                bar.set_style(style);
            }
            if let Some(files) = total {
                bar.set_prefix(format!("from {files} file(s)"));
            }
            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { .. } => {}
            ProgressEvent::Completed { result } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                    bar.set_message(result.source);
                }
            }
            ProgressEvent::Skipped { source, reason } => {
                let line = format!("WARN: Skipping {source}: {reason}");
                match &self.bar {
                    Some(bar) => bar.println(line),
                    None => eprintln!("{line}"),
                }
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {processed} classified, {skipped} skipped"
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blem_core::{ClassificationResult, Logits, Prediction};

    use super::*;

    fn completed(source: &str) -> ProgressEvent {
        ProgressEvent::Completed {
            result: ClassificationResult {
                source: source.into(),
                index: 0,
                timestamp: "2024-01-01T00:00:00Z".into(),
                prediction: Prediction::from_logits(Logits([0.0; 5])),
                label: None,
            },
        }
    }

    #[test]
    fn test_file_total_survives_completed_events() {
        let progress = ProgressBar::new(Some(3), false, true);
        progress.on_event(completed("a.jsonl"));
        progress.on_event(completed("b.jsonl"));

        let bar = progress.bar.as_ref().unwrap();
        assert_eq!(bar.prefix(), "from 3 file(s)");
        assert_eq!(bar.message(), "b.jsonl");
        assert_eq!(bar.position(), 2);
    }

    #[test]
    fn test_quiet_has_no_bar() {
        let progress = ProgressBar::new(Some(3), true, true);
        progress.on_event(completed("a.jsonl"));
        assert!(progress.bar.is_none());
    }
}
