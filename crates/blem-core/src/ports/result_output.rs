//! Result output port for writing classification results.

use crate::domain::ClassificationResult;

/// Port for outputting classification results.
pub trait ResultOutput: Send + Sync {
    /// Writes a single classification result.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, result: &ClassificationResult) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
