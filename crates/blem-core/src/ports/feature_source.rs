//! Feature source port for reading blend-shape samples.

use crate::domain::FeatureSample;

/// Port for loading feature samples from a source.
pub trait FeatureSource: Send + Sync {
    /// Returns an iterator over samples from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a record fails to parse.
    fn samples(&self) -> Box<dyn Iterator<Item = anyhow::Result<FeatureSample>> + Send + '_>;

    /// Returns the number of inputs (files, streams) behind this source, if known.
    fn count_hint(&self) -> Option<usize>;
}
