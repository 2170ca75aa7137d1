//! Test support utilities for blem.
//!
//! Provides mocks for the core ports and builders for feature vectors and
//! network parameters.
//!
//! # Example
//!
//! ```
//! use blem_test_support::{FeatureBuilder, MockFeatureSource};
//!
//! let smile = FeatureBuilder::zeros()
//!     .with("mouthSmileLeft", 0.9)
//!     .with("mouthSmileRight", 0.9)
//!     .sample("smile.jsonl", 0);
//! let source = MockFeatureSource::new(vec![smile]);
//! ```

mod builders;
mod mocks;

pub use builders::{FeatureBuilder, ParamsBuilder};
pub use mocks::{MockFeatureSource, MockProgressSink, MockResultOutput};
