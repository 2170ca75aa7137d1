//! BLEM Core - expression classification over facial blend-shape features
//!
//! This crate contains the domain types, the blend-shape feature layout, the
//! three-layer expression network and the ports used by adapters.

pub mod domain;
pub mod error;
pub mod features;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use domain::{
    ClassificationResult, Expression, FeatureSample, Logits, Prediction, EXPRESSION_COUNT,
};
pub use error::{ModelError, ShapeError};
pub use features::{extract_features, BlendShape, BLENDSHAPE_NAMES};
pub use inference::{
    get_device, ExpressionMlp, ExpressionParams, ExpressionTracker, ForwardTrace, LayerParams,
    HIDDEN1_SIZE, HIDDEN2_SIZE, INPUT_FEATURES,
};
pub use pipeline::{RunOptions, RunSummary};
pub use ports::{FeatureSource, ProgressEvent, ProgressSink, ResultOutput};
