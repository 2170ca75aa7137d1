//! Core domain types for expression classification.

mod expression;
mod prediction;
mod result;

pub use expression::{Expression, EXPRESSION_COUNT};
pub use prediction::{Logits, Prediction};
pub use result::{ClassificationResult, FeatureSample};
