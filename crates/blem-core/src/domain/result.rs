//! Input samples and per-sample classification results.

use serde::{Deserialize, Serialize};

use super::{Expression, Prediction};

/// One feature vector read from a source, with an optional ground-truth label.
#[derive(Debug, Clone)]
pub struct FeatureSample {
    /// Where the sample came from (file path, `stdin`, ...).
    pub source: String,
    /// Position of the sample within its source (0-based).
    pub index: usize,
    /// Feature values in blend-shape order.
    pub features: Vec<f32>,
    /// Recorded expression, if the source is labeled.
    pub label: Option<Expression>,
}

impl FeatureSample {
    /// Creates an unlabeled sample.
    #[must_use]
    pub fn new(source: impl Into<String>, index: usize, features: Vec<f32>) -> Self {
        Self {
            source: source.into(),
            index,
            features,
            label: None,
        }
    }

    /// Attaches a ground-truth label.
    #[must_use]
    pub const fn with_label(mut self, label: Option<Expression>) -> Self {
        self.label = label;
        self
    }
}

/// Classification result for a single sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Where the sample came from.
    pub source: String,
    /// Position of the sample within its source.
    pub index: usize,
    /// Timestamp of classification (ISO 8601).
    pub timestamp: String,
    /// Predicted expression and distribution.
    #[serde(flatten)]
    pub prediction: Prediction,
    /// Ground-truth label, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Expression>,
}

impl ClassificationResult {
    /// Whether the prediction matches the label; `None` for unlabeled samples.
    #[must_use]
    pub fn correct(&self) -> Option<bool> {
        self.label.map(|l| l == self.prediction.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Logits;

    fn result(label: Option<Expression>) -> ClassificationResult {
        ClassificationResult {
            source: "session.jsonl".into(),
            index: 3,
            timestamp: "2024-01-01T00:00:00Z".into(),
            prediction: Prediction::from_logits(Logits([0.0, 2.0, 0.0, 0.0, 0.0])),
            label,
        }
    }

    #[test]
    fn test_correct() {
        assert_eq!(result(None).correct(), None);
        assert_eq!(result(Some(Expression::Happy)).correct(), Some(true));
        assert_eq!(result(Some(Expression::Sad)).correct(), Some(false));
    }

    #[test]
    fn test_serialized_fields_are_flat() {
        let value = serde_json::to_value(result(Some(Expression::Happy))).unwrap_or_default();
        assert_eq!(value["expression"], "happy");
        assert_eq!(value["label"], "happy");
        assert_eq!(value["logits"].as_array().map(Vec::len), Some(5));
        assert_eq!(value["probabilities"].as_array().map(Vec::len), Some(5));

        let value = serde_json::to_value(result(None)).unwrap_or_default();
        assert!(value.get("label").is_none());
    }
}
