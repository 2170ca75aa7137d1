//! Logits and the decision rule applied to them.

use serde::{Deserialize, Serialize};

use super::expression::{Expression, EXPRESSION_COUNT};
use crate::error::ShapeError;

/// Raw, unnormalized network output in [`Expression`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Logits(pub [f32; EXPRESSION_COUNT]);

impl Logits {
    /// Returns the logits as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Returns the logit for a class.
    #[must_use]
    pub const fn get(&self, expression: Expression) -> f32 {
        self.0[expression.index()]
    }

    /// Softmax over the logits, shifted by the maximum for stability.
    #[must_use]
    pub fn softmax(&self) -> [f32; EXPRESSION_COUNT] {
        let max = self.0.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut exp = self.0.map(|v| (v - max).exp());
        let sum: f32 = exp.iter().sum();
        for v in &mut exp {
            *v /= sum;
        }
        exp
    }

    /// Class with the highest logit. The first maximum wins on ties.
    #[must_use]
    pub fn argmax(&self) -> Expression {
        let mut best = 0;
        for (i, v) in self.0.iter().enumerate().skip(1) {
            if *v > self.0[best] {
                best = i;
            }
        }
        Expression::ALL[best]
    }
}

impl TryFrom<Vec<f32>> for Logits {
    type Error = ShapeError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        let len = values.len();
        <[f32; EXPRESSION_COUNT]>::try_from(values)
            .map(Self)
            .map_err(|_| ShapeError::new("logits", &[EXPRESSION_COUNT], &[len]))
    }
}

/// A classified expression with its probability distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Most likely expression.
    pub expression: Expression,
    /// Probability of `expression` (0.0 to 1.0).
    pub confidence: f32,
    /// Softmax probabilities in [`Expression`] order.
    pub probabilities: [f32; EXPRESSION_COUNT],
    /// Raw network output.
    pub logits: Logits,
}

impl Prediction {
    /// Applies softmax and argmax to a logit vector.
    #[must_use]
    pub fn from_logits(logits: Logits) -> Self {
        let probabilities = logits.softmax();
        let expression = logits.argmax();
        Self {
            expression,
            confidence: probabilities[expression.index()],
            probabilities,
            logits,
        }
    }
}
