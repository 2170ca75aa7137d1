//! Tracks the expression over a stream of predictions.

use tracing::info;

use crate::domain::{Expression, Prediction};

/// Remembers the last predicted expression and reports changes.
#[derive(Debug, Clone, Default)]
pub struct ExpressionTracker {
    current: Option<Expression>,
}

impl ExpressionTracker {
    /// Creates a tracker with no expression seen yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Records a prediction. Returns `true` if the expression changed.
    ///
    /// The first prediction always counts as a change.
    pub fn observe(&mut self, prediction: &Prediction) -> bool {
        if self.current == Some(prediction.expression) {
            return false;
        }
        self.current = Some(prediction.expression);
        info!(
            "Expression changed to {} ({:.1}% confidence)",
            prediction.expression,
            prediction.confidence * 100.0
        );
        true
    }

    /// The last observed expression.
    #[must_use]
    pub const fn current(&self) -> Option<Expression> {
        self.current
    }

    /// Forgets the last observed expression.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Logits, EXPRESSION_COUNT};

    fn predict(expression: Expression) -> Prediction {
        let mut logits = [0.0; EXPRESSION_COUNT];
        logits[expression.index()] = 3.0;
        Prediction::from_logits(Logits(logits))
    }

    #[test]
    fn test_first_observation_is_change() {
        let mut tracker = ExpressionTracker::new();
        assert!(tracker.current().is_none());
        assert!(tracker.observe(&predict(Expression::Neutral)));
        assert_eq!(tracker.current(), Some(Expression::Neutral));
    }

    #[test]
    fn test_repeats_are_not_changes() {
        let mut tracker = ExpressionTracker::new();
        let changes: Vec<bool> = [
            Expression::Happy,
            Expression::Happy,
            Expression::Shocked,
            Expression::Shocked,
            Expression::Happy,
        ]
        .into_iter()
        .map(|e| tracker.observe(&predict(e)))
        .collect();
        assert_eq!(changes, vec![true, false, true, false, true]);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ExpressionTracker::new();
        tracker.observe(&predict(Expression::Sad));
        tracker.reset();
        assert!(tracker.observe(&predict(Expression::Sad)));
    }
}
