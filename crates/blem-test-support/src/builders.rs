//! Builders for feature vectors and network parameters.

use blem_core::domain::{Expression, FeatureSample, EXPRESSION_COUNT};
use blem_core::features::feature_index;
use blem_core::inference::{ExpressionParams, LayerParams, HIDDEN1_SIZE, HIDDEN2_SIZE};
use blem_core::INPUT_FEATURES;
use candle_core::Device;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builder for blend-shape feature vectors.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    values: Vec<f32>,
    label: Option<Expression>,
}

impl FeatureBuilder {
    /// All 51 scores zero.
    #[must_use]
    pub fn zeros() -> Self {
        Self::constant(0.0)
    }

    /// All 51 scores set to `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            values: vec![value; INPUT_FEATURES],
            label: None,
        }
    }

    /// Uniform random scores in `0.0..1.0`, reproducible from `seed`.
    #[must_use]
    pub fn random(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            values: (0..INPUT_FEATURES).map(|_| rng.random::<f32>()).collect(),
            label: None,
        }
    }

    /// A vector of arbitrary length, for shape-error tests.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            values: vec![0.5; len],
            label: None,
        }
    }

    /// Sets one blend shape by name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a network input.
    #[must_use]
    pub fn with(mut self, name: &str, score: f32) -> Self {
        let idx = feature_index(name).unwrap_or_else(|| panic!("unknown blend shape '{name}'"));
        self.values[idx] = score;
        self
    }

    /// Attaches a ground-truth label.
    #[must_use]
    pub const fn labeled(mut self, label: Expression) -> Self {
        self.label = Some(label);
        self
    }

    /// Returns the feature values.
    #[must_use]
    pub fn build(self) -> Vec<f32> {
        self.values
    }

    /// Wraps the values as a sample.
    #[must_use]
    pub fn sample(self, source: &str, index: usize) -> FeatureSample {
        FeatureSample::new(source, index, self.values).with_label(self.label)
    }
}

/// Builder for network parameters with hand-picked values.
///
/// Starts from all zeros; individual layers can be replaced.
#[derive(Debug, Clone)]
pub struct ParamsBuilder {
    fc1: (Vec<f32>, Vec<f32>),
    fc2: (Vec<f32>, Vec<f32>),
    fc3: (Vec<f32>, Vec<f32>),
}

impl Default for ParamsBuilder {
    fn default() -> Self {
        Self::zeros()
    }
}

impl ParamsBuilder {
    /// All weights and biases zero.
    #[must_use]
    pub fn zeros() -> Self {
        Self {
            fc1: (vec![0.0; HIDDEN1_SIZE * INPUT_FEATURES], vec![0.0; HIDDEN1_SIZE]),
            fc2: (vec![0.0; HIDDEN2_SIZE * HIDDEN1_SIZE], vec![0.0; HIDDEN2_SIZE]),
            fc3: (vec![0.0; EXPRESSION_COUNT * HIDDEN2_SIZE], vec![0.0; EXPRESSION_COUNT]),
        }
    }

    /// Sets the output-layer bias.
    #[must_use]
    pub fn output_bias(mut self, bias: [f32; EXPRESSION_COUNT]) -> Self {
        self.fc3.1 = bias.to_vec();
        self
    }

    /// Routes one blend shape to one expression.
    ///
    /// Uses hidden unit `unit` of both hidden layers as a positive
    /// pass-through, so the logit of `expression` grows with the score of
    /// blend shape `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is unknown or `unit >= 16`.
    #[must_use]
    pub fn route(mut self, name: &str, expression: Expression, unit: usize) -> Self {
        assert!(unit < HIDDEN2_SIZE, "hidden unit {unit} out of range");
        let feature = feature_index(name).unwrap_or_else(|| panic!("unknown blend shape '{name}'"));
        self.fc1.0[unit * INPUT_FEATURES + feature] = 1.0;
        self.fc2.0[unit * HIDDEN1_SIZE + unit] = 1.0;
        self.fc3.0[expression.index() * HIDDEN2_SIZE + unit] = 10.0;
        self
    }

    /// Builds the parameters on the CPU.
    ///
    /// # Errors
    ///
    /// Returns an error if tensor construction fails.
    pub fn build(self) -> anyhow::Result<ExpressionParams> {
        let device = Device::Cpu;
        Ok(ExpressionParams {
            fc1: LayerParams::from_vec(
                self.fc1.0,
                self.fc1.1,
                (HIDDEN1_SIZE, INPUT_FEATURES),
                &device,
            )?,
            fc2: LayerParams::from_vec(
                self.fc2.0,
                self.fc2.1,
                (HIDDEN2_SIZE, HIDDEN1_SIZE),
                &device,
            )?,
            fc3: LayerParams::from_vec(
                self.fc3.0,
                self.fc3.1,
                (EXPRESSION_COUNT, HIDDEN2_SIZE),
                &device,
            )?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use blem_core::ExpressionMlp;

    #[test]
    fn test_feature_builder_sets_named_score() {
        let features = FeatureBuilder::zeros().with("jawOpen", 0.7).build();
        assert_eq!(features.len(), INPUT_FEATURES);
        assert!((features[24] - 0.7).abs() < f32::EPSILON);
        assert_eq!(features.iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn test_random_is_reproducible() {
        assert_eq!(FeatureBuilder::random(4).build(), FeatureBuilder::random(4).build());
    }

    #[test]
    fn test_routed_params_pick_expression() {
        let params = ParamsBuilder::zeros()
            .route("mouthSmileLeft", Expression::Happy, 0)
            .route("jawOpen", Expression::Shocked, 1)
            .output_bias([0.5, 0.0, 0.0, 0.0, 0.0])
            .build()
            .unwrap();
        let model = ExpressionMlp::new(params, &Device::Cpu).unwrap();

        let neutral = model.predict(&FeatureBuilder::zeros().build()).unwrap();
        assert_eq!(neutral.expression, Expression::Neutral);

        let smile = FeatureBuilder::zeros().with("mouthSmileLeft", 0.9).build();
        assert_eq!(model.predict(&smile).unwrap().expression, Expression::Happy);

        let gasp = FeatureBuilder::zeros().with("jawOpen", 0.8).build();
        assert_eq!(model.predict(&gasp).unwrap().expression, Expression::Shocked);
    }
}
