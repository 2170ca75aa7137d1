//! Expression classifier network.
//!
//! A three-layer perceptron over the 51 blend-shape scores:
//! `51 -> 32 (ReLU) -> 16 (ReLU) -> 5`. The output layer has no activation;
//! callers apply softmax or argmax to the logits themselves.

// Allow common ML code patterns
#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::Linear;
use rand::Rng;
use tracing::debug;

use crate::domain::{Logits, Prediction, EXPRESSION_COUNT};
use crate::error::{ModelError, ShapeError};

/// Number of input features.
pub const INPUT_FEATURES: usize = 51;
/// Width of the first hidden layer.
pub const HIDDEN1_SIZE: usize = 32;
/// Width of the second hidden layer.
pub const HIDDEN2_SIZE: usize = 16;

/// Layer names with their `(in, out)` sizes, in evaluation order.
pub const LAYERS: [(&str, usize, usize); 3] = [
    ("fc1", INPUT_FEATURES, HIDDEN1_SIZE),
    ("fc2", HIDDEN1_SIZE, HIDDEN2_SIZE),
    ("fc3", HIDDEN2_SIZE, EXPRESSION_COUNT),
];

/// Weight and bias of one fully-connected layer.
///
/// `weight` is stored as `[out x in]`, `bias` as `[out]`.
#[derive(Debug, Clone)]
pub struct LayerParams {
    pub weight: Tensor,
    pub bias: Tensor,
}

impl LayerParams {
    /// Wraps existing tensors. Shapes are checked when the network is built.
    #[must_use]
    pub const fn new(weight: Tensor, bias: Tensor) -> Self {
        Self { weight, bias }
    }

    /// Builds a layer from row-major weight values.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `weight.len() != out * in` or
    /// `bias.len() != out`.
    pub fn from_vec(
        weight: Vec<f32>,
        bias: Vec<f32>,
        (out_dim, in_dim): (usize, usize),
        device: &Device,
    ) -> Result<Self, ModelError> {
        if weight.len() != out_dim * in_dim {
            return Err(ShapeError::new("weight", &[out_dim * in_dim], &[weight.len()]).into());
        }
        if bias.len() != out_dim {
            return Err(ShapeError::new("bias", &[out_dim], &[bias.len()]).into());
        }
        Ok(Self {
            weight: Tensor::from_vec(weight, (out_dim, in_dim), device)?,
            bias: Tensor::from_vec(bias, out_dim, device)?,
        })
    }

    /// An all-zero layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensors cannot be allocated on `device`.
    pub fn zeros((out_dim, in_dim): (usize, usize), device: &Device) -> Result<Self, ModelError> {
        Ok(Self {
            weight: Tensor::zeros((out_dim, in_dim), DType::F32, device)?,
            bias: Tensor::zeros(out_dim, DType::F32, device)?,
        })
    }

    /// Uniform `U(-1/sqrt(in), 1/sqrt(in))` initialization for weight and bias.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensors cannot be allocated on `device`.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        (out_dim, in_dim): (usize, usize),
        device: &Device,
    ) -> Result<Self, ModelError> {
        let bound = 1.0 / (in_dim as f32).sqrt();
        let weight = (0..out_dim * in_dim)
            .map(|_| rng.random_range(-bound..bound))
            .collect();
        let bias = (0..out_dim)
            .map(|_| rng.random_range(-bound..bound))
            .collect();
        Self::from_vec(weight, bias, (out_dim, in_dim), device)
    }
}

/// The full parameter set of the network.
#[derive(Debug, Clone)]
pub struct ExpressionParams {
    pub fc1: LayerParams,
    pub fc2: LayerParams,
    pub fc3: LayerParams,
}

impl ExpressionParams {
    /// All weights and biases zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensors cannot be allocated on `device`.
    pub fn zeros(device: &Device) -> Result<Self, ModelError> {
        let [l1, l2, l3] = LAYERS.map(|(_, i, o)| (o, i));
        Ok(Self {
            fc1: LayerParams::zeros(l1, device)?,
            fc2: LayerParams::zeros(l2, device)?,
            fc3: LayerParams::zeros(l3, device)?,
        })
    }

    /// Randomly initialized parameters drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensors cannot be allocated on `device`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, device: &Device) -> Result<Self, ModelError> {
        let [l1, l2, l3] = LAYERS.map(|(_, i, o)| (o, i));
        Ok(Self {
            fc1: LayerParams::random(rng, l1, device)?,
            fc2: LayerParams::random(rng, l2, device)?,
            fc3: LayerParams::random(rng, l3, device)?,
        })
    }

    /// Takes `fc{1,2,3}.{weight,bias}` out of a loaded tensor map, converting to F32.
    ///
    /// Extra tensors are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingTensor`] if a required tensor is absent.
    pub fn from_tensors(mut tensors: HashMap<String, Tensor>) -> Result<Self, ModelError> {
        let mut take = |name: &str| -> Result<Tensor, ModelError> {
            let tensor = tensors
                .remove(name)
                .ok_or_else(|| ModelError::MissingTensor(name.to_string()))?;
            Ok(tensor.to_dtype(DType::F32)?)
        };

        Ok(Self {
            fc1: LayerParams::new(take("fc1.weight")?, take("fc1.bias")?),
            fc2: LayerParams::new(take("fc2.weight")?, take("fc2.bias")?),
            fc3: LayerParams::new(take("fc3.weight")?, take("fc3.bias")?),
        })
    }

    /// Named tensors suitable for writing to a safetensors file.
    #[must_use]
    pub fn to_tensors(&self) -> HashMap<String, Tensor> {
        self.layers()
            .into_iter()
            .zip(LAYERS)
            .flat_map(|(layer, (name, _, _))| {
                [
                    (format!("{name}.weight"), layer.weight.clone()),
                    (format!("{name}.bias"), layer.bias.clone()),
                ]
            })
            .collect()
    }

    const fn layers(&self) -> [&LayerParams; 3] {
        [&self.fc1, &self.fc2, &self.fc3]
    }
}

/// Intermediate values of one forward pass.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    /// First layer output before ReLU.
    pub pre_hidden1: Vec<f32>,
    /// First hidden layer after ReLU.
    pub hidden1: Vec<f32>,
    /// Second layer output before ReLU.
    pub pre_hidden2: Vec<f32>,
    /// Second hidden layer after ReLU.
    pub hidden2: Vec<f32>,
    /// Network output.
    pub logits: Logits,
}

/// Expression classifier.
///
/// Weights are immutable once built, so a single instance can be shared
/// across threads and called concurrently.
#[derive(Debug, Clone)]
pub struct ExpressionMlp {
    fc1: Linear,
    fc2: Linear,
    fc3: Linear,
    device: Device,
}

impl ExpressionMlp {
    /// Builds the network from parameters, moving them onto `device`.
    ///
    /// # Errors
    ///
    /// Returns a shape error naming the first tensor whose dimensions differ
    /// from the fixed architecture.
    pub fn new(params: ExpressionParams, device: &Device) -> Result<Self, ModelError> {
        let ExpressionParams { fc1, fc2, fc3 } = params;
        let [l1, l2, l3] = LAYERS;

        Ok(Self {
            fc1: build_linear(fc1, l1, device)?,
            fc2: build_linear(fc2, l2, device)?,
            fc3: build_linear(fc3, l3, device)?,
            device: device.clone(),
        })
    }

    /// Builds a randomly initialized network.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensors cannot be allocated on `device`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, device: &Device) -> Result<Self, ModelError> {
        Self::new(ExpressionParams::random(rng, device)?, device)
    }

    /// Builds the network from a loaded tensor map.
    ///
    /// # Errors
    ///
    /// Returns an error if a tensor is missing or has the wrong shape.
    pub fn from_tensors(
        tensors: HashMap<String, Tensor>,
        device: &Device,
    ) -> Result<Self, ModelError> {
        Self::new(ExpressionParams::from_tensors(tensors)?, device)
    }

    /// Returns a copy of the network parameters.
    ///
    /// Tensors are reference counted, so this does not copy weight data.
    ///
    /// # Errors
    ///
    /// Returns an error if a missing bias cannot be materialized.
    pub fn params(&self) -> Result<ExpressionParams, ModelError> {
        Ok(ExpressionParams {
            fc1: layer_params(&self.fc1)?,
            fc2: layer_params(&self.fc2)?,
            fc3: layer_params(&self.fc3)?,
        })
    }

    /// The device the weights live on.
    #[must_use]
    pub const fn device(&self) -> &Device {
        &self.device
    }

    /// Computes the logits for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `features` does not hold exactly
    /// [`INPUT_FEATURES`] values.
    pub fn forward(&self, features: &[f32]) -> Result<Logits, ModelError> {
        let x = self.input_tensor(features)?;
        let logits = Module::forward(self, &x)?;
        Ok(Logits::try_from(logits.squeeze(0)?.to_vec1::<f32>()?)?)
    }

    /// Computes the logits for a batch of feature vectors.
    ///
    /// # Errors
    ///
    /// Returns a shape error naming the first row of the wrong length.
    pub fn forward_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Logits>, ModelError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let mut data = Vec::with_capacity(batch.len() * INPUT_FEATURES);
        for (i, row) in batch.iter().enumerate() {
            if row.len() != INPUT_FEATURES {
                return Err(
                    ShapeError::new(format!("features[{i}]"), &[INPUT_FEATURES], &[row.len()])
                        .into(),
                );
            }
            data.extend_from_slice(row);
        }

        let x = Tensor::from_vec(data, (batch.len(), INPUT_FEATURES), &self.device)?;
        let out = Module::forward(self, &x)?.to_vec2::<f32>()?;
        out.into_iter()
            .map(|row| Logits::try_from(row).map_err(ModelError::from))
            .collect()
    }

    /// Classifies one feature vector.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `features` has the wrong length.
    pub fn predict(&self, features: &[f32]) -> Result<Prediction, ModelError> {
        self.forward(features).map(Prediction::from_logits)
    }

    /// Runs a forward pass and keeps every intermediate activation.
    ///
    /// # Errors
    ///
    /// Returns a shape error if `features` has the wrong length.
    pub fn trace(&self, features: &[f32]) -> Result<ForwardTrace, ModelError> {
        let x = self.input_tensor(features)?;

        let pre1 = self.fc1.forward(&x)?;
        let h1 = pre1.relu()?;
        let pre2 = self.fc2.forward(&h1)?;
        let h2 = pre2.relu()?;
        let out = self.fc3.forward(&h2)?;

        let row = |t: &Tensor| -> Result<Vec<f32>, ModelError> { Ok(t.squeeze(0)?.to_vec1()?) };
        Ok(ForwardTrace {
            pre_hidden1: row(&pre1)?,
            hidden1: row(&h1)?,
            pre_hidden2: row(&pre2)?,
            hidden2: row(&h2)?,
            logits: Logits::try_from(row(&out)?)?,
        })
    }

    fn input_tensor(&self, features: &[f32]) -> Result<Tensor, ModelError> {
        if features.len() != INPUT_FEATURES {
            return Err(ShapeError::new("features", &[INPUT_FEATURES], &[features.len()]).into());
        }
        Ok(Tensor::from_slice(
            features,
            (1, INPUT_FEATURES),
            &self.device,
        )?)
    }
}

impl Module for ExpressionMlp {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        // FC1 + ReLU
        let x = self.fc1.forward(x)?.relu()?;
        // FC2 + ReLU
        let x = self.fc2.forward(&x)?.relu()?;
        // FC3 (logit output)
        self.fc3.forward(&x)
    }
}

/// Checks a layer against its fixed shape and wraps it as a `Linear`.
fn build_linear(
    params: LayerParams,
    (name, in_dim, out_dim): (&str, usize, usize),
    device: &Device,
) -> Result<Linear, ModelError> {
    let LayerParams { weight, bias } = params;

    if weight.dims() != [out_dim, in_dim] {
        let expected = [out_dim, in_dim];
        return Err(ShapeError::new(format!("{name}.weight"), &expected, weight.dims()).into());
    }
    if bias.dims() != [out_dim] {
        return Err(ShapeError::new(format!("{name}.bias"), &[out_dim], bias.dims()).into());
    }
    debug!("{name}: {in_dim} -> {out_dim}");

    let weight = weight.to_dtype(DType::F32)?.to_device(device)?;
    let bias = bias.to_dtype(DType::F32)?.to_device(device)?;
    Ok(Linear::new(weight, Some(bias)))
}

fn layer_params(linear: &Linear) -> Result<LayerParams, ModelError> {
    let weight = linear.weight().clone();
    let bias = match linear.bias() {
        Some(b) => b.clone(),
        None => Tensor::zeros(weight.dim(0)?, DType::F32, weight.device())?,
    };
    Ok(LayerParams::new(weight, bias))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn zero_params() -> ExpressionParams {
        ExpressionParams::zeros(&Device::Cpu).unwrap()
    }

    fn seeded(seed: u64) -> ExpressionMlp {
        let mut rng = StdRng::seed_from_u64(seed);
        ExpressionMlp::random(&mut rng, &Device::Cpu).unwrap()
    }

    fn ramp() -> Vec<f32> {
        (0..INPUT_FEATURES).map(|i| i as f32 / 50.0).collect()
    }

    /// Weight matrix that copies the first `out` inputs through.
    fn passthrough(out_dim: usize, in_dim: usize) -> Vec<f32> {
        let mut w = vec![0.0; out_dim * in_dim];
        for r in 0..out_dim.min(in_dim) {
            w[r * in_dim + r] = 1.0;
        }
        w
    }

    #[test]
    fn test_forward_returns_five_logits() {
        let logits = seeded(1).forward(&ramp()).unwrap();
        assert_eq!(logits.as_slice().len(), EXPRESSION_COUNT);
        assert!(logits.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_forward_rejects_wrong_length() {
        let model = seeded(1);
        for len in [0, 1, 50, 52, 102] {
            let err = model.forward(&vec![0.5; len]).unwrap_err();
            let shape = err.as_shape().unwrap();
            assert_eq!(shape.tensor, "features");
            assert_eq!(shape.expected, vec![INPUT_FEATURES]);
            assert_eq!(shape.actual, vec![len]);
        }
    }

    #[test]
    fn test_forward_is_deterministic() {
        let model = seeded(42);
        let input = ramp();
        let a = model.forward(&input).unwrap();
        let b = model.forward(&input).unwrap();
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_same_seed_same_weights() {
        let input = ramp();
        let a = seeded(7).forward(&input).unwrap();
        let b = seeded(7).forward(&input).unwrap();
        let c = seeded(8).forward(&input).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_init_within_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = ExpressionParams::random(&mut rng, &Device::Cpu).unwrap();
        let bound = 1.0 / (INPUT_FEATURES as f32).sqrt();
        let weights = params.fc1.weight.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(weights.len(), HIDDEN1_SIZE * INPUT_FEATURES);
        assert!(weights.iter().all(|w| w.abs() <= bound));
    }

    #[test]
    fn test_all_zero_weights_give_zero_logits() {
        let model = ExpressionMlp::new(zero_params(), &Device::Cpu).unwrap();
        let logits = model.forward(&ramp()).unwrap();
        assert_eq!(logits, Logits([0.0; EXPRESSION_COUNT]));
    }

    #[test]
    fn test_output_bias_passes_through() {
        let mut params = zero_params();
        params.fc3 = LayerParams::from_vec(
            vec![0.0; EXPRESSION_COUNT * HIDDEN2_SIZE],
            vec![1.0, 0.0, 0.0, 0.0, 0.0],
            (EXPRESSION_COUNT, HIDDEN2_SIZE),
            &Device::Cpu,
        )
        .unwrap();
        let model = ExpressionMlp::new(params, &Device::Cpu).unwrap();

        let logits = model.forward(&ramp()).unwrap();
        assert_eq!(logits, Logits([1.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(logits.argmax(), crate::domain::Expression::Neutral);
    }

    #[test]
    fn test_relu_zeroes_negative_pre_activations() {
        let mut params = zero_params();
        let bias1: Vec<f32> = (0..HIDDEN1_SIZE)
            .map(|i| if i % 2 == 0 { -(i as f32) - 1.0 } else { i as f32 })
            .collect();
        params.fc1 = LayerParams::from_vec(
            vec![0.0; HIDDEN1_SIZE * INPUT_FEATURES],
            bias1,
            (HIDDEN1_SIZE, INPUT_FEATURES),
            &Device::Cpu,
        )
        .unwrap();
        params.fc2 = LayerParams::from_vec(
            passthrough(HIDDEN2_SIZE, HIDDEN1_SIZE),
            vec![-0.25; HIDDEN2_SIZE],
            (HIDDEN2_SIZE, HIDDEN1_SIZE),
            &Device::Cpu,
        )
        .unwrap();
        let model = ExpressionMlp::new(params, &Device::Cpu).unwrap();

        let trace = model.trace(&ramp()).unwrap();
        assert!(trace.pre_hidden1.iter().any(|v| *v < 0.0));
        for (pre, post) in trace.pre_hidden1.iter().zip(&trace.hidden1) {
            if *pre < 0.0 {
                assert_eq!(*post, 0.0);
            } else {
                assert_eq!(post, pre);
            }
        }
        for (pre, post) in trace.pre_hidden2.iter().zip(&trace.hidden2) {
            assert_eq!(*post, pre.max(0.0));
        }
        assert_eq!(trace.hidden1.len(), HIDDEN1_SIZE);
        assert_eq!(trace.hidden2.len(), HIDDEN2_SIZE);
    }

    #[test]
    fn test_trace_matches_forward() {
        let model = seeded(11);
        let input = ramp();
        assert_eq!(model.trace(&input).unwrap().logits, model.forward(&input).unwrap());
    }

    #[test]
    fn test_positive_scaling_without_bias_scales_logits() {
        let mut params = zero_params();
        params.fc1 = LayerParams::from_vec(
            passthrough(HIDDEN1_SIZE, INPUT_FEATURES),
            vec![0.0; HIDDEN1_SIZE],
            (HIDDEN1_SIZE, INPUT_FEATURES),
            &Device::Cpu,
        )
        .unwrap();
        params.fc2 = LayerParams::from_vec(
            passthrough(HIDDEN2_SIZE, HIDDEN1_SIZE),
            vec![0.0; HIDDEN2_SIZE],
            (HIDDEN2_SIZE, HIDDEN1_SIZE),
            &Device::Cpu,
        )
        .unwrap();
        let w3: Vec<f32> = (0..EXPRESSION_COUNT * HIDDEN2_SIZE)
            .map(|i| if i % 3 == 0 { -0.5 } else { 0.25 })
            .collect();
        params.fc3 = LayerParams::from_vec(
            w3,
            vec![0.0; EXPRESSION_COUNT],
            (EXPRESSION_COUNT, HIDDEN2_SIZE),
            &Device::Cpu,
        )
        .unwrap();
        let model = ExpressionMlp::new(params, &Device::Cpu).unwrap();

        let input = ramp();
        let k = 3.0f32;
        let scaled: Vec<f32> = input.iter().map(|v| v * k).collect();

        let base = model.forward(&input).unwrap();
        let out = model.forward(&scaled).unwrap();
        assert!(base.as_slice().iter().any(|v| *v < 0.0));
        for (b, s) in base.as_slice().iter().zip(out.as_slice()) {
            assert!((b * k - s).abs() <= 1e-4 * s.abs().max(1.0), "{b} * {k} != {s}");
        }
    }

    #[test]
    fn test_new_rejects_wrong_weight_shape() {
        let mut params = zero_params();
        params.fc1 = LayerParams::zeros((HIDDEN1_SIZE, 50), &Device::Cpu).unwrap();
        let err = ExpressionMlp::new(params, &Device::Cpu).unwrap_err();
        assert_eq!(
            err.as_shape().unwrap(),
            &ShapeError::new("fc1.weight", &[32, 51], &[32, 50])
        );
    }

    #[test]
    fn test_new_rejects_transposed_weight() {
        let mut params = zero_params();
        params.fc2 = LayerParams::zeros((HIDDEN1_SIZE, HIDDEN2_SIZE), &Device::Cpu).unwrap();
        params.fc2.bias = Tensor::zeros(HIDDEN2_SIZE, DType::F32, &Device::Cpu).unwrap();
        let err = ExpressionMlp::new(params, &Device::Cpu).unwrap_err();
        assert_eq!(err.as_shape().unwrap().tensor, "fc2.weight");
    }

    #[test]
    fn test_new_rejects_wrong_bias_shape() {
        let mut params = zero_params();
        params.fc3.bias = Tensor::zeros(4, DType::F32, &Device::Cpu).unwrap();
        let err = ExpressionMlp::new(params, &Device::Cpu).unwrap_err();
        assert_eq!(
            err.as_shape().unwrap(),
            &ShapeError::new("fc3.bias", &[5], &[4])
        );
    }

    #[test]
    fn test_from_vec_checks_lengths() {
        let err = LayerParams::from_vec(vec![0.0; 10], vec![0.0; 5], (5, 16), &Device::Cpu)
            .unwrap_err();
        assert_eq!(err.as_shape().unwrap().tensor, "weight");

        let err = LayerParams::from_vec(vec![0.0; 80], vec![0.0; 4], (5, 16), &Device::Cpu)
            .unwrap_err();
        assert_eq!(err.as_shape().unwrap().tensor, "bias");
    }

    #[test]
    fn test_tensor_round_trip_preserves_output() {
        let model = seeded(5);
        let tensors = model.params().unwrap().to_tensors();
        let rebuilt = ExpressionMlp::from_tensors(tensors, &Device::Cpu).unwrap();
        let input = ramp();
        assert_eq!(model.forward(&input).unwrap(), rebuilt.forward(&input).unwrap());
    }

    #[test]
    fn test_from_tensors_reports_missing() {
        let mut tensors = zero_params().to_tensors();
        assert_eq!(tensors.len(), 6);
        tensors.remove("fc2.bias");
        let err = ExpressionMlp::from_tensors(tensors, &Device::Cpu).unwrap_err();
        assert!(matches!(err, ModelError::MissingTensor(ref n) if n == "fc2.bias"));
    }

    #[test]
    fn test_from_tensors_converts_f64() {
        let tensors: HashMap<String, Tensor> = zero_params()
            .to_tensors()
            .into_iter()
            .map(|(k, v)| (k, v.to_dtype(DType::F64).unwrap()))
            .collect();
        let model = ExpressionMlp::from_tensors(tensors, &Device::Cpu).unwrap();
        assert_eq!(model.forward(&ramp()).unwrap(), Logits([0.0; EXPRESSION_COUNT]));
    }

    #[test]
    fn test_forward_batch_matches_single() {
        let model = seeded(9);
        let a = ramp();
        let b: Vec<f32> = a.iter().rev().copied().collect();
        let batch = model.forward_batch(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(batch.len(), 2);
        for (batched, single) in batch.iter().zip([model.forward(&a), model.forward(&b)]) {
            let single = single.unwrap();
            for (x, y) in batched.as_slice().iter().zip(single.as_slice()) {
                assert!((x - y).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_forward_batch_reports_bad_row() {
        let model = seeded(9);
        let err = model
            .forward_batch(&[ramp(), vec![0.0; 3]])
            .unwrap_err();
        assert_eq!(err.as_shape().unwrap().tensor, "features[1]");
        assert!(model.forward_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let model = seeded(13);
        let input = ramp();
        let expected = model.forward(&input).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| model.forward(&input).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
