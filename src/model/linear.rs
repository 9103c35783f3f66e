//! Dense layer with Xavier-uniform initialisation

use crate::autograd::{add_bias, matmul, Tensor};
use rand::rngs::StdRng;
use rand::Rng;

/// Linear projection `x @ W + b`
///
/// Weight shape: `[in_features, out_features]` flattened row-major.
pub struct Linear {
    /// Weight `[in_features * out_features]`
    pub weight: Tensor,
    /// Bias `[out_features]`
    pub bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Xavier uniform: U(-sqrt(6/(fan_in+fan_out)), sqrt(6/(fan_in+fan_out)))
    pub fn new(in_features: usize, out_features: usize, rng: &mut StdRng) -> Self {
        let scale = (6.0 / (in_features + out_features).max(1) as f32).sqrt();
        let weight_data: Vec<f32> = (0..in_features * out_features)
            .map(|_| rng.random_range(-scale..=scale))
            .collect();

        Self {
            weight: Tensor::from_vec(weight_data, true),
            bias: Tensor::zeros(out_features, true),
            in_features,
            out_features,
        }
    }

    /// `x` is `[batch_size * in_features]`; returns `[batch_size * out_features]`
    pub fn forward(&self, x: &Tensor, batch_size: usize) -> Tensor {
        let projected = matmul(x, &self.weight, batch_size, self.in_features, self.out_features);
        add_bias(&projected, &self.bias, batch_size, self.out_features)
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }

    pub fn num_parameters(&self) -> usize {
        self.in_features * self.out_features + self.out_features
    }
}
