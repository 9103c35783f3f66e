//! Feature encoders: `image_batch -> embedding`
//!
//! The classifier only depends on the [`FeatureEncoder`] capability, so the
//! backbone can be swapped without touching the heads or the loss.

use super::Linear;
use crate::autograd::{relu, Tensor};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Shared feature extractor in front of the rank heads
pub trait FeatureEncoder {
    /// Short identifier stored in checkpoints
    fn name(&self) -> &str;

    /// Width of one input row
    fn input_dim(&self) -> usize;

    /// Width of one embedding row
    fn embed_dim(&self) -> usize;

    /// Embed a `[batch_size * input_dim]` tensor
    ///
    /// May fail with [`Error::ResourceExhausted`] when the batch does not fit.
    fn forward(&self, images: &Tensor, batch_size: usize) -> Result<Tensor>;

    /// Trainable tensors with stable names
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)>;
}

fn check_input(images: &Tensor, batch_size: usize, input_dim: usize) -> Result<()> {
    if images.len() != batch_size * input_dim {
        return Err(Error::ShapeMismatch {
            context: "encoder input".into(),
            expected: batch_size * input_dim,
            actual: images.len(),
        });
    }
    Ok(())
}

/// Trainable dense layer + ReLU
pub struct LinearEncoder {
    layer: Linear,
}

impl LinearEncoder {
    pub fn new(input_dim: usize, embed_dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self { layer: Linear::new(input_dim, embed_dim, &mut rng) }
    }
}

impl FeatureEncoder for LinearEncoder {
    fn name(&self) -> &str {
        "linear"
    }

    fn input_dim(&self) -> usize {
        self.layer.in_features()
    }

    fn embed_dim(&self) -> usize {
        self.layer.out_features()
    }

    fn forward(&self, images: &Tensor, batch_size: usize) -> Result<Tensor> {
        check_input(images, batch_size, self.input_dim())?;
        Ok(relu(&self.layer.forward(images, batch_size)))
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        vec![
            ("encoder.weight".to_string(), &self.layer.weight),
            ("encoder.bias".to_string(), &self.layer.bias),
        ]
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        vec![
            ("encoder.weight".to_string(), &mut self.layer.weight),
            ("encoder.bias".to_string(), &mut self.layer.bias),
        ]
    }
}

/// Frozen encoder for inputs that already are embeddings
pub struct PassthroughEncoder {
    dim: usize,
}

impl PassthroughEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl FeatureEncoder for PassthroughEncoder {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn input_dim(&self) -> usize {
        self.dim
    }

    fn embed_dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, images: &Tensor, batch_size: usize) -> Result<Tensor> {
        check_input(images, batch_size, self.dim)?;
        Ok(images.clone())
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        Vec::new()
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        Vec::new()
    }
}
