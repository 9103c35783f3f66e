//! Shared encoder + one independent linear head per rank

use super::{FeatureEncoder, Linear};
use crate::autograd::{argmax, backward, is_grad_enabled, Tensor};
use crate::taxonomy::{LabelVector, Rank, TaxonomyTree, RANK_COUNT};
use crate::train::HierarchicalBatch;
use crate::{Error, Result};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parameter tensor with its stable name, as stored in checkpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParam {
    pub name: String,
    pub data: Vec<f32>,
}

/// Per-rank logits for one batch
///
/// Every rank's tensor is `[batch_size * rank_size]`, row-major. The heads
/// read the embedding through a detached leaf, so the embedding gradient is
/// accumulated once across all seven heads before it reaches the encoder.
pub struct HierarchicalLogits {
    logits: BTreeMap<Rank, Tensor>,
    sizes: [usize; RANK_COUNT],
    batch_size: usize,
    embedding: Tensor,
    shared: Tensor,
}

impl HierarchicalLogits {
    /// Assemble from raw per-rank tensors (no encoder attached)
    pub fn from_parts(logits: BTreeMap<Rank, Tensor>, batch_size: usize) -> Result<Self> {
        let mut sizes = [0; RANK_COUNT];
        for rank in Rank::ALL {
            let tensor = logits.get(&rank).ok_or_else(|| Error::ShapeMismatch {
                context: format!("{rank} logits"),
                expected: 1,
                actual: 0,
            })?;
            if batch_size == 0 || tensor.len() % batch_size != 0 {
                return Err(Error::ShapeMismatch {
                    context: format!("{rank} logits batch"),
                    expected: batch_size,
                    actual: tensor.len(),
                });
            }
            sizes[rank.index()] = tensor.len() / batch_size;
        }
        let embedding = Tensor::zeros(0, false);
        let shared = embedding.clone();
        Ok(Self { logits, sizes, batch_size, embedding, shared })
    }

    pub fn get(&self, rank: Rank) -> &Tensor {
        &self.logits[&rank]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rank, &Tensor)> {
        self.logits.iter().map(|(r, t)| (*r, t))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Label count of a rank's head
    pub fn classes(&self, rank: Rank) -> usize {
        self.sizes[rank.index()]
    }

    pub fn sizes(&self) -> [usize; RANK_COUNT] {
        self.sizes
    }

    /// One sample's logits at a rank
    pub fn row(&self, rank: Rank, sample: usize) -> &[f32] {
        let n = self.classes(rank);
        &self.get(rank).as_slice()[sample * n..(sample + 1) * n]
    }

    /// Per-sample argmax at every rank (first maximum wins ties)
    pub fn argmax_labels(&self) -> Vec<LabelVector> {
        (0..self.batch_size)
            .map(|i| {
                let mut idx = [0; RANK_COUNT];
                for rank in Rank::ALL {
                    idx[rank.index()] = argmax(self.row(rank, i));
                }
                LabelVector::new(idx)
            })
            .collect()
    }
}

/// Shared feature encoder followed by seven parallel rank heads
///
/// Heads never see each other's logits; lineage consistency is left to the loss.
pub struct HierarchicalClassifier {
    encoder: Box<dyn FeatureEncoder>,
    heads: BTreeMap<Rank, Linear>,
    activation_budget: Option<usize>,
}

impl HierarchicalClassifier {
    /// Build heads sized to `rank_sizes`, Xavier-initialised from `seed`
    pub fn new(
        encoder: Box<dyn FeatureEncoder>,
        rank_sizes: [usize; RANK_COUNT],
        seed: u64,
    ) -> Result<Self> {
        if encoder.embed_dim() == 0 {
            return Err(Error::ConfigError("encoder embedding width must be positive".into()));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut heads = BTreeMap::new();
        for rank in Rank::ALL {
            let classes = rank_sizes[rank.index()];
            if classes == 0 {
                return Err(Error::ConfigError(format!("rank {rank} has no labels")));
            }
            heads.insert(rank, Linear::new(encoder.embed_dim(), classes, &mut rng));
        }
        Ok(Self { encoder, heads, activation_budget: None })
    }

    /// Heads sized from the taxonomy
    pub fn from_tree(encoder: Box<dyn FeatureEncoder>, tree: &TaxonomyTree, seed: u64) -> Result<Self> {
        Self::new(encoder, tree.rank_sizes(), seed)
    }

    /// Fail batches whose activations exceed `elements` with `ResourceExhausted`
    pub fn with_activation_budget(mut self, elements: Option<usize>) -> Self {
        self.activation_budget = elements;
        self
    }

    pub fn encoder(&self) -> &dyn FeatureEncoder {
        self.encoder.as_ref()
    }

    pub fn input_dim(&self) -> usize {
        self.encoder.input_dim()
    }

    pub fn embed_dim(&self) -> usize {
        self.encoder.embed_dim()
    }

    pub fn rank_sizes(&self) -> [usize; RANK_COUNT] {
        let mut sizes = [0; RANK_COUNT];
        for (rank, head) in &self.heads {
            sizes[rank.index()] = head.out_features();
        }
        sizes
    }

    pub fn forward(&self, batch: &HierarchicalBatch) -> Result<HierarchicalLogits> {
        self.forward_inputs(&batch.inputs(), batch.size())
    }

    /// Forward a flattened `[batch_size * input_dim]` tensor
    pub fn forward_inputs(&self, images: &Tensor, batch_size: usize) -> Result<HierarchicalLogits> {
        if let Some(budget) = self.activation_budget {
            let per_sample = self.embed_dim() + self.rank_sizes().iter().sum::<usize>();
            if batch_size * per_sample > budget {
                return Err(Error::ResourceExhausted { batch_size });
            }
        }

        let embedding = self.encoder.forward(images, batch_size)?;
        let shared = embedding.detach(is_grad_enabled());

        let logits = self
            .heads
            .iter()
            .map(|(rank, head)| (*rank, head.forward(&shared, batch_size)))
            .collect();

        Ok(HierarchicalLogits { logits, sizes: self.rank_sizes(), batch_size, embedding, shared })
    }

    /// Backpropagate `loss` through the heads, then once through the encoder
    pub fn backward(&self, logits: &HierarchicalLogits, loss: &mut Tensor) {
        backward(loss, None);
        if let Some(grad) = logits.shared.grad() {
            if logits.embedding.requires_grad() {
                let mut embedding = logits.embedding.clone();
                backward(&mut embedding, Some(grad));
            }
        }
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params: Vec<&mut Tensor> =
            self.encoder.named_parameters_mut().into_iter().map(|(_, t)| t).collect();
        for head in self.heads.values_mut() {
            params.extend(head.parameters_mut());
        }
        params
    }

    fn named_tensors(&self) -> Vec<(String, &Tensor)> {
        let mut named = self.encoder.named_parameters();
        for (rank, head) in &self.heads {
            named.push((format!("heads.{rank}.weight"), &head.weight));
            named.push((format!("heads.{rank}.bias"), &head.bias));
        }
        named
    }

    /// Copy every trainable tensor out, encoder first then heads in rank order
    pub fn named_parameters(&self) -> Vec<NamedParam> {
        self.named_tensors()
            .into_iter()
            .map(|(name, t)| NamedParam { name, data: t.as_slice().to_vec() })
            .collect()
    }

    pub fn num_parameters(&self) -> usize {
        self.named_tensors().iter().map(|(_, t)| t.len()).sum()
    }

    /// Overwrite parameters by name; every tensor must be present with its exact size
    pub fn load_named_parameters(&mut self, params: &[NamedParam]) -> Result<()> {
        let by_name: BTreeMap<&str, &NamedParam> =
            params.iter().map(|p| (p.name.as_str(), p)).collect();

        let mut targets = self.encoder.named_parameters_mut();
        for (rank, head) in &mut self.heads {
            targets.push((format!("heads.{rank}.weight"), &mut head.weight));
            targets.push((format!("heads.{rank}.bias"), &mut head.bias));
        }

        // Validate everything before mutating anything
        for (name, tensor) in &targets {
            let param = by_name
                .get(name.as_str())
                .ok_or_else(|| Error::Serialization(format!("missing parameter '{name}'")))?;
            if param.data.len() != tensor.len() {
                return Err(Error::ShapeMismatch {
                    context: format!("parameter '{name}'"),
                    expected: tensor.len(),
                    actual: param.data.len(),
                });
            }
        }
        for (name, tensor) in targets {
            *tensor.data_mut() = Array1::from(by_name[name.as_str()].data.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{no_grad, sum};
    use crate::model::{LinearEncoder, PassthroughEncoder};

    const SIZES: [usize; RANK_COUNT] = [1, 2, 2, 3, 3, 4, 5];

    fn model() -> HierarchicalClassifier {
        HierarchicalClassifier::new(Box::new(LinearEncoder::new(4, 6, 0)), SIZES, 1).unwrap()
    }

    #[test]
    fn test_forward_shapes_per_rank() {
        let m = model();
        let x = Tensor::from_vec(vec![0.3; 12], false);
        let out = m.forward_inputs(&x, 3).unwrap();
        assert_eq!(out.batch_size(), 3);
        for rank in Rank::ALL {
            assert_eq!(out.get(rank).len(), 3 * SIZES[rank.index()]);
            assert_eq!(out.classes(rank), SIZES[rank.index()]);
        }
        assert_eq!(out.argmax_labels().len(), 3);
    }

    #[test]
    fn test_backward_reaches_encoder_and_heads() {
        let m = model();
        let x = Tensor::from_vec((0..8).map(|i| i as f32 * 0.1 + 0.1).collect(), false);
        let out = m.forward_inputs(&x, 2).unwrap();
        let mut loss = sum(out.get(Rank::Species));
        m.backward(&out, &mut loss);

        let heads = &m.heads;
        assert!(heads[&Rank::Species].weight.grad().is_some());
        assert!(heads[&Rank::Kingdom].weight.grad().is_none());
        let named = m.encoder.named_parameters();
        assert!(named[0].1.grad().is_some());
    }

    #[test]
    fn test_no_grad_forward_builds_no_graph() {
        let m = model();
        let x = Tensor::from_vec(vec![0.3; 4], false);
        let out = no_grad(|| m.forward_inputs(&x, 1).unwrap());
        assert!(out.iter().all(|(_, t)| !t.requires_grad()));
    }

    #[test]
    fn test_activation_budget() {
        let m = model().with_activation_budget(Some(2 * (6 + 20)));
        assert!(m.forward_inputs(&Tensor::from_vec(vec![0.0; 8], false), 2).is_ok());
        let err = m.forward_inputs(&Tensor::from_vec(vec![0.0; 12], false), 3).err().unwrap();
        assert!(err.is_resource_exhausted());
    }

    #[test]
    fn test_named_parameters_round_trip() {
        let a = model();
        let mut b = HierarchicalClassifier::new(Box::new(LinearEncoder::new(4, 6, 7)), SIZES, 8).unwrap();
        assert_ne!(a.named_parameters(), b.named_parameters());
        b.load_named_parameters(&a.named_parameters()).unwrap();
        assert_eq!(a.named_parameters(), b.named_parameters());
        assert_eq!(a.named_parameters().len(), 2 + 2 * RANK_COUNT);
    }

    #[test]
    fn test_load_rejects_wrong_size() {
        let mut m = model();
        let mut params = m.named_parameters();
        params[0].data.pop();
        let before = m.named_parameters();
        assert!(matches!(m.load_named_parameters(&params), Err(Error::ShapeMismatch { .. })));
        assert_eq!(m.named_parameters(), before);
    }

    #[test]
    fn test_zero_sized_rank_rejected() {
        let mut sizes = SIZES;
        sizes[3] = 0;
        assert!(HierarchicalClassifier::new(Box::new(PassthroughEncoder::new(2)), sizes, 0).is_err());
    }
}
