//! Batch data structure

use crate::data::Dataset;
use crate::taxonomy::{LabelCodec, LabelVector, RANK_COUNT};
use crate::Tensor;

/// A batch of samples with one label column per rank
///
/// Images are stored row-major (`size * input_dim`). Batches are `Send`, so
/// they can be assembled on loader threads; the autograd input tensor is
/// only created on the training thread via [`HierarchicalBatch::inputs`].
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalBatch {
    /// Sample identifiers, in batch order
    pub ids: Vec<String>,
    /// Flattened images
    pub images: Vec<f32>,
    /// Width of one image row
    pub input_dim: usize,
    /// Encoded lineage per sample
    pub labels: Vec<LabelVector>,
}

impl HierarchicalBatch {
    /// Gather the samples at `indices` from a dataset
    pub fn gather(dataset: &Dataset, indices: &[usize]) -> Self {
        let input_dim = dataset.input_dim();
        let mut ids = Vec::with_capacity(indices.len());
        let mut images = Vec::with_capacity(indices.len() * input_dim);
        let mut labels = Vec::with_capacity(indices.len());

        for &i in indices {
            let sample = &dataset.samples()[i];
            ids.push(sample.id().to_string());
            images.extend_from_slice(sample.image());
            labels.push(*sample.labels());
        }

        Self { ids, images, input_dim, labels }
    }

    /// Number of samples
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier reported when the batch as a whole fails
    pub fn first_id(&self) -> &str {
        self.ids.first().map_or("", String::as_str)
    }

    /// Input tensor (no gradient tracking)
    pub fn inputs(&self) -> Tensor {
        Tensor::from_vec(self.images.clone(), false)
    }

    /// Ground-truth index column for every rank
    pub fn rank_columns(&self) -> [Vec<usize>; RANK_COUNT] {
        LabelCodec::rank_columns(&self.labels)
    }

    /// Split into two halves (the first gets the extra sample)
    ///
    /// Returns `None` for batches that cannot be split further.
    pub fn split_half(&self) -> Option<(Self, Self)> {
        if self.size() < 2 {
            return None;
        }
        let mid = self.size().div_ceil(2);
        let cut = mid * self.input_dim;
        let first = Self {
            ids: self.ids[..mid].to_vec(),
            images: self.images[..cut].to_vec(),
            input_dim: self.input_dim,
            labels: self.labels[..mid].to_vec(),
        };
        let second = Self {
            ids: self.ids[mid..].to_vec(),
            images: self.images[cut..].to_vec(),
            input_dim: self.input_dim,
            labels: self.labels[mid..].to_vec(),
        };
        Some((first, second))
    }
}
