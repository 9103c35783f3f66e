//! Label encoding and decoding
//!
//! Encoding walks a species' lineage up the tree; decoding turns indices back
//! into names and is only used for reporting. Batched encoding preserves input
//! order, because losses and metrics zip predictions with labels by position.

use super::{LabelVector, Lineage, Rank, TaxonomyTree, RANK_COUNT};
use crate::{Error, Result};
use std::sync::Arc;

/// Converts between species labels and per-rank index vectors
#[derive(Debug, Clone)]
pub struct LabelCodec {
    tree: Arc<TaxonomyTree>,
}

impl LabelCodec {
    /// Create a codec over a shared tree
    pub fn new(tree: Arc<TaxonomyTree>) -> Self {
        Self { tree }
    }

    /// The shared taxonomy
    pub fn tree(&self) -> &Arc<TaxonomyTree> {
        &self.tree
    }

    /// Encode one species label
    pub fn encode(&self, species: &str) -> Result<LabelVector> {
        self.tree.lineage_of(species)
    }

    /// Encode a batch; output index i corresponds to input index i
    pub fn encode_batch<S: AsRef<str>>(&self, species: &[S]) -> Result<Vec<LabelVector>> {
        species.iter().map(|s| self.encode(s.as_ref())).collect()
    }

    /// Decode indices to names
    pub fn decode(&self, labels: &LabelVector) -> Result<Lineage> {
        self.tree.lineage_names(labels)
    }

    /// Decode only the species name
    pub fn decode_species(&self, labels: &LabelVector) -> Result<String> {
        Ok(self.tree.label_of(Rank::Species, labels[Rank::Species])?.to_string())
    }

    /// Transpose label vectors into one index column per rank
    pub fn rank_columns(labels: &[LabelVector]) -> [Vec<usize>; RANK_COUNT] {
        Rank::ALL.map(|rank| labels.iter().map(|l| l[rank]).collect())
    }

    /// One-hot vector for a label index at a rank
    pub fn one_hot(&self, rank: Rank, index: usize) -> Result<Vec<f32>> {
        let size = self.tree.rank_size(rank);
        if index >= size {
            return Err(Error::IndexOutOfRange { rank, index, size });
        }
        let mut v = vec![0.0; size];
        v[index] = 1.0;
        Ok(v)
    }
}
