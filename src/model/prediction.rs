//! Per-rank probability distributions and optional lineage projection

use super::HierarchicalLogits;
use crate::autograd::{log_softmax_rows, softmax_rows};
use crate::taxonomy::{LabelVector, Rank, TaxonomyTree, RANK_COUNT};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Seven softmax distributions per sample plus the argmax lineage
#[derive(Debug, Clone)]
pub struct Prediction {
    probs: BTreeMap<Rank, Vec<f32>>,
    sizes: [usize; RANK_COUNT],
    labels: Vec<LabelVector>,
}

impl Prediction {
    pub fn from_logits(logits: &HierarchicalLogits) -> Self {
        let batch = logits.batch_size();
        let probs = logits
            .iter()
            .map(|(rank, t)| (rank, softmax_rows(t.as_slice(), batch, logits.classes(rank))))
            .collect();
        Self { probs, sizes: logits.sizes(), labels: logits.argmax_labels() }
    }

    pub fn batch_size(&self) -> usize {
        self.labels.len()
    }

    /// Distribution over a rank's labels for one sample
    pub fn probabilities(&self, rank: Rank, sample: usize) -> &[f32] {
        let n = self.sizes[rank.index()];
        &self.probs[&rank][sample * n..(sample + 1) * n]
    }

    /// Argmax label per rank, per sample
    pub fn labels(&self) -> &[LabelVector] {
        &self.labels
    }

    /// Probability assigned to the predicted label
    pub fn confidence(&self, rank: Rank, sample: usize) -> f32 {
        self.probabilities(rank, sample)[self.labels[sample].get(rank)]
    }
}

/// Post-hoc decoder that only emits lineages present in the taxonomy
///
/// Picks, per sample, the species whose full lineage maximises the summed
/// log-probabilities over all seven ranks. Not part of the loss.
pub struct LineageProjector {
    tree: Arc<TaxonomyTree>,
}

impl LineageProjector {
    pub fn new(tree: Arc<TaxonomyTree>) -> Self {
        Self { tree }
    }

    pub fn project(&self, logits: &HierarchicalLogits) -> Result<Vec<LabelVector>> {
        let expected = self.tree.rank_sizes();
        for rank in Rank::ALL {
            if logits.classes(rank) != expected[rank.index()] {
                return Err(Error::ShapeMismatch {
                    context: format!("{rank} logits width"),
                    expected: expected[rank.index()],
                    actual: logits.classes(rank),
                });
            }
        }

        let batch = logits.batch_size();
        let log_probs: Vec<Vec<f32>> = Rank::ALL
            .iter()
            .map(|&rank| log_softmax_rows(logits.get(rank).as_slice(), batch, logits.classes(rank)))
            .collect();

        let lineages = self.tree.species_lineages();
        let mut out = Vec::with_capacity(batch);
        for i in 0..batch {
            let mut best: Option<(f32, LabelVector)> = None;
            for lineage in lineages {
                let score: f32 = lineage
                    .iter()
                    .map(|(rank, idx)| log_probs[rank.index()][i * expected[rank.index()] + idx])
                    .sum();
                if best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, *lineage));
                }
            }
            // The tree always holds at least one species
            if let Some((_, lineage)) = best {
                out.push(lineage);
            }
        }
        Ok(out)
    }
}
