//! Accumulates per-rank and hierarchical accuracy over a validation pass

use super::{ConfusionCounts, MetricsReport};
use crate::taxonomy::{LabelVector, Rank, TaxonomyTree, RANK_COUNT};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Running metric state for one pass
///
/// Hierarchical accuracy counts a sample only when all seven ranks match,
/// so it can never exceed the weakest rank's accuracy.
#[derive(Debug, Clone)]
pub struct HierarchicalMetrics {
    tree: Arc<TaxonomyTree>,
    confusion: BTreeMap<Rank, ConfusionCounts>,
    samples: usize,
    exact: usize,
    consistent: usize,
}

impl HierarchicalMetrics {
    pub fn new(tree: Arc<TaxonomyTree>) -> Self {
        let confusion = Rank::ALL.iter().map(|&r| (r, ConfusionCounts::new())).collect();
        Self { tree, confusion, samples: 0, exact: 0, consistent: 0 }
    }

    /// Add one batch; `predicted[i]` is compared with `truth[i]`
    pub fn update(&mut self, predicted: &[LabelVector], truth: &[LabelVector]) -> Result<()> {
        if predicted.len() != truth.len() {
            return Err(Error::ShapeMismatch {
                context: "predictions vs labels".into(),
                expected: truth.len(),
                actual: predicted.len(),
            });
        }

        for (pred, gold) in predicted.iter().zip(truth) {
            for (rank, p) in pred.iter() {
                if let Some(cm) = self.confusion.get_mut(&rank) {
                    cm.record(gold.get(rank), p);
                }
            }
            if pred == gold {
                self.exact += 1;
            }
            if self.tree.is_consistent(pred) {
                self.consistent += 1;
            }
        }
        self.samples += predicted.len();
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn rank_accuracy(&self, rank: Rank) -> f32 {
        self.confusion.get(&rank).map_or(0.0, ConfusionCounts::accuracy)
    }

    pub fn rank_accuracies(&self) -> [f32; RANK_COUNT] {
        Rank::ALL.map(|r| self.rank_accuracy(r))
    }

    /// Exact 7-rank match rate; 0 for an empty pass
    pub fn hierarchical_accuracy(&self) -> f32 {
        ratio(self.exact, self.samples)
    }

    pub fn mean_rank_accuracy(&self) -> f32 {
        self.rank_accuracies().iter().sum::<f32>() / RANK_COUNT as f32
    }

    /// Share of predicted lineages that exist in the taxonomy
    pub fn consistency_rate(&self) -> f32 {
        ratio(self.consistent, self.samples)
    }

    pub fn confusion(&self, rank: Rank) -> &ConfusionCounts {
        &self.confusion[&rank]
    }

    pub fn tree(&self) -> &Arc<TaxonomyTree> {
        &self.tree
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport::from_metrics(self)
    }
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyRow;
    use approx::assert_relative_eq;

    fn tree() -> Arc<TaxonomyTree> {
        Arc::new(
            TaxonomyTree::from_rows(vec![
                TaxonomyRow::new(["K1", "P1", "C1", "O1", "F1", "G1", "S1"]),
                TaxonomyRow::new(["K1", "P1", "C1", "O1", "F1", "G2", "S2"]),
                TaxonomyRow::new(["K2", "P2", "C2", "O2", "F2", "G3", "S3"]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_three_sample_scenario() {
        let t = tree();
        let truth: Vec<LabelVector> = ["S1", "S2", "S3"].iter().map(|s| t.lineage_of(s).unwrap()).collect();

        let mut predicted = truth.clone();
        // Sample 2: wrong genus, and with it the species
        let mut p = *predicted[1].as_array();
        p[5] = 0;
        p[6] = 0;
        predicted[1] = LabelVector::new(p);
        // Sample 3: wrong kingdom, and with it the species
        let mut p = *predicted[2].as_array();
        p[0] = 0;
        p[6] = 0;
        predicted[2] = LabelVector::new(p);

        let mut m = HierarchicalMetrics::new(t);
        m.update(&predicted, &truth).unwrap();

        assert_relative_eq!(m.hierarchical_accuracy(), 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(m.rank_accuracy(Rank::Species), 1.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(m.rank_accuracy(Rank::Kingdom), 2.0 / 3.0, epsilon = 1e-6);
        assert_relative_eq!(m.consistency_rate(), 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_pass_is_zero() {
        let m = HierarchicalMetrics::new(tree());
        assert_eq!(m.hierarchical_accuracy(), 0.0);
        assert_eq!(m.rank_accuracies(), [0.0; RANK_COUNT]);
    }

    #[test]
    fn test_length_mismatch() {
        let t = tree();
        let l = t.lineage_of("S1").unwrap();
        let mut m = HierarchicalMetrics::new(t);
        assert!(m.update(&[l], &[l, l]).is_err());
    }
}
