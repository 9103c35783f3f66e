//! Sparse confusion counts for one rank

use std::collections::BTreeMap;

/// `(true label, predicted label) -> count`
///
/// Only observed pairs are stored, so a species rank with thousands of labels
/// stays proportional to the number of distinct mistakes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    counts: BTreeMap<(usize, usize), usize>,
    total: usize,
    correct: usize,
}

impl ConfusionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from predictions and ground truth
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize]) -> Self {
        let mut cm = Self::new();
        for (&pred, &truth) in y_pred.iter().zip(y_true) {
            cm.record(truth, pred);
        }
        cm
    }

    pub fn record(&mut self, true_label: usize, predicted_label: usize) {
        *self.counts.entry((true_label, predicted_label)).or_insert(0) += 1;
        self.total += 1;
        if true_label == predicted_label {
            self.correct += 1;
        }
    }

    /// Get element at [true_label][predicted_label]
    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        self.counts.get(&(true_label, predicted_label)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Fraction of diagonal entries; 0 when nothing was recorded
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 / self.total as f32
        }
    }

    /// Number of true instances of a label
    pub fn support(&self, true_label: usize) -> usize {
        self.counts
            .range((true_label, 0)..=(true_label, usize::MAX))
            .map(|(_, &c)| c)
            .sum()
    }

    /// Non-zero cells as `(true, predicted, count)`, row-major
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.counts.iter().map(|(&(t, p), &c)| (t, p, c))
    }

    /// Off-diagonal cells, most frequent first
    pub fn top_confusions(&self, n: usize) -> Vec<(usize, usize, usize)> {
        let mut off: Vec<_> = self.entries().filter(|(t, p, _)| t != p).collect();
        off.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));
        off.truncate(n);
        off
    }

    pub fn merge(&mut self, other: &ConfusionCounts) {
        for (&key, &c) in &other.counts {
            *self.counts.entry(key).or_insert(0) += c;
        }
        self.total += other.total;
        self.correct += other.correct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_accuracy() {
        let cm = ConfusionCounts::from_predictions(&[0, 1, 1, 2], &[0, 1, 2, 2]);
        assert_eq!(cm.total(), 4);
        assert_eq!(cm.correct(), 3);
        assert_eq!(cm.get(2, 1), 1);
        assert_eq!(cm.get(1, 2), 0);
        assert_eq!(cm.support(2), 2);
        assert!((cm.accuracy() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_empty_accuracy_is_zero() {
        assert_eq!(ConfusionCounts::new().accuracy(), 0.0);
    }

    #[test]
    fn test_sparse_large_labels() {
        let mut cm = ConfusionCounts::new();
        cm.record(10_000, 3);
        assert_eq!(cm.entries().count(), 1);
        assert_eq!(cm.top_confusions(5), vec![(10_000, 3, 1)]);
    }

    #[test]
    fn test_merge() {
        let mut a = ConfusionCounts::from_predictions(&[0], &[0]);
        let b = ConfusionCounts::from_predictions(&[1, 0], &[0, 0]);
        a.merge(&b);
        assert_eq!(a.get(0, 0), 2);
        assert_eq!(a.total(), 3);
        assert_eq!(a.correct(), 2);
    }
}
