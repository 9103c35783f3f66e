//! Metrics artifact: per-rank accuracy table, hierarchical accuracy, confusion counts

use super::HierarchicalMetrics;
use crate::io::{load_json, save_json};
use crate::taxonomy::{Rank, TaxonomyTree};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Accuracy of one rank's head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankAccuracy {
    pub accuracy: f32,
    pub correct: usize,
    pub support: usize,
}

/// One non-zero confusion cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionEntry {
    pub true_index: usize,
    pub predicted_index: usize,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<String>,
}

/// Summary of a completed validation pass (`metrics.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub sample_count: usize,
    pub hierarchical_accuracy: f32,
    pub mean_rank_accuracy: f32,
    pub consistency_rate: f32,
    pub rank_accuracy: BTreeMap<Rank, RankAccuracy>,
    pub confusion: BTreeMap<Rank, Vec<ConfusionEntry>>,
}

impl MetricsReport {
    pub fn from_metrics(metrics: &HierarchicalMetrics) -> Self {
        let mut rank_accuracy = BTreeMap::new();
        let mut confusion = BTreeMap::new();
        for rank in Rank::ALL {
            let cm = metrics.confusion(rank);
            rank_accuracy.insert(
                rank,
                RankAccuracy { accuracy: cm.accuracy(), correct: cm.correct(), support: cm.total() },
            );
            let entries = cm
                .entries()
                .map(|(t, p, count)| ConfusionEntry {
                    true_index: t,
                    predicted_index: p,
                    count,
                    true_label: None,
                    predicted_label: None,
                })
                .collect();
            confusion.insert(rank, entries);
        }

        Self {
            sample_count: metrics.sample_count(),
            hierarchical_accuracy: metrics.hierarchical_accuracy(),
            mean_rank_accuracy: metrics.mean_rank_accuracy(),
            consistency_rate: metrics.consistency_rate(),
            rank_accuracy,
            confusion,
        }
    }

    /// Fill in label names for every confusion cell
    pub fn with_label_names(mut self, tree: &TaxonomyTree) -> Self {
        for (rank, entries) in &mut self.confusion {
            for e in entries.iter_mut() {
                e.true_label = tree.label_of(*rank, e.true_index).ok().map(str::to_string);
                e.predicted_label = tree.label_of(*rank, e.predicted_index).ok().map(str::to_string);
            }
        }
        self
    }

    /// Lowest per-rank accuracy
    pub fn min_rank_accuracy(&self) -> f32 {
        self.rank_accuracy.values().map(|r| r.accuracy).fold(f32::INFINITY, f32::min)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }

    /// Write `rank,accuracy,correct,support` rows, kingdom first
    pub fn write_rank_accuracy_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["rank", "accuracy", "correct", "support"])?;
        for (rank, acc) in &self.rank_accuracy {
            wtr.write_record([
                rank.name().to_string(),
                format!("{:.6}", acc.accuracy),
                acc.correct.to_string(),
                acc.support.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
