//! Per-epoch history

use crate::taxonomy::{Rank, RANK_COUNT};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Summary of one finished epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    /// Mean total training loss over batches
    pub train_loss: f32,
    /// Mean unweighted training cross entropy per rank
    pub rank_losses: [f32; RANK_COUNT],
    pub consistency_penalty: f32,
    pub val_loss: Option<f32>,
    pub val_hierarchical_accuracy: f32,
    pub val_rank_accuracy: [f32; RANK_COUNT],
    pub val_consistency_rate: f32,
    /// Learning rate used during the epoch
    pub lr: f32,
    /// New best validation score
    pub improved: bool,
}

/// Metrics tracker for a training run
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    records: Vec<EpochRecord>,
    /// Optimizer steps taken
    pub steps: usize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_step(&mut self) {
        self.steps += 1;
    }

    pub fn record_epoch(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    /// Epoch with the highest validation hierarchical accuracy (earliest on ties)
    pub fn best(&self) -> Option<&EpochRecord> {
        self.records.iter().fold(None, |best: Option<&EpochRecord>, r| match best {
            Some(b) if b.val_hierarchical_accuracy >= r.val_hierarchical_accuracy => Some(b),
            _ => Some(r),
        })
    }

    /// Write the history as `history.csv`-style rows
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;

        let mut header = vec!["epoch".to_string(), "train_loss".to_string()];
        header.extend(Rank::ALL.iter().map(|r| format!("loss_{r}")));
        header.extend(["consistency_penalty", "val_loss", "val_hierarchical_accuracy"].map(String::from));
        header.extend(Rank::ALL.iter().map(|r| format!("acc_{r}")));
        header.extend(["val_consistency_rate", "lr", "improved"].map(String::from));
        wtr.write_record(&header)?;

        for r in &self.records {
            let mut row = vec![r.epoch.to_string(), format!("{:.6}", r.train_loss)];
            row.extend(r.rank_losses.iter().map(|v| format!("{v:.6}")));
            row.push(format!("{:.6}", r.consistency_penalty));
            row.push(r.val_loss.map(|v| format!("{v:.6}")).unwrap_or_default());
            row.push(format!("{:.6}", r.val_hierarchical_accuracy));
            row.extend(r.val_rank_accuracy.iter().map(|v| format!("{v:.6}")));
            row.push(format!("{:.6}", r.val_consistency_rate));
            row.push(format!("{:e}", r.lr));
            row.push(r.improved.to_string());
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
