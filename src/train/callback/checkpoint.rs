//! Writes checkpoint files for improving epochs

use crate::io::Checkpoint;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A checkpoint file written during the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCheckpoint {
    pub epoch: usize,
    pub val_hierarchical_accuracy: f32,
    pub path: PathBuf,
}

/// Persists checkpoints into a directory
///
/// `checkpoint_best.json` is overwritten on every accepted save; with
/// `keep_all` each accepted epoch is also kept as `checkpoint_epoch_{n}.json`.
/// A checkpoint scoring below the current best is refused, so the best file
/// never regresses.
#[derive(Clone, Debug)]
pub struct CheckpointWriter {
    checkpoint_dir: PathBuf,
    keep_all: bool,
    saved: Vec<SavedCheckpoint>,
}

impl CheckpointWriter {
    pub fn new(checkpoint_dir: impl Into<PathBuf>, keep_all: bool) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into(), keep_all, saved: Vec::new() }
    }

    pub fn dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    /// Get checkpoint path for epoch
    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.checkpoint_dir.join(format!("checkpoint_epoch_{epoch}.json"))
    }

    /// Get best checkpoint path
    pub fn best_checkpoint_path(&self) -> PathBuf {
        self.checkpoint_dir.join("checkpoint_best.json")
    }

    /// Write `checkpoint` as the new best; returns `false` if it scores lower
    pub fn save_best(&mut self, checkpoint: &Checkpoint) -> Result<bool> {
        if let Some(prev) = self.saved.last() {
            if checkpoint.val_hierarchical_accuracy < prev.val_hierarchical_accuracy {
                log::warn!(
                    "not replacing best checkpoint (epoch {}, {:.4}) with epoch {} ({:.4})",
                    prev.epoch,
                    prev.val_hierarchical_accuracy,
                    checkpoint.epoch,
                    checkpoint.val_hierarchical_accuracy
                );
                return Ok(false);
            }
        }

        let best = self.best_checkpoint_path();
        checkpoint.save(&best)?;
        let path = if self.keep_all {
            let path = self.checkpoint_path(checkpoint.epoch);
            checkpoint.save(&path)?;
            path
        } else {
            best
        };
        log::info!(
            "saved checkpoint for epoch {} (hierarchical accuracy {:.4}) to {}",
            checkpoint.epoch,
            checkpoint.val_hierarchical_accuracy,
            path.display()
        );

        self.saved.push(SavedCheckpoint {
            epoch: checkpoint.epoch,
            val_hierarchical_accuracy: checkpoint.val_hierarchical_accuracy,
            path,
        });
        Ok(true)
    }

    /// Every accepted save, in order
    pub fn history(&self) -> &[SavedCheckpoint] {
        &self.saved
    }
}
