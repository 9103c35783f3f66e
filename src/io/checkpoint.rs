//! Checkpoint artifact: model parameters plus run metadata

use super::{load_json, save_json};
use crate::model::{HierarchicalClassifier, NamedParam};
use crate::taxonomy::RANK_COUNT;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized model state at the end of an epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Epoch (0-based) the weights come from
    pub epoch: usize,
    /// Validation hierarchical accuracy at that epoch
    pub val_hierarchical_accuracy: f32,
    /// Seed of the run
    pub seed: u64,
    /// Head widths, kingdom first
    pub rank_sizes: [usize; RANK_COUNT],
    pub input_dim: usize,
    pub embed_dim: usize,
    /// Encoder identifier (`linear`, `passthrough`)
    pub encoder: String,
    /// RFC 3339 timestamp
    pub saved_at: String,
    pub params: Vec<NamedParam>,
}

impl Checkpoint {
    /// Snapshot a classifier
    pub fn capture(model: &HierarchicalClassifier, epoch: usize, val_hierarchical_accuracy: f32, seed: u64) -> Self {
        Self {
            epoch,
            val_hierarchical_accuracy,
            seed,
            rank_sizes: model.rank_sizes(),
            input_dim: model.input_dim(),
            embed_dim: model.embed_dim(),
            encoder: model.encoder().name().to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            params: model.named_parameters(),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }

    /// Load the weights into a classifier of the same architecture
    pub fn restore_into(&self, model: &mut HierarchicalClassifier) -> Result<()> {
        if self.encoder != model.encoder().name() {
            return Err(Error::Serialization(format!(
                "checkpoint encoder '{}' does not match model encoder '{}'",
                self.encoder,
                model.encoder().name()
            )));
        }
        let sizes = model.rank_sizes();
        for (r, (&want, &got)) in sizes.iter().zip(&self.rank_sizes).enumerate() {
            if want != got {
                return Err(Error::ShapeMismatch { context: format!("checkpoint rank {r} width"), expected: want, actual: got });
            }
        }
        if self.input_dim != model.input_dim() {
            return Err(Error::ShapeMismatch {
                context: "checkpoint input width".into(),
                expected: model.input_dim(),
                actual: self.input_dim,
            });
        }
        model.load_named_parameters(&self.params)
    }
}
