//! Runtime training configuration

use crate::taxonomy::RANK_COUNT;
use std::path::PathBuf;

/// Settings consumed by [`TrainEvalLoop`](super::TrainEvalLoop)
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Initial learning rate (cosine schedule maximum)
    pub learning_rate: f32,
    /// Cosine schedule floor
    pub min_lr: f32,
    /// Epochs without improvement before stopping; 0 disables
    pub early_stopping_patience: usize,
    pub min_delta: f32,
    pub random_seed: u64,
    /// Per-rank loss weights, kingdom first
    pub rank_weights: [f32; RANK_COUNT],
    /// 0 disables the consistency term
    pub consistency_penalty_coefficient: f32,
    pub max_grad_norm: Option<f32>,
    /// Where checkpoints and metric artifacts go; nothing is written when unset
    pub output_dir: Option<PathBuf>,
    pub keep_all_checkpoints: bool,
    /// Log every N training batches (0 = epoch summaries only)
    pub log_interval: usize,
    /// Background loader threads
    pub workers: usize,
    /// Batches buffered per worker
    pub prefetch: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            learning_rate: 1e-3,
            min_lr: 0.0,
            early_stopping_patience: 3,
            min_delta: 0.0,
            random_seed: 42,
            rank_weights: [1.0; RANK_COUNT],
            consistency_penalty_coefficient: 0.0,
            max_grad_norm: None,
            output_dir: None,
            keep_all_checkpoints: false,
            log_interval: 0,
            workers: 0,
            prefetch: 2,
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_min_lr(mut self, min_lr: f32) -> Self {
        self.min_lr = min_lr;
        self
    }

    pub fn with_early_stopping(mut self, patience: usize, min_delta: f32) -> Self {
        self.early_stopping_patience = patience;
        self.min_delta = min_delta;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_rank_weights(mut self, weights: [f32; RANK_COUNT]) -> Self {
        self.rank_weights = weights;
        self
    }

    pub fn with_consistency_penalty(mut self, coefficient: f32) -> Self {
        self.consistency_penalty_coefficient = coefficient;
        self
    }

    pub fn with_grad_clip(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = Some(max_norm);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_keep_all_checkpoints(mut self, keep: bool) -> Self {
        self.keep_all_checkpoints = keep;
        self
    }

    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn with_workers(mut self, workers: usize, prefetch: usize) -> Self {
        self.workers = workers;
        self.prefetch = prefetch;
        self
    }
}
