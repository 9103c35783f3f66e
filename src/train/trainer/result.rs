//! Training result types

use super::LoopState;
use crate::train::callback::SavedCheckpoint;

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainResult {
    /// Terminal state of the loop
    pub state: LoopState,
    /// Epochs that finished validation
    pub epochs_run: usize,
    /// Epoch whose weights the model holds after the run
    pub best_epoch: Option<usize>,
    /// Validation hierarchical accuracy of `best_epoch`
    pub best_score: Option<f32>,
    /// Mean training loss of the last epoch
    pub final_train_loss: f32,
    /// Checkpoint files written, in order
    pub checkpoints: Vec<SavedCheckpoint>,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

impl TrainResult {
    pub fn stopped_early(&self) -> bool {
        matches!(self.state, LoopState::EarlyStopped { .. })
    }

    pub fn cancelled(&self) -> bool {
        self.state == LoopState::Cancelled
    }
}
