//! Core TrainEvalLoop struct and basic methods

use super::LoopState;
use crate::error::Stage;
use crate::eval::MetricsReport;
use crate::model::{HierarchicalClassifier, NamedParam};
use crate::optim::{CosineAnnealingLR, Optimizer};
use crate::taxonomy::TaxonomyTree;
use crate::train::callback::{CheckpointWriter, EarlyStopping};
use crate::train::loss::HierarchicalLoss;
use crate::train::{MetricsTracker, TrainConfig};
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Weights of the best-scoring epoch so far
#[derive(Debug, Clone)]
pub(crate) struct BestWeights {
    pub(crate) epoch: usize,
    pub(crate) score: f32,
    pub(crate) params: Vec<NamedParam>,
    pub(crate) report: MetricsReport,
}

/// Epoch-structured train/validate loop for a [`HierarchicalClassifier`]
///
/// Owns the model, optimizer and loss for the duration of a run. Validation
/// hierarchical accuracy drives early stopping, best-checkpoint selection and
/// the weights the model holds when [`run`](Self::run) returns.
///
/// # Example
///
/// ```no_run
/// use linaje::model::{HierarchicalClassifier, LinearEncoder};
/// use linaje::optim::AdamW;
/// use linaje::taxonomy::TaxonomyTree;
/// use linaje::train::{TrainConfig, TrainEvalLoop};
/// use std::sync::Arc;
///
/// let tree = Arc::new(TaxonomyTree::from_csv("taxonomy.csv").unwrap());
/// let model = HierarchicalClassifier::from_tree(Box::new(LinearEncoder::new(64, 32, 7)), &tree, 7).unwrap();
/// let config = TrainConfig::default().with_epochs(20).with_early_stopping(3, 0.0);
/// let mut train_loop =
///     TrainEvalLoop::new(model, Box::new(AdamW::with_weight_decay(1e-3, 0.01)), tree, config).unwrap();
/// // let result = train_loop.run(&train_loader, &val_loader)?;
/// ```
pub struct TrainEvalLoop {
    pub(crate) model: HierarchicalClassifier,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) scheduler: CosineAnnealingLR,
    pub(crate) loss: HierarchicalLoss,
    pub(crate) tree: Arc<TaxonomyTree>,
    pub(crate) config: TrainConfig,

    /// Per-epoch history
    pub metrics: MetricsTracker,

    pub(crate) state: LoopState,
    pub(crate) transitions: Vec<LoopState>,
    pub(crate) early_stopping: EarlyStopping,
    pub(crate) checkpoints: Option<CheckpointWriter>,
    pub(crate) best: Option<BestWeights>,
    pub(crate) last_report: Option<MetricsReport>,
    pub(crate) stop: Arc<AtomicBool>,
}

impl TrainEvalLoop {
    /// Create a loop; fails if the model's heads disagree with `tree` or the
    /// loss configuration is invalid
    pub fn new(
        model: HierarchicalClassifier,
        mut optimizer: Box<dyn Optimizer>,
        tree: Arc<TaxonomyTree>,
        config: TrainConfig,
    ) -> Result<Self> {
        let expected = tree.rank_sizes();
        let actual = model.rank_sizes();
        if let Some(rank) = crate::taxonomy::Rank::ALL.into_iter().find(|r| expected[r.index()] != actual[r.index()]) {
            return Err(Error::ShapeMismatch {
                context: format!("{rank} head width"),
                expected: expected[rank.index()],
                actual: actual[rank.index()],
            }
            .at_stage(Stage::Construction));
        }
        if config.batch_size == 0 {
            return Err(Error::ConfigError("batch_size must be at least 1".into()).at_stage(Stage::Construction));
        }

        let loss = HierarchicalLoss::new(Arc::clone(&tree), config.rank_weights, config.consistency_penalty_coefficient)
            .map_err(|e| e.at_stage(Stage::Construction))?;
        optimizer.set_lr(config.learning_rate);
        let scheduler = CosineAnnealingLR::new(config.learning_rate, config.epochs.max(1), config.min_lr);
        let early_stopping = EarlyStopping::new(config.early_stopping_patience, config.min_delta);
        let checkpoints = config
            .output_dir
            .as_ref()
            .map(|dir| CheckpointWriter::new(dir.join("checkpoints"), config.keep_all_checkpoints));

        Ok(Self {
            model,
            optimizer,
            scheduler,
            loss,
            tree,
            config,
            metrics: MetricsTracker::new(),
            state: LoopState::Initializing,
            transitions: vec![LoopState::Initializing],
            early_stopping,
            checkpoints,
            best: None,
            last_report: None,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag shared with signal handlers; setting it cancels at the next epoch boundary
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Ask the loop to stop before the next epoch starts
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Every state visited so far, starting with `Initializing`
    pub fn transitions(&self) -> &[LoopState] {
        &self.transitions
    }

    pub(crate) fn transition(&mut self, next: LoopState) {
        debug_assert!(self.state.can_transition_to(next), "illegal transition {} -> {}", self.state, next);
        log::debug!("loop state {} -> {}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    pub fn model(&self) -> &HierarchicalClassifier {
        &self.model
    }

    pub fn into_model(self) -> HierarchicalClassifier {
        self.model
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn loss(&self) -> &HierarchicalLoss {
        &self.loss
    }

    pub fn early_stopping(&self) -> &EarlyStopping {
        &self.early_stopping
    }

    /// Current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Validation report of the best epoch (or the last one if none improved)
    pub fn report(&self) -> Option<&MetricsReport> {
        self.best.as_ref().map(|b| &b.report).or(self.last_report.as_ref())
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best.as_ref().map(|b| b.epoch)
    }

    pub fn checkpoint_writer(&self) -> Option<&CheckpointWriter> {
        self.checkpoints.as_ref()
    }
}
