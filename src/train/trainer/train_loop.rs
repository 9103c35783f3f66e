//! Multi-epoch train/validate loop

use super::core::{BestWeights, TrainEvalLoop};
use super::step::StepLoss;
use super::{LoopState, TrainResult};
use crate::data::PrefetchLoader;
use crate::error::Stage;
use crate::io::Checkpoint;
use crate::optim::LRScheduler;
use crate::taxonomy::Rank;
use crate::train::evaluate::{evaluate, ValidationOutcome};
use crate::train::EpochRecord;
use crate::{Error, Result};
use std::time::Instant;

impl TrainEvalLoop {
    /// Train for up to `config.epochs` epochs, validating after each
    ///
    /// Stops early when validation hierarchical accuracy has not improved for
    /// `early_stopping_patience` epochs, or at the next epoch boundary after
    /// [`request_stop`](Self::request_stop). On return the model holds the
    /// weights of the best validation epoch. When `output_dir` is set,
    /// `history.csv`, `metrics.json` and `rank_accuracy.csv` are written there
    /// and the best checkpoint under `checkpoints/`.
    ///
    /// # Errors
    ///
    /// A fatal training or validation error is returned as soon as it occurs.
    /// The loop then stays in the `Training`/`Validating` state of the failed
    /// epoch, the best weights are not restored and no artifacts are written;
    /// the model holds whatever the last optimizer step left. The best
    /// checkpoint on disk, if any, is still the one to reload.
    pub fn run(&mut self, train: &PrefetchLoader, val: &PrefetchLoader) -> Result<TrainResult> {
        if self.state != LoopState::Initializing {
            return Err(Error::ConfigError(format!("loop already ran (state {})", self.state)));
        }
        self.check_input_dim(train)?;
        self.check_input_dim(val)?;

        let start = Instant::now();
        let mut final_train_loss = 0.0;
        log::info!(
            "training {} epochs: {} train / {} val samples, {} parameters, optimizer {}",
            self.config.epochs,
            train.dataset().len(),
            val.dataset().len(),
            self.model.num_parameters(),
            self.optimizer.name()
        );

        for epoch in 0..self.config.epochs {
            if self.stop_requested() {
                log::info!("stop requested, cancelling before epoch {epoch}");
                self.transition(LoopState::Cancelled);
                break;
            }

            self.transition(LoopState::Training { epoch });
            self.scheduler.apply(self.optimizer.as_mut());
            let lr = self.optimizer.lr();
            let train_loss = self.train_epoch(epoch, train)?;
            final_train_loss = train_loss.total;

            self.transition(LoopState::Validating { epoch });
            let outcome = evaluate(&self.model, val, &self.tree, Some(&self.loss), None)?;
            let improved = self.after_validation(epoch, &outcome)?;
            self.record_epoch(epoch, lr, &train_loss, &outcome, improved);
            self.scheduler.step();

            if self.early_stopping.should_stop() {
                log::info!(
                    "early stopping after epoch {epoch}: no improvement for {} epochs",
                    self.early_stopping.epochs_without_improvement()
                );
                self.transition(LoopState::EarlyStopped { epoch });
                break;
            }
        }
        if !self.state.is_terminal() {
            self.transition(LoopState::Completed);
        }

        self.restore_best()?;
        self.write_artifacts()?;

        Ok(TrainResult {
            state: self.state,
            epochs_run: self.metrics.records().len(),
            best_epoch: self.best.as_ref().map(|b| b.epoch),
            best_score: self.best.as_ref().map(|b| b.score),
            final_train_loss,
            checkpoints: self.checkpoints.as_ref().map(|w| w.history().to_vec()).unwrap_or_default(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    fn check_input_dim(&self, loader: &PrefetchLoader) -> Result<()> {
        let dataset = loader.dataset();
        if !dataset.is_empty() && dataset.input_dim() != self.model.input_dim() {
            return Err(Error::ShapeMismatch {
                context: "dataset feature width vs encoder input".into(),
                expected: self.model.input_dim(),
                actual: dataset.input_dim(),
            }
            .at_stage(Stage::Construction));
        }
        Ok(())
    }

    /// Early stopping, best-weight snapshot and checkpointing for one epoch
    fn after_validation(&mut self, epoch: usize, outcome: &ValidationOutcome) -> Result<bool> {
        let metrics = &outcome.metrics;
        let report = metrics.report().with_label_names(&self.tree);
        self.last_report = Some(report.clone());

        if metrics.sample_count() == 0 {
            log::warn!("epoch {epoch}: validation set is empty, score treated as 0 and not an improvement");
            self.early_stopping.skip();
            return Ok(false);
        }

        let score = metrics.hierarchical_accuracy();
        let improved = self.early_stopping.update(score);
        if improved {
            self.best = Some(BestWeights { epoch, score, params: self.model.named_parameters(), report });
            if let Some(writer) = self.checkpoints.as_mut() {
                let checkpoint = Checkpoint::capture(&self.model, epoch, score, self.config.random_seed);
                writer.save_best(&checkpoint).map_err(|e| e.at_stage(Stage::Validation))?;
            }
        }
        Ok(improved)
    }

    fn record_epoch(&mut self, epoch: usize, lr: f32, train: &StepLoss, outcome: &ValidationOutcome, improved: bool) {
        let metrics = &outcome.metrics;
        let record = EpochRecord {
            epoch,
            train_loss: train.total,
            rank_losses: train.rank_losses,
            consistency_penalty: train.penalty,
            val_loss: outcome.mean_loss,
            val_hierarchical_accuracy: metrics.hierarchical_accuracy(),
            val_rank_accuracy: metrics.rank_accuracies(),
            val_consistency_rate: metrics.consistency_rate(),
            lr,
            improved,
        };
        log::info!(
            "epoch {}/{}: train_loss={:.4} penalty={:.4} val_loss={} val_hier_acc={:.4} species_acc={:.4} lr={:.2e}{}",
            epoch + 1,
            self.config.epochs,
            record.train_loss,
            record.consistency_penalty,
            record.val_loss.map_or_else(|| "n/a".to_string(), |l| format!("{l:.4}")),
            record.val_hierarchical_accuracy,
            record.val_rank_accuracy[Rank::Species.index()],
            lr,
            if improved { " *" } else { "" }
        );
        self.metrics.record_epoch(record);
    }

    fn restore_best(&mut self) -> Result<()> {
        if let Some(best) = &self.best {
            log::info!("restoring weights from epoch {} (val_hier_acc={:.4})", best.epoch, best.score);
            self.model.load_named_parameters(&best.params)?;
        }
        Ok(())
    }

    fn write_artifacts(&self) -> Result<()> {
        let Some(dir) = &self.config.output_dir else {
            return Ok(());
        };
        std::fs::create_dir_all(dir)?;
        self.metrics.write_csv(dir.join("history.csv"))?;
        if let Some(report) = self.report() {
            report.save_json(dir.join("metrics.json"))?;
            report.write_rank_accuracy_csv(dir.join("rank_accuracy.csv"))?;
        }
        log::info!("wrote training artifacts to {}", dir.display());
        Ok(())
    }
}
