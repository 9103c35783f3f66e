//! Training step operations

use super::core::TrainEvalLoop;
use crate::autograd::scale;
use crate::data::PrefetchLoader;
use crate::error::Stage;
use crate::optim::clip_grad_norm_refs;
use crate::taxonomy::RANK_COUNT;
use crate::train::HierarchicalBatch;
use crate::Result;

/// Loss components of one batch (or the sample-weighted mean of an epoch)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct StepLoss {
    pub(crate) total: f32,
    pub(crate) rank_losses: [f32; RANK_COUNT],
    pub(crate) penalty: f32,
}

impl StepLoss {
    fn add_scaled(&mut self, other: &StepLoss, weight: f32) {
        self.total += other.total * weight;
        self.penalty += other.penalty * weight;
        for (acc, v) in self.rank_losses.iter_mut().zip(other.rank_losses) {
            *acc += v * weight;
        }
    }
}

impl TrainEvalLoop {
    /// One pass over `loader`; returns sample-weighted mean losses
    pub(crate) fn train_epoch(&mut self, epoch: usize, loader: &PrefetchLoader) -> Result<StepLoss> {
        let mut sum = StepLoss::default();
        let mut seen = 0usize;

        for (step, batch) in loader.epoch(epoch).enumerate() {
            let batch = batch.map_err(|e| e.at_stage(Stage::Training))?;
            let loss = self.train_batch(&batch)?;
            sum.add_scaled(&loss, batch.size() as f32);
            seen += batch.size();
            self.metrics.increment_step();

            let interval = self.config.log_interval;
            if interval > 0 && (step + 1) % interval == 0 {
                log::debug!(
                    "epoch {epoch} step {}/{}: loss={:.4} penalty={:.4}",
                    step + 1,
                    loader.num_batches(),
                    loss.total,
                    loss.penalty
                );
            }
        }

        if seen == 0 {
            return Ok(sum);
        }
        let mut mean = StepLoss::default();
        mean.add_scaled(&sum, 1.0 / seen as f32);
        Ok(mean)
    }

    /// Zero grads, forward, backward, clip and step for one batch
    ///
    /// A batch that exhausts resources is retried once as two halves whose
    /// gradients are accumulated (each weighted by its share of the batch)
    /// before a single optimizer step. A half that fails again is fatal and
    /// names its first sample.
    pub(crate) fn train_batch(&mut self, batch: &HierarchicalBatch) -> Result<StepLoss> {
        self.zero_grad();

        let loss = match self.forward_backward(batch, 1.0) {
            Ok(loss) => loss,
            Err(e) if e.is_resource_exhausted() => {
                log::warn!(
                    "batch of {} starting at '{}' exhausted resources, retrying in halves",
                    batch.size(),
                    batch.first_id()
                );
                let (first, second) =
                    batch.split_half().ok_or_else(|| e.at_sample(Stage::Training, batch.first_id()))?;
                self.zero_grad();
                let n = batch.size() as f32;
                let mut combined = StepLoss::default();
                for half in [first, second] {
                    let share = half.size() as f32 / n;
                    let loss = self
                        .forward_backward(&half, share)
                        .map_err(|e| e.at_sample(Stage::Training, half.first_id()))?;
                    combined.add_scaled(&loss, share);
                }
                combined
            }
            Err(e) => return Err(e.at_stage(Stage::Training)),
        };

        let mut params = self.model.parameters_mut();
        if let Some(max_norm) = self.config.max_grad_norm {
            clip_grad_norm_refs(&mut params, max_norm);
        }
        self.optimizer.step_refs(&mut params);
        Ok(loss)
    }

    /// Forward and backward without an optimizer step; gradients accumulate
    /// scaled by `share`
    fn forward_backward(&self, batch: &HierarchicalBatch, share: f32) -> Result<StepLoss> {
        let logits = self.model.forward(batch)?;
        let out = self.loss.forward(&logits, &batch.labels)?;
        let mut total = if share == 1.0 { out.total.clone() } else { scale(&out.total, share) };
        self.model.backward(&logits, &mut total);
        Ok(StepLoss { total: out.value(), rank_losses: out.rank_losses, penalty: out.consistency_penalty })
    }

    fn zero_grad(&mut self) {
        let mut params = self.model.parameters_mut();
        self.optimizer.zero_grad_refs(&mut params);
    }
}
