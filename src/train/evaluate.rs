//! Gradient-free validation pass

use super::HierarchicalBatch;
use crate::autograd::NoGradGuard;
use crate::data::PrefetchLoader;
use crate::error::Stage;
use crate::eval::HierarchicalMetrics;
use crate::model::{HierarchicalClassifier, LineageProjector};
use crate::taxonomy::{LabelVector, TaxonomyTree};
use crate::train::loss::HierarchicalLoss;
use crate::Result;
use std::sync::Arc;

/// Metrics (and optionally the mean loss) of one validation pass
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub metrics: HierarchicalMetrics,
    /// Sample-weighted mean total loss, when a loss was supplied and samples exist
    pub mean_loss: Option<f32>,
}

/// Run `model` over every batch of `loader` with gradients disabled
///
/// Predictions are per-rank argmax, or the projected lineage when a
/// projector is given. A batch that exhausts resources is retried once as
/// two halves.
pub fn evaluate(
    model: &HierarchicalClassifier,
    loader: &PrefetchLoader,
    tree: &Arc<TaxonomyTree>,
    loss: Option<&HierarchicalLoss>,
    projector: Option<&LineageProjector>,
) -> Result<ValidationOutcome> {
    let _guard = NoGradGuard::new();
    let pass = Pass { model, loss, projector };
    let mut metrics = HierarchicalMetrics::new(Arc::clone(tree));
    let mut loss_sum = 0.0;

    for batch in loader.epoch(0) {
        let batch = batch.map_err(|e| e.at_stage(Stage::Validation))?;
        match pass.run(&batch) {
            Ok(scored) => scored.record(&batch, &mut metrics, &mut loss_sum)?,
            Err(e) if e.is_resource_exhausted() => {
                log::warn!("validation batch of {} exhausted resources, retrying in halves", batch.size());
                let (first, second) =
                    batch.split_half().ok_or_else(|| e.at_sample(Stage::Validation, batch.first_id()))?;
                for half in [first, second] {
                    let scored =
                        pass.run(&half).map_err(|e| e.at_sample(Stage::Validation, half.first_id()))?;
                    scored.record(&half, &mut metrics, &mut loss_sum)?;
                }
            }
            Err(e) => return Err(e.at_stage(Stage::Validation)),
        }
    }

    let mean_loss = match (loss, metrics.sample_count()) {
        (Some(_), n) if n > 0 => Some(loss_sum / n as f32),
        _ => None,
    };
    Ok(ValidationOutcome { metrics, mean_loss })
}

struct Pass<'a> {
    model: &'a HierarchicalClassifier,
    loss: Option<&'a HierarchicalLoss>,
    projector: Option<&'a LineageProjector>,
}

struct Scored {
    predicted: Vec<LabelVector>,
    loss: Option<f32>,
}

impl Pass<'_> {
    fn run(&self, batch: &HierarchicalBatch) -> Result<Scored> {
        let logits = self.model.forward(batch)?;
        let loss = match self.loss {
            Some(l) => Some(l.forward(&logits, &batch.labels)?.value()),
            None => None,
        };
        let predicted = match self.projector {
            Some(p) => p.project(&logits)?,
            None => logits.argmax_labels(),
        };
        Ok(Scored { predicted, loss })
    }
}

impl Scored {
    fn record(&self, batch: &HierarchicalBatch, metrics: &mut HierarchicalMetrics, loss_sum: &mut f32) -> Result<()> {
        metrics.update(&self.predicted, &batch.labels)?;
        if let Some(l) = self.loss {
            *loss_sum += l * batch.size() as f32;
        }
        Ok(())
    }
}
