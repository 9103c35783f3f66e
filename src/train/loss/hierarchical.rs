//! Weighted multi-rank loss with a lineage-consistency penalty

use super::cross_entropy_rows;
use crate::autograd::{argmax, is_grad_enabled, BackwardOp, Tensor};
use crate::model::HierarchicalLogits;
use crate::taxonomy::{LabelCodec, LabelVector, Rank, TaxonomyTree, RANK_COUNT};
use crate::{Error, Result};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Scalar loss for backpropagation plus its components for logging
#[derive(Debug)]
pub struct LossOutput {
    /// `Σ_r w_r * CE_r + λ * penalty`
    pub total: Tensor,
    /// Unweighted mean cross entropy per rank
    pub rank_losses: [f32; RANK_COUNT],
    /// Unscaled consistency penalty (mean over the batch)
    pub consistency_penalty: f32,
}

impl LossOutput {
    pub fn value(&self) -> f32 {
        self.total.as_slice()[0]
    }
}

/// `total = Σ_r weight[r] * CE_r + coefficient * penalty`
///
/// The penalty, for each sample and each rank `r > 0`, takes the argmax label
/// at `r`, looks up its parent, and adds the log-probability gap at `r - 1`
/// between the argmax there and that parent:
/// `z[r-1][argmax] - z[r-1][parent]`. It is zero exactly when every adjacent
/// pair of argmax predictions agrees with the tree. Argmax choices are held
/// fixed during differentiation.
#[derive(Debug, Clone)]
pub struct HierarchicalLoss {
    tree: Arc<TaxonomyTree>,
    weights: [f32; RANK_COUNT],
    penalty_coefficient: f32,
}

impl HierarchicalLoss {
    pub fn new(tree: Arc<TaxonomyTree>, weights: [f32; RANK_COUNT], penalty_coefficient: f32) -> Result<Self> {
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::ConfigError(format!("rank weight {w} must be finite and >= 0")));
        }
        if !penalty_coefficient.is_finite() || penalty_coefficient < 0.0 {
            return Err(Error::ConfigError(format!(
                "consistency penalty coefficient {penalty_coefficient} must be finite and >= 0"
            )));
        }
        Ok(Self { tree, weights, penalty_coefficient })
    }

    /// Equal weights, no penalty
    pub fn unweighted(tree: Arc<TaxonomyTree>) -> Self {
        Self { tree, weights: [1.0; RANK_COUNT], penalty_coefficient: 0.0 }
    }

    pub fn weights(&self) -> &[f32; RANK_COUNT] {
        &self.weights
    }

    pub fn penalty_coefficient(&self) -> f32 {
        self.penalty_coefficient
    }

    pub fn forward(&self, logits: &HierarchicalLogits, labels: &[LabelVector]) -> Result<LossOutput> {
        self.forward_columns(logits, &LabelCodec::rank_columns(labels))
    }

    /// Loss against one label-index column per rank
    pub fn forward_columns(
        &self,
        logits: &HierarchicalLogits,
        columns: &[Vec<usize>; RANK_COUNT],
    ) -> Result<LossOutput> {
        let batch = logits.batch_size();
        let sizes = self.tree.rank_sizes();

        for rank in Rank::ALL {
            let r = rank.index();
            if columns[r].len() != batch {
                return Err(Error::ShapeMismatch {
                    context: format!("{rank} labels vs logits batch"),
                    expected: batch,
                    actual: columns[r].len(),
                });
            }
            if logits.classes(rank) != sizes[r] {
                return Err(Error::ShapeMismatch {
                    context: format!("{rank} logits width"),
                    expected: sizes[r],
                    actual: logits.classes(rank),
                });
            }
            if let Some(&bad) = columns[r].iter().find(|&&i| i >= sizes[r]) {
                return Err(Error::IndexOutOfRange { rank, index: bad, size: sizes[r] });
            }
        }

        let mut total = 0.0;
        let mut rank_losses = [0.0; RANK_COUNT];
        let mut grads: Vec<Array1<f32>> = Vec::with_capacity(RANK_COUNT);
        for rank in Rank::ALL {
            let r = rank.index();
            let (ce, grad) = cross_entropy_rows(logits.get(rank).as_slice(), &columns[r], batch, sizes[r]);
            rank_losses[r] = ce;
            total += self.weights[r] * ce;
            grads.push(grad * self.weights[r]);
        }

        let mut penalty = 0.0;
        if batch > 0 {
            let predicted = logits.argmax_labels();
            let step = self.penalty_coefficient / batch as f32;
            for (i, labels) in predicted.iter().enumerate() {
                for rank in &Rank::ALL[1..] {
                    let Some(parent_rank) = rank.parent() else { continue };
                    let p = parent_rank.index();
                    let expected_parent = self.tree.parent_of(*rank, labels.get(*rank))?;
                    let chosen = labels.get(parent_rank);
                    if chosen == expected_parent {
                        continue;
                    }
                    let row = logits.row(parent_rank, i);
                    penalty += row[chosen] - row[expected_parent];
                    grads[p][i * sizes[p] + chosen] += step;
                    grads[p][i * sizes[p] + expected_parent] -= step;
                }
            }
            penalty /= batch as f32;
        }
        total += self.penalty_coefficient * penalty;

        let inputs: Vec<Tensor> = Rank::ALL.iter().map(|&r| logits.get(r).clone()).collect();
        let requires_grad = is_grad_enabled() && inputs.iter().any(Tensor::requires_grad);
        let mut total_tensor = Tensor::from_vec(vec![total], requires_grad);
        if requires_grad {
            let op = Rc::new(HierarchicalLossBackward {
                inputs,
                grads,
                result_grad: total_tensor.grad_cell(),
            });
            total_tensor.set_backward_op(op);
        }

        Ok(LossOutput { total: total_tensor, rank_losses, consistency_penalty: penalty })
    }
}

struct HierarchicalLossBackward {
    inputs: Vec<Tensor>,
    grads: Vec<Array1<f32>>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for HierarchicalLossBackward {
    fn backward(&self) {
        let upstream = match self.result_grad.borrow().as_ref() {
            Some(g) => g[0],
            None => return,
        };
        for (input, grad) in self.inputs.iter().zip(&self.grads) {
            if input.requires_grad() {
                input.accumulate_grad(grad * upstream);
                if let Some(op) = input.backward_op() {
                    op.backward();
                }
            }
        }
    }
}
