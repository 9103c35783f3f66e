//! Activations: differentiable ReLU and row-wise softmax helpers

use crate::autograd::{attach, is_grad_enabled, propagate, upstream, BackwardOp, GradCell, Tensor};
use std::rc::Rc;

/// Element-wise `max(x, 0)`
pub fn relu(a: &Tensor) -> Tensor {
    let mut out = Tensor::new(a.data().mapv(|x| x.max(0.0)), a.requires_grad() && is_grad_enabled());
    attach(&mut out, |out_grad| Rc::new(ReluBackward { a: a.clone(), out_grad }));
    out
}

struct ReluBackward {
    a: Tensor,
    out_grad: GradCell,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        let Some(mut grad) = upstream(&self.out_grad) else { return };
        if self.a.requires_grad() {
            // gate at the input, zero at x <= 0
            grad.zip_mut_with(self.a.data(), |g, &x| {
                if x <= 0.0 {
                    *g = 0.0;
                }
            });
            self.a.accumulate_grad(grad);
        }
        propagate(&[&self.a]);
    }
}

/// Numerically stable softmax of one row
pub fn softmax_row(row: &[f32]) -> Vec<f32> {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Row-wise softmax of a flat `rows x cols` matrix (not differentiable)
pub fn softmax_rows(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(data.len(), rows * cols);
    let mut out = Vec::with_capacity(data.len());
    for row in data.chunks_exact(cols.max(1)).take(rows) {
        out.extend(softmax_row(row));
    }
    out
}

/// Row-wise log-softmax of a flat `rows x cols` matrix (not differentiable)
pub fn log_softmax_rows(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(data.len(), rows * cols);
    let mut out = Vec::with_capacity(data.len());
    for row in data.chunks_exact(cols.max(1)).take(rows) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let log_sum = row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln() + max;
        out.extend(row.iter().map(|&v| v - log_sum));
    }
    out
}

/// Index of the largest value; the first one wins ties
pub fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}
