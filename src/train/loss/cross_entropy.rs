//! Cross entropy over batched logits with integer targets

use crate::autograd::log_softmax_rows;
use ndarray::Array1;

/// Mean cross entropy of a `rows x cols` logit matrix against label indices
///
/// Returns the loss and `d(loss)/d(logits) = (softmax - onehot) / rows`.
/// Callers guarantee `labels.len() == rows` and every label `< cols`.
pub fn cross_entropy_rows(logits: &[f32], labels: &[usize], rows: usize, cols: usize) -> (f32, Array1<f32>) {
    debug_assert_eq!(logits.len(), rows * cols);
    debug_assert_eq!(labels.len(), rows);

    let log_probs = log_softmax_rows(logits, rows, cols);
    let inv_rows = 1.0 / rows.max(1) as f32;

    let mut loss = 0.0;
    let mut grad = Array1::zeros(rows * cols);
    for (i, &label) in labels.iter().enumerate() {
        let row = &log_probs[i * cols..(i + 1) * cols];
        loss -= row[label];
        for (j, &lp) in row.iter().enumerate() {
            let target = if j == label { 1.0 } else { 0.0 };
            grad[i * cols + j] = (lp.exp() - target) * inv_rows;
        }
    }

    (loss * inv_rows, grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_logits() {
        let (loss, _) = cross_entropy_rows(&[0.0; 4], &[1], 1, 4);
        assert_relative_eq!(loss, 4.0f32.ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_confident_correct_is_near_zero() {
        let (loss, grad) = cross_entropy_rows(&[20.0, 0.0, 0.0, 20.0], &[0, 1], 2, 2);
        assert!(loss >= 0.0);
        assert!(loss < 1e-3, "{loss}");
        assert!(grad[0] <= 0.0);
        assert!(grad[3] <= 0.0);
    }

    #[test]
    fn test_confident_wrong_costs_the_margin() {
        // row 0 right, row 1 wrong by a margin of 20
        let (loss, grad) = cross_entropy_rows(&[20.0, 0.0, 20.0, 0.0], &[0, 1], 2, 2);
        assert_relative_eq!(loss, 10.0, epsilon = 1e-3);
        assert!(grad[2] > 0.0);
        assert!(grad[3] < 0.0);
    }

    #[test]
    fn test_gradient_rows_sum_to_zero() {
        let (_, grad) = cross_entropy_rows(&[1.0, -2.0, 0.5, 3.0, 0.0, 0.0], &[2, 0], 2, 3);
        for row in grad.as_slice().unwrap().chunks(3) {
            assert_relative_eq!(row.iter().sum::<f32>(), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let logits = [0.3f32, -0.7, 1.1];
        let (_, grad) = cross_entropy_rows(&logits, &[1], 1, 3);
        let eps = 1e-3;
        for j in 0..3 {
            let mut plus = logits;
            let mut minus = logits;
            plus[j] += eps;
            minus[j] -= eps;
            let numeric = (cross_entropy_rows(&plus, &[1], 1, 3).0 - cross_entropy_rows(&minus, &[1], 1, 3).0) / (2.0 * eps);
            assert_relative_eq!(grad[j], numeric, epsilon = 1e-3);
        }
    }
}
