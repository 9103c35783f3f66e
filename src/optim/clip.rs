//! Gradient clipping

use crate::Tensor;

/// Clip gradients by global norm
///
/// global_norm = sqrt(Σ ||g||²); when it exceeds `max_norm` every gradient is
/// scaled by `max_norm / global_norm`.
///
/// Returns the norm measured before clipping.
pub fn clip_grad_norm_refs(params: &mut [&mut Tensor], max_norm: f32) -> f32 {
    let global_norm = params
        .iter()
        .filter_map(|p| p.grad())
        .map(|g| g.iter().map(|&v| v * v).sum::<f32>())
        .sum::<f32>()
        .sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter() {
            if let Some(grad) = param.grad() {
                param.set_grad(grad * clip_coef);
            }
        }
    }

    global_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_below_threshold_is_unchanged() {
        let mut p0 = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut p1 = Tensor::from_vec(vec![3.0], true);
        p0.set_grad(arr1(&[0.1, 0.2]));
        p1.set_grad(arr1(&[0.1]));

        let global_norm = clip_grad_norm_refs(&mut [&mut p0, &mut p1], 1.0);
        assert_abs_diff_eq!(global_norm, 0.245, epsilon = 1e-3);
        assert_abs_diff_eq!(p0.grad().unwrap()[1], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_clipping_scales_to_max_norm() {
        let mut p0 = Tensor::from_vec(vec![1.0, 2.0], true);
        let mut p1 = Tensor::from_vec(vec![3.0], true);
        p0.set_grad(arr1(&[3.0, 4.0]));
        p1.set_grad(arr1(&[0.0]));

        let global_norm = clip_grad_norm_refs(&mut [&mut p0, &mut p1], 1.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p0.grad().unwrap()[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(p0.grad().unwrap()[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_gradients_are_skipped() {
        let mut p0 = Tensor::from_vec(vec![1.0], true);
        let mut p1 = Tensor::from_vec(vec![1.0], true);
        p0.set_grad(arr1(&[3.0]));

        let global_norm = clip_grad_norm_refs(&mut [&mut p0, &mut p1], 1.0);
        assert_abs_diff_eq!(global_norm, 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p0.grad().unwrap()[0], 1.0, epsilon = 1e-6);
        assert!(p1.grad().is_none());
    }
}
