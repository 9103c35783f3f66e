//! Property-based tests for basic operations (add, relu, scale, add_bias)

use super::test_utils::numeric_grad;
use crate::autograd::{add, add_bias, backward, relu, scale, Tensor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_add_backward_gradient_check(
        xy in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0), 2..20)
    ) {
        let (x, y): (Vec<f32>, Vec<f32>) = xy.into_iter().unzip();

        let a = Tensor::from_vec(x.clone(), true);
        let b = Tensor::from_vec(y.clone(), true);
        let mut c = add(&a, &b);

        let c_len = c.len();
        backward(&mut c, Some(ndarray::Array1::ones(c_len)));

        let analytical_a = a.grad().expect("gradient should be available");

        let numerical_a = numeric_grad(
            |x_val| {
                let t_a = Tensor::from_vec(x_val.to_vec(), false);
                let t_b = Tensor::from_vec(y.clone(), false);
                add(&t_a, &t_b).data().sum()
            },
            &x,
            1e-3,
        );

        for i in 0..x.len() {
            let diff = (analytical_a[i] - numerical_a[i]).abs();
            prop_assert!(diff < 0.1, "Gradient mismatch at index {}: analytical={}, numerical={}",
                i, analytical_a[i], numerical_a[i]);
        }
    }

    #[test]
    fn prop_relu_backward_gradient_check(
        // Keep away from the kink at zero
        x in prop::collection::vec(prop_oneof![-10.0f32..-0.1, 0.1f32..10.0], 2..20)
    ) {
        let a = Tensor::from_vec(x.clone(), true);
        let mut y = relu(&a);
        let len = y.len();
        backward(&mut y, Some(ndarray::Array1::ones(len)));

        let analytical = a.grad().expect("gradient should be available");
        let numerical = numeric_grad(
            |x_val| relu(&Tensor::from_vec(x_val.to_vec(), false)).data().sum(),
            &x,
            1e-3,
        );

        for i in 0..x.len() {
            prop_assert!((analytical[i] - numerical[i]).abs() < 0.1);
        }
    }

    #[test]
    fn prop_scale_backward_is_factor(
        x in prop::collection::vec(-10.0f32..10.0, 1..20),
        factor in -5.0f32..5.0,
    ) {
        let a = Tensor::from_vec(x.clone(), true);
        let mut y = scale(&a, factor);
        let len = y.len();
        backward(&mut y, Some(ndarray::Array1::ones(len)));

        let grad = a.grad().expect("gradient should be available");
        for g in grad.iter() {
            prop_assert!((g - factor).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_add_bias_gradient_check(
        rows in 1usize..5,
        cols in 1usize..5,
        seed in 0u64..1000,
    ) {
        let bias_data: Vec<f32> = (0..cols)
            .map(|i| ((seed + i as u64 * 7) % 100) as f32 / 10.0 - 5.0)
            .collect();
        let x_data: Vec<f32> = (0..rows * cols)
            .map(|i| ((seed + i as u64 * 13) % 100) as f32 / 10.0 - 5.0)
            .collect();

        let x = Tensor::from_vec(x_data.clone(), false);
        let b = Tensor::from_vec(bias_data.clone(), true);
        let mut y = add_bias(&x, &b, rows, cols);
        let len = y.len();
        backward(&mut y, Some(ndarray::Array1::ones(len)));

        let analytical = b.grad().expect("gradient should be available");
        let numerical = numeric_grad(
            |b_val| {
                let t_x = Tensor::from_vec(x_data.clone(), false);
                let t_b = Tensor::from_vec(b_val.to_vec(), false);
                add_bias(&t_x, &t_b, rows, cols).data().sum()
            },
            &bias_data,
            1e-3,
        );

        for i in 0..cols {
            prop_assert!((analytical[i] - numerical[i]).abs() < 0.1,
                "bias grad {} vs {}", analytical[i], numerical[i]);
        }
    }
}
