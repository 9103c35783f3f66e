//! Dense matrix product on flat row-major buffers
//!
//! Every layer in the classifier is `x·W (+ b)` with `x` of shape
//! `batch x in` and `W` of shape `in x out`, so this is the only product the
//! autograd needs.

use crate::autograd::{attach, is_grad_enabled, propagate, upstream, BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// `rows x cols` to `cols x rows`
pub fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; data.len()];
    for (r, row) in data.chunks_exact(cols.max(1)).take(rows).enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[c * rows + r] = v;
        }
    }
    out
}

/// `C = A·B` for `A: m x k`, `B: k x n`
pub fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for (c_ij, b_pj) in c_row.iter_mut().zip(&b[p * n..(p + 1) * n]) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
    c
}

/// `dA = dC·Bᵀ`, computed without materialising `Bᵀ`
fn grad_lhs(grad_c: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut grad = vec![0.0f32; m * k];
    for i in 0..m {
        let g_row = &grad_c[i * n..(i + 1) * n];
        for p in 0..k {
            let b_row = &b[p * n..(p + 1) * n];
            grad[i * k + p] = g_row.iter().zip(b_row).map(|(g, w)| g * w).sum();
        }
    }
    grad
}

/// `dB = Aᵀ·dC`
fn grad_rhs(a: &[f32], grad_c: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    matmul_compute(&transpose(a, m, k), grad_c, k, m, n)
}

/// Differentiable `A·B`
///
/// Panics if the buffer lengths disagree with `m`, `k`, `n`; callers check
/// batch widths before building the graph.
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "lhs is not {m}x{k}");
    assert_eq!(b.len(), k * n, "rhs is not {k}x{n}");

    let requires_grad = (a.requires_grad() || b.requires_grad()) && is_grad_enabled();
    let mut out = Tensor::new(Array1::from(matmul_compute(a.as_slice(), b.as_slice(), m, k, n)), requires_grad);

    attach(&mut out, |out_grad| Rc::new(MatmulBackward { a: a.clone(), b: b.clone(), dims: (m, k, n), out_grad }));
    out
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    dims: (usize, usize, usize),
    out_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        let Some(grad_c) = upstream(&self.out_grad).map(|g| g.to_vec()) else { return };
        let (m, k, n) = self.dims;

        if self.a.requires_grad() {
            self.a.accumulate_grad(Array1::from(grad_lhs(&grad_c, self.b.as_slice(), m, k, n)));
        }
        if self.b.requires_grad() {
            self.b.accumulate_grad(Array1::from(grad_rhs(self.a.as_slice(), &grad_c, m, k, n)));
        }

        propagate(&[&self.a, &self.b]);
    }
}
