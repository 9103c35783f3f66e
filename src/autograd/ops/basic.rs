//! Element-wise arithmetic and the row-broadcast bias

use crate::autograd::{attach, is_grad_enabled, propagate, upstream, BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

fn tracks(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Element-wise `a + b`
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: operands differ in length");
    let mut out = Tensor::new(a.data() + b.data(), tracks(&[a, b]));
    attach(&mut out, |out_grad| Rc::new(AddBackward { a: a.clone(), b: b.clone(), out_grad }));
    out
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    out_grad: GradCell,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        let Some(grad) = upstream(&self.out_grad) else { return };
        for input in [&self.a, &self.b] {
            if input.requires_grad() {
                input.accumulate_grad(grad.clone());
            }
        }
        propagate(&[&self.a, &self.b]);
    }
}

/// Add a `cols`-long bias to every row of a `rows x cols` matrix
pub fn add_bias(x: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(x.len(), rows * cols, "add_bias: input is not {rows}x{cols}");
    assert_eq!(bias.len(), cols, "add_bias: bias is not {cols} wide");

    let b = bias.as_slice();
    let data: Vec<f32> = x.as_slice().iter().enumerate().map(|(i, v)| v + b[i % cols]).collect();
    let mut out = Tensor::new(Array1::from(data), tracks(&[x, bias]));
    attach(&mut out, |out_grad| Rc::new(AddBiasBackward { x: x.clone(), bias: bias.clone(), cols, out_grad }));
    out
}

struct AddBiasBackward {
    x: Tensor,
    bias: Tensor,
    cols: usize,
    out_grad: GradCell,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        let Some(grad) = upstream(&self.out_grad) else { return };
        if self.bias.requires_grad() {
            // column sums
            let mut grad_b = Array1::zeros(self.cols);
            for (i, g) in grad.iter().enumerate() {
                grad_b[i % self.cols] += g;
            }
            self.bias.accumulate_grad(grad_b);
        }
        if self.x.requires_grad() {
            self.x.accumulate_grad(grad);
        }
        propagate(&[&self.x, &self.bias]);
    }
}

/// `factor * a`
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let mut out = Tensor::new(a.data() * factor, tracks(&[a]));
    attach(&mut out, |out_grad| Rc::new(ScaleBackward { a: a.clone(), factor, out_grad }));
    out
}

struct ScaleBackward {
    a: Tensor,
    factor: f32,
    out_grad: GradCell,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        let Some(grad) = upstream(&self.out_grad) else { return };
        if self.a.requires_grad() {
            self.a.accumulate_grad(grad * self.factor);
        }
        propagate(&[&self.a]);
    }
}

/// Sum of all elements, as a length-1 tensor
pub fn sum(a: &Tensor) -> Tensor {
    let mut out = Tensor::new(Array1::from(vec![a.data().sum()]), tracks(&[a]));
    attach(&mut out, |out_grad| Rc::new(SumBackward { a: a.clone(), out_grad }));
    out
}

struct SumBackward {
    a: Tensor,
    out_grad: GradCell,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        let Some(grad) = upstream(&self.out_grad) else { return };
        if self.a.requires_grad() {
            self.a.accumulate_grad(Array1::from_elem(self.a.len(), grad[0]));
        }
        propagate(&[&self.a]);
    }
}
