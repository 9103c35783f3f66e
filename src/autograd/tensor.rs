//! Differentiable tensor with a shared gradient cell

use super::BackwardOp;
use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Flat f32 tensor with optional gradient tracking
///
/// Data is owned per clone; the gradient cell is shared between clones, so a
/// clone captured by a backward op accumulates into the same gradient as the
/// parameter it was taken from.
#[derive(Clone)]
pub struct Tensor {
    data: Array1<f32>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a tensor from an array
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Create a tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Underlying data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable access to the underlying data
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Data as a contiguous slice
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().expect("tensor data is always contiguous")
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether gradients are tracked for this tensor
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Copy of the current gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Shared gradient cell (used by backward ops)
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f32>>>> {
        Rc::clone(&self.grad)
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Backward op that produced this tensor
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Attach the op that produced this tensor
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// New leaf with the same data and a fresh gradient cell
    pub fn detach(&self, requires_grad: bool) -> Tensor {
        Tensor::new(self.data.clone(), requires_grad)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("len", &self.data.len())
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .field("has_backward_op", &self.backward_op.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_clone_shares_grad_cell() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = a.clone();
        b.accumulate_grad(arr1(&[0.5, 0.5]));
        assert_eq!(a.grad().unwrap().to_vec(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_accumulate_adds() {
        let a = Tensor::zeros(2, true);
        a.accumulate_grad(arr1(&[1.0, 2.0]));
        a.accumulate_grad(arr1(&[1.0, 2.0]));
        assert_eq!(a.grad().unwrap().to_vec(), vec![2.0, 4.0]);
        a.zero_grad();
        assert!(a.grad().is_none());
    }

    #[test]
    fn test_detach_has_fresh_grad() {
        let a = Tensor::from_vec(vec![1.0], true);
        a.set_grad(arr1(&[3.0]));
        let d = a.detach(true);
        assert!(d.grad().is_none());
        assert_eq!(d.data()[0], 1.0);
    }
}
