//! Backward operation trait and the plumbing shared by every op

use crate::autograd::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Gradient slot shared between an op's output tensor and its backward node
pub(crate) type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

/// A node in the reverse-mode graph
///
/// Implementations read the gradient accumulated on their output, push the
/// partial gradients into their inputs, then recurse into the inputs' ops.
pub trait BackwardOp {
    /// Propagate gradients to the inputs of this operation
    fn backward(&self);
}

/// Copy of the gradient on an op's output, if one has been set
///
/// Copied out so the cell is not borrowed while inputs recurse.
pub(crate) fn upstream(cell: &GradCell) -> Option<Array1<f32>> {
    cell.borrow().clone()
}

/// Continue the pass into every input that is itself an op output
pub(crate) fn propagate(inputs: &[&Tensor]) {
    for input in inputs {
        if let Some(op) = input.backward_op() {
            op.backward();
        }
    }
}

/// Attach `op` to `out` when `out` takes part in the graph
pub(crate) fn attach(out: &mut Tensor, op: impl FnOnce(GradCell) -> Rc<dyn BackwardOp>) {
    if out.requires_grad() {
        let node = op(out.grad_cell());
        out.set_backward_op(node);
    }
}
