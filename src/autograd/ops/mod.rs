//! Autograd operations with backward passes

mod activations;
mod basic;
mod matmul;

pub use activations::{argmax, log_softmax_rows, relu, softmax_row, softmax_rows};
pub use basic::{add, add_bias, scale, sum};
pub use matmul::{matmul, matmul_compute, transpose};
