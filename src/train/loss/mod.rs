//! Loss functions for hierarchical training

mod cross_entropy;
mod hierarchical;

pub use cross_entropy::cross_entropy_rows;
pub use hierarchical::{HierarchicalLoss, LossOutput};
