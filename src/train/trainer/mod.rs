//! Train/validate loop for the hierarchical classifier
//!
//! - Per-batch steps with a halves retry on resource exhaustion
//! - Epoch-level validation driving early stopping and best-checkpoint selection
//! - Cooperative cancellation at epoch boundaries

mod core;
mod result;
mod state;
mod step;
mod train_loop;

pub use core::TrainEvalLoop;
pub use result::TrainResult;
pub use state::LoopState;
