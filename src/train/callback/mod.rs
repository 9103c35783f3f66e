//! Epoch-end bookkeeping: early stopping and checkpoint persistence

mod checkpoint;
mod early_stopping;

pub use checkpoint::{CheckpointWriter, SavedCheckpoint};
pub use early_stopping::EarlyStopping;
