//! Training and validation
//!
//! - Hierarchical loss (weighted per-rank cross entropy plus a lineage
//!   consistency penalty)
//! - Batches assembled from a [`Dataset`](crate::data::Dataset)
//! - Gradient-free validation pass
//! - [`TrainEvalLoop`] with early stopping and best checkpoints
//!
//! # Example
//!
//! ```no_run
//! use linaje::train::{TrainConfig, TrainEvalLoop};
//!
//! let config = TrainConfig::default()
//!     .with_epochs(30)
//!     .with_batch_size(64)
//!     .with_consistency_penalty(0.1)
//!     .with_output_dir("runs/exp1");
//! // let mut train_loop = TrainEvalLoop::new(model, optimizer, tree, config)?;
//! // let result = train_loop.run(&train_loader, &val_loader)?;
//! ```

mod batch;
pub mod callback;
mod config;
mod evaluate;
pub mod loss;
mod metrics;
mod trainer;

pub use batch::HierarchicalBatch;
pub use callback::{CheckpointWriter, EarlyStopping, SavedCheckpoint};
pub use config::TrainConfig;
pub use evaluate::{evaluate, ValidationOutcome};
pub use loss::{cross_entropy_rows, HierarchicalLoss, LossOutput};
pub use metrics::{EpochRecord, MetricsTracker};
pub use trainer::{LoopState, TrainEvalLoop, TrainResult};
