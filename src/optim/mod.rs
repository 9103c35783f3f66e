//! Optimizers and learning-rate schedules

mod adamw;
mod clip;
mod optimizer;
mod scheduler;
mod sgd;

pub use adamw::AdamW;
pub use clip::clip_grad_norm_refs;
pub use optimizer::Optimizer;
pub use scheduler::{CosineAnnealingLR, LRScheduler};
pub use sgd::SGD;
