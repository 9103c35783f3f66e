//! Learning rate schedulers

mod cosine_annealing;

pub use cosine_annealing::CosineAnnealingLR;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler (once per epoch in the training loop)
    fn step(&mut self);
}
