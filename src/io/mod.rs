//! Artifact persistence (checkpoints, reports)

mod checkpoint;
mod load;
mod save;

pub use checkpoint::Checkpoint;
pub use load::load_json;
pub use save::save_json;
