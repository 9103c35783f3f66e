//! Sample sources and batch loading

mod features;
mod loader;
mod sample;

pub use features::{read_feature_csv, read_features};
pub use loader::{EpochBatches, PrefetchLoader};
pub use sample::{Dataset, RawSample, Sample};
