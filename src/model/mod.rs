//! Hierarchical classifier: swappable encoder, parallel rank heads

mod classifier;
mod encoder;
mod linear;
mod prediction;

pub use classifier::{HierarchicalClassifier, HierarchicalLogits, NamedParam};
pub use encoder::{FeatureEncoder, LinearEncoder, PassthroughEncoder};
pub use linear::Linear;
pub use prediction::{LineageProjector, Prediction};
