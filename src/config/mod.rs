//! Declarative YAML configuration
//!
//! A [`TrainSpec`] names the taxonomy table, the feature tables and every
//! model/optimizer/loop setting. [`load_spec`] parses and validates it;
//! [`Pipeline`] turns it into datasets, loaders and a ready [`TrainEvalLoop`](crate::train::TrainEvalLoop).

mod schema;
mod train;
mod validate;

pub use schema::{DataSpec, ModelSpec, OptimSpec, TaxonomySpec, TrainSpec, TrainingSpec};
pub use train::{load_spec, train_from_yaml, Pipeline, TrainOverrides};
pub use validate::{validate_config, validate_paths, ValidationError};
