//! Linaje: hierarchy-aware training for seven-rank taxonomic classification
//!
//! A shared encoder feeds one classification head per rank (kingdom through
//! species). Training combines weighted per-rank cross entropy with an
//! optional penalty for predicted lineages that contradict the taxonomy, and
//! validation reports per-rank plus exact-lineage (hierarchical) accuracy.
//!
//! # Modules
//!
//! - [`taxonomy`] - ranks, the immutable taxonomy tree and the label codec
//! - [`data`] - feature tables, encoded datasets and the prefetching loader
//! - [`autograd`] - reverse-mode tensors backing the trainable parameters
//! - [`model`] - encoders, the hierarchical classifier and lineage projection
//! - [`optim`] - AdamW/SGD, gradient clipping and cosine annealing
//! - [`train`] - hierarchical loss and the train/validate loop
//! - [`eval`] - hierarchical metrics and reports
//! - [`io`] - checkpoints and JSON persistence
//! - [`config`] - declarative YAML training specs
//! - [`cli`] - the `linaje` command line
//!
//! # Example
//!
//! ```no_run
//! use linaje::taxonomy::{LabelCodec, Rank, TaxonomyTree};
//! use std::sync::Arc;
//!
//! let tree = Arc::new(TaxonomyTree::from_csv("taxonomy.csv")?);
//! let codec = LabelCodec::new(Arc::clone(&tree));
//! let labels = codec.encode("Corymorpha_nutans")?;
//! println!("genus index: {}", labels.get(Rank::Genus));
//! # Ok::<(), linaje::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod io;
pub mod model;
pub mod optim;
pub mod taxonomy;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result, Stage};
