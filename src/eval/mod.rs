//! Evaluation metrics for hierarchical predictions
//!
//! - [`ConfusionCounts`] - sparse per-rank confusion data
//! - [`HierarchicalMetrics`] - per-rank and exact-lineage accuracy over a pass
//! - [`MetricsReport`] - serialisable summary written after validation

mod confusion;
mod hierarchical;
mod report;

pub use confusion::ConfusionCounts;
pub use hierarchical::HierarchicalMetrics;
pub use report::{ConfusionEntry, MetricsReport, RankAccuracy};
