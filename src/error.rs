//! Error types for linaje
//!
//! Every fatal error raised while building the taxonomy, training or validating
//! can be attributed to a [`Stage`] (and a sample id or label when one is known)
//! via [`Error::at_stage`].

use crate::taxonomy::Rank;
use std::fmt;
use thiserror::Error;

/// Result type alias for linaje operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error surfaced in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Taxonomy, dataset or model construction
    Construction,
    /// Training pass (forward/backward/optimizer)
    Training,
    /// Validation pass
    Validation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Construction => "construction",
            Stage::Training => "training",
            Stage::Validation => "validation",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in linaje
#[derive(Error, Debug)]
pub enum Error {
    /// The taxonomy table contradicts itself or has gaps
    #[error("Inconsistent taxonomy: {0}")]
    InconsistentTaxonomy(String),

    /// A label is not registered at the given rank
    #[error("Unknown taxon label '{label}' at rank {rank}")]
    UnknownTaxonLabel { rank: Rank, label: String },

    /// Index outside a rank's label range
    #[error("Index {index} out of range for rank {rank} ({size} labels)")]
    IndexOutOfRange { rank: Rank, index: usize, size: usize },

    /// Parent lookup on the root rank
    #[error("Rank {0} has no parent rank")]
    NoParent(Rank),

    /// Two components disagree on a tensor or batch shape
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch { context: String, expected: usize, actual: usize },

    /// Transient resource exhaustion while running a batch
    #[error("Resource exhausted while processing a batch of {batch_size} samples")]
    ResourceExhausted { batch_size: usize },

    /// Fatal error tagged with the stage (and sample) that triggered it
    #[error("{stage} failed{}: {source}", sample_id.as_ref().map(|id| format!(" at sample '{id}'")).unwrap_or_default())]
    Stage {
        stage: Stage,
        sample_id: Option<String>,
        #[source]
        source: Box<Error>,
    },

    /// Two samples share an identifier
    #[error("Duplicate sample id '{0}'")]
    DuplicateSampleId(String),

    /// A background data-loading worker went away
    #[error("Data loader error: {0}")]
    Loader(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV table could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap this error with the stage it surfaced in
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            // Already attributed; keep the innermost stage
            Error::Stage { .. } => self,
            other => Error::Stage { stage, sample_id: None, source: Box::new(other) },
        }
    }

    /// Wrap this error with the stage and the sample id that triggered it
    pub fn at_sample(self, stage: Stage, sample_id: impl Into<String>) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                sample_id: Some(sample_id.into()),
                source: Box::new(other),
            },
        }
    }

    /// Innermost error, skipping stage attribution
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether retrying with a smaller batch may succeed
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self.root(), Error::ResourceExhausted { .. })
    }

    /// Stage this error was attributed to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_message_names_sample() {
        let err = Error::UnknownTaxonLabel { rank: Rank::Species, label: "Foo_bar".into() }
            .at_sample(Stage::Construction, "img-17");
        let msg = err.to_string();
        assert!(msg.contains("construction"));
        assert!(msg.contains("img-17"));
        assert!(msg.contains("Foo_bar"));
    }

    #[test]
    fn test_at_stage_keeps_innermost() {
        let err = Error::ResourceExhausted { batch_size: 8 }
            .at_stage(Stage::Training)
            .at_stage(Stage::Validation);
        assert_eq!(err.stage(), Some(Stage::Training));
        assert!(err.is_resource_exhausted());
    }

    #[test]
    fn test_root_unwraps_stage() {
        let err = Error::NoParent(Rank::Kingdom).at_stage(Stage::Training);
        assert!(matches!(err.root(), Error::NoParent(Rank::Kingdom)));
    }
}
