//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Taxonomy table does not exist: {0}")]
    TaxonomyNotFound(String),

    #[error("Training data path does not exist: {0}")]
    TrainDataNotFound(String),

    #[error("Validation data path does not exist: {0}")]
    ValDataNotFound(String),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid minimum learning rate: {0} (must be >= 0.0 and <= lr)")]
    InvalidMinLearningRate(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid prefetch depth: {0} (must be > 0 when workers are used)")]
    InvalidPrefetch(usize),

    #[error("Expected 7 rank weights (kingdom..species), got {0}")]
    InvalidRankWeightCount(usize),

    #[error("Invalid weight {value} for rank {rank} (must be finite and >= 0.0)")]
    InvalidRankWeight { rank: String, value: f32 },

    #[error("Invalid consistency penalty coefficient: {0} (must be finite and >= 0.0)")]
    InvalidPenaltyCoefficient(f32),

    #[error("Invalid min_delta: {0} (must be finite and >= 0.0)")]
    InvalidMinDelta(f32),

    #[error("Invalid optimizer: {0} (must be one of: adamw, sgd)")]
    InvalidOptimizer(String),

    #[error("Invalid encoder: {0} (must be one of: linear, passthrough)")]
    InvalidEncoder(String),

    #[error("Invalid embed_dim: {0} (must be > 0 for the linear encoder)")]
    InvalidEmbedDim(usize),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid activation budget: {0} (must be > 0)")]
    InvalidActivationBudget(usize),
}

impl From<ValidationError> for crate::Error {
    fn from(e: ValidationError) -> Self {
        crate::Error::ConfigError(format!("Invalid config: {e}"))
    }
}
