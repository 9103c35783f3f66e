//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::TrainSpec;
use crate::taxonomy::{Rank, RANK_COUNT};

/// Validate a training specification
///
/// Checks numeric ranges and enum names; file existence is checked
/// separately by [`validate_paths`].
pub fn validate_config(spec: &TrainSpec) -> Result<(), ValidationError> {
    if spec.data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(spec.data.batch_size));
    }
    if spec.data.workers > 0 && spec.data.prefetch == 0 {
        return Err(ValidationError::InvalidPrefetch(spec.data.prefetch));
    }

    let lr = spec.optimizer.lr;
    if !(lr > 0.0 && lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate(lr));
    }
    let min_lr = spec.training.min_lr;
    if !(min_lr >= 0.0 && min_lr <= lr) {
        return Err(ValidationError::InvalidMinLearningRate(min_lr));
    }
    if !["adamw", "sgd"].contains(&spec.optimizer.name.as_str()) {
        return Err(ValidationError::InvalidOptimizer(spec.optimizer.name.clone()));
    }

    match spec.model.encoder.as_str() {
        "linear" if spec.model.embed_dim == 0 => return Err(ValidationError::InvalidEmbedDim(0)),
        "linear" | "passthrough" => {}
        other => return Err(ValidationError::InvalidEncoder(other.to_string())),
    }
    if spec.model.activation_budget == Some(0) {
        return Err(ValidationError::InvalidActivationBudget(0));
    }

    let training = &spec.training;
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.rank_weights.len() != RANK_COUNT {
        return Err(ValidationError::InvalidRankWeightCount(training.rank_weights.len()));
    }
    for (rank, &w) in Rank::ALL.iter().zip(&training.rank_weights) {
        if !w.is_finite() || w < 0.0 {
            return Err(ValidationError::InvalidRankWeight { rank: rank.to_string(), value: w });
        }
    }
    let coef = training.consistency_penalty_coefficient;
    if !coef.is_finite() || coef < 0.0 {
        return Err(ValidationError::InvalidPenaltyCoefficient(coef));
    }
    if !training.min_delta.is_finite() || training.min_delta < 0.0 {
        return Err(ValidationError::InvalidMinDelta(training.min_delta));
    }
    if let Some(clip) = training.max_grad_norm {
        if clip <= 0.0 || !clip.is_finite() {
            return Err(ValidationError::InvalidGradClip(clip));
        }
    }

    Ok(())
}

/// Check that every input file named by the spec exists
pub fn validate_paths(spec: &TrainSpec) -> Result<(), ValidationError> {
    if !spec.taxonomy.path.exists() {
        return Err(ValidationError::TaxonomyNotFound(spec.taxonomy.path.display().to_string()));
    }
    if !spec.data.train.exists() {
        return Err(ValidationError::TrainDataNotFound(spec.data.train.display().to_string()));
    }
    if let Some(val) = &spec.data.val {
        if !val.exists() {
            return Err(ValidationError::ValDataNotFound(val.display().to_string()));
        }
    }
    Ok(())
}
