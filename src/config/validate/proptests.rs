//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;
use std::path::PathBuf;

fn arb_valid_spec() -> impl Strategy<Value = TrainSpec> {
    (
        1usize..256,                             // batch_size
        1e-6f32..1.0,                            // lr
        1usize..100,                             // epochs
        proptest::collection::vec(0.0f32..5.0, 7), // rank_weights
        0.0f32..10.0,                            // penalty coefficient
        prop_oneof![Just("adamw"), Just("sgd")],
    )
        .prop_map(|(batch_size, lr, epochs, rank_weights, coef, optimizer)| TrainSpec {
            taxonomy: TaxonomySpec { path: PathBuf::from("taxonomy.csv") },
            data: DataSpec { train: PathBuf::from("train.csv"), val: None, batch_size, workers: 0, prefetch: 2 },
            model: ModelSpec::default(),
            optimizer: OptimSpec { name: optimizer.to_string(), lr, ..Default::default() },
            training: TrainingSpec {
                epochs,
                rank_weights,
                consistency_penalty_coefficient: coef,
                ..Default::default()
            },
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_lr_above_one_fails(spec in arb_valid_spec(), high_lr in 1.01f32..10.0) {
        let mut spec = spec;
        spec.optimizer.lr = high_lr;
        prop_assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidLearningRate(_))));
    }

    #[test]
    fn prop_any_negative_weight_fails(spec in arb_valid_spec(), idx in 0usize..7, w in -10.0f32..-1e-6) {
        let mut spec = spec;
        spec.training.rank_weights[idx] = w;
        let rejected = matches!(validate_config(&spec), Err(ValidationError::InvalidRankWeight { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn prop_negative_penalty_fails(spec in arb_valid_spec(), coef in -10.0f32..-1e-6) {
        let mut spec = spec;
        spec.training.consistency_penalty_coefficient = coef;
        prop_assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidPenaltyCoefficient(_))));
    }
}
