//! YAML-driven pipeline and CLI commands over files on disk

mod common;

use clap::Parser;
use linaje::cli::{run_command, Cli};
use linaje::config::{load_spec, train_from_yaml, Pipeline, TrainOverrides};
use linaje::eval::MetricsReport;
use linaje::train::LoopState;
use linaje::{Error, Stage};
use std::fs;

#[test]
fn train_from_yaml_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "  consistency_penalty_coefficient: 0.2\n");

    let result = train_from_yaml(&config, TrainOverrides::default()).unwrap();
    assert_eq!(result.state, LoopState::Completed);
    assert_eq!(result.epochs_run, 4);

    let out = dir.path().join("out");
    for file in ["history.csv", "metrics.json", "rank_accuracy.csv", "checkpoints/checkpoint_best.json"] {
        assert!(out.join(file).exists(), "missing {file}");
    }
    let report = MetricsReport::load_json(out.join("metrics.json")).unwrap();
    assert_eq!(report.sample_count, 8);
}

#[test]
fn overrides_take_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "");
    let overrides = TrainOverrides { epochs: Some(2), lr: Some(0.01), seed: Some(99) };

    let result = train_from_yaml(&config, overrides).unwrap();
    assert_eq!(result.epochs_run, 2);
}

#[test]
fn evaluate_checkpoint_with_projection() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "");
    train_from_yaml(&config, TrainOverrides::default()).unwrap();

    let pipeline = Pipeline::from_spec(load_spec(&config).unwrap()).unwrap();
    let best = dir.path().join("out/checkpoints/checkpoint_best.json");

    let plain = pipeline.evaluate_checkpoint(&best, false).unwrap();
    let projected = pipeline.evaluate_checkpoint(&best, true).unwrap();
    assert_eq!(plain.sample_count, 8);
    assert_eq!(projected.consistency_rate, 1.0);
    assert!(dir.path().join("out/eval_metrics.json").exists());
}

#[test]
fn unknown_training_label_names_the_sample() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "");
    let train = dir.path().join("train.csv");
    let text = fs::read_to_string(&train).unwrap().replacen("Tubularia_indivisa", "Tubularia_indivisaa", 1);
    fs::write(&train, text).unwrap();

    let err = match Pipeline::from_spec(load_spec(&config).unwrap()) {
        Ok(_) => panic!("typo in the training table must fail"),
        Err(e) => e,
    };
    assert_eq!(err.stage(), Some(Stage::Construction));
    assert!(matches!(err.root(), Error::UnknownTaxonLabel { .. }));
    let msg = err.to_string();
    assert!(msg.contains("'t2'"), "{msg}");
    assert!(msg.contains("Tubularia_indivisaa"), "{msg}");
}

#[test]
fn invalid_penalty_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "  consistency_penalty_coefficient: -1.0\n");
    let err = load_spec(&config).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
    assert!(err.to_string().contains("penalty"));
}

#[test]
fn cli_validate_and_taxonomy_commands() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "");
    let config = config.to_str().unwrap();
    let taxonomy = dir.path().join("taxonomy.csv");

    run_command(Cli::try_parse_from(["linaje", "validate", config]).unwrap()).unwrap();
    run_command(Cli::try_parse_from(["linaje", "taxonomy", taxonomy.to_str().unwrap()]).unwrap()).unwrap();
}

#[test]
fn cli_reports_missing_taxonomy() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    let cli = Cli::try_parse_from(["linaje", "taxonomy", missing.to_str().unwrap()]).unwrap();
    let err = run_command(cli).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Construction));
}

#[test]
fn cli_train_then_evaluate() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_fixture(dir.path(), "");
    let config = config.to_str().unwrap();

    run_command(Cli::try_parse_from(["linaje", "train", config, "--epochs", "2"]).unwrap()).unwrap();
    let best = dir.path().join("out/checkpoints/checkpoint_best.json");
    assert!(best.exists());

    let cli = Cli::try_parse_from(["linaje", "evaluate", config, "--checkpoint", best.to_str().unwrap(), "--project"])
        .unwrap();
    run_command(cli).unwrap();
}
