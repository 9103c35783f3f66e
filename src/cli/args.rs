//! Core CLI types - Cli, Command, and argument structs

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Linaje: seven-rank hierarchical taxonomic classification
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "linaje")]
#[command(version)]
#[command(about = "Train and evaluate hierarchical (kingdom..species) classifiers")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train a classifier from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration and its taxonomy without training
    Validate(ValidateArgs),

    /// Build a taxonomy tree and print per-rank label counts
    Taxonomy(TaxonomyArgs),

    /// Score a checkpoint on the validation split
    Evaluate(EvaluateArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "FILE")]
    pub config: PathBuf,

    /// Override number of epochs
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    pub lr: Option<f32>,

    /// Override random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "FILE")]
    pub config: PathBuf,
}

/// Arguments for the taxonomy command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TaxonomyArgs {
    /// Taxonomy CSV with kingdom..species columns
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "FILE")]
    pub config: PathBuf,

    /// Checkpoint JSON written by `train`
    #[arg(long, value_name = "FILE")]
    pub checkpoint: PathBuf,

    /// Project predictions onto the most likely consistent lineage
    #[arg(long)]
    pub project: bool,
}
