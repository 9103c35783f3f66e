//! CLI command implementations

mod evaluate;
mod taxonomy;
mod train;
mod validate;

use crate::cli::{Cli, Command};
use crate::eval::MetricsReport;
use crate::taxonomy::Rank;
use crate::Result;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Train(args) => train::run_train(args),
        Command::Validate(args) => validate::run_validate(args),
        Command::Taxonomy(args) => taxonomy::run_taxonomy(args),
        Command::Evaluate(args) => evaluate::run_evaluate(args),
    }
}

/// Multi-line summary of a metrics report
pub(crate) fn format_report(report: &MetricsReport) -> String {
    let mut lines = vec![
        format!("  Samples: {}", report.sample_count),
        format!("  Hierarchical accuracy: {:.4}", report.hierarchical_accuracy),
        format!("  Mean rank accuracy: {:.4}", report.mean_rank_accuracy),
        format!("  Consistency rate: {:.4}", report.consistency_rate),
    ];
    for rank in Rank::ALL {
        if let Some(acc) = report.rank_accuracy.get(&rank) {
            lines.push(format!("    {:<8} {:.4} ({}/{})", rank.name(), acc.accuracy, acc.correct, acc.support));
        }
    }
    lines.join("\n")
}
