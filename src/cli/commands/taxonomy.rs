//! Taxonomy command implementation

use crate::cli::TaxonomyArgs;
use crate::error::Stage;
use crate::taxonomy::{Rank, TaxonomyTree};
use crate::Result;

pub fn run_taxonomy(args: TaxonomyArgs) -> Result<()> {
    let tree = TaxonomyTree::from_csv(&args.path).map_err(|e| e.at_stage(Stage::Construction))?;
    println!("Taxonomy {}", args.path.display());
    println!("{}", format_rank_counts(&tree));
    Ok(())
}

/// One line per rank with its label count
pub fn format_rank_counts(tree: &TaxonomyTree) -> String {
    Rank::ALL
        .iter()
        .map(|&rank| format!("  {:<8} {}", rank.name(), tree.rank_size(rank)))
        .collect::<Vec<_>>()
        .join("\n")
}
