//! Loading the taxonomy table from CSV
//!
//! The table is header-addressed: one column per rank (any order, case
//! insensitive), one row per known species. Extra columns are ignored.

use super::{Rank, TaxonomyRow, TaxonomyTree, RANK_COUNT};
use crate::{Error, Result};
use std::io::Read;
use std::path::Path;

impl TaxonomyTree {
    /// Build the tree from a CSV file
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::InconsistentTaxonomy(format!(
                "cannot open taxonomy table {}: {e}",
                path.display()
            ))
        })?;
        let tree = Self::from_reader(file)?;
        log::info!(
            "Loaded taxonomy from {} ({} species)",
            path.display(),
            tree.rank_size(Rank::Species)
        );
        Ok(tree)
    }

    /// Build the tree from any CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut columns = [0usize; RANK_COUNT];
        for rank in Rank::ALL {
            columns[rank.index()] = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(rank.name()))
                .ok_or_else(|| {
                    Error::InconsistentTaxonomy(format!(
                        "taxonomy table is missing the '{rank}' column"
                    ))
                })?;
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let names = columns.map(|c| record.get(c).map(str::to_string));
            rows.push(TaxonomyRow::from_options(names));
        }

        Self::from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
species,genus,family,order,class,phylum,kingdom,notes
Corymorpha_sp1,Corymorpha,Corymorphidae,Anthoathecata,Hydrozoa,Cnidaria,Animalia,x
Asterias_rubens,Asterias,Asteriidae,Forcipulatida,Asteroidea,Echinodermata,Animalia,
";

    #[test]
    fn test_from_reader_any_column_order() {
        let tree = TaxonomyTree::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(tree.rank_size(Rank::Species), 2);
        assert_eq!(tree.rank_size(Rank::Kingdom), 1);
        let lineage = tree.lineage_of("Asterias_rubens").unwrap();
        assert_eq!(tree.label_of(Rank::Phylum, lineage[Rank::Phylum]).unwrap(), "Echinodermata");
    }

    #[test]
    fn test_missing_column_fails() {
        let table = "kingdom,phylum,class,order,family,species\nA,B,C,D,E,F\n";
        let err = TaxonomyTree::from_reader(table.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'genus' column"));
    }

    #[test]
    fn test_empty_cell_fails() {
        let table = "kingdom,phylum,class,order,family,genus,species\nA,B,,D,E,F,G\n";
        let err = TaxonomyTree::from_reader(table.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InconsistentTaxonomy(_)));
        assert!(err.to_string().contains("row 1: missing class"));
    }

    #[test]
    fn test_from_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.csv");
        std::fs::write(&path, TABLE).unwrap();
        let tree = TaxonomyTree::from_csv(&path).unwrap();
        assert_eq!(tree.rank_sizes()[6], 2);
    }
}
