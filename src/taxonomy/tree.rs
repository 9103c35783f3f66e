//! Immutable seven-rank taxonomy tree
//!
//! Built once from (kingdom … species) rows. Every label gets a dense index
//! within its rank; every non-root label has exactly one parent at the rank
//! above. Construction never guesses: a missing rank, a label registered under
//! two different parents, or a label reused at two ranks aborts the build with
//! [`Error::InconsistentTaxonomy`].

use super::{LabelVector, Lineage, Rank, RANK_COUNT};
use crate::{Error, Result};
use std::collections::HashMap;

/// One row of the taxonomy table, kingdom first
///
/// `None` (or an empty string) marks a missing rank, which fails construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaxonomyRow {
    names: [Option<String>; RANK_COUNT],
}

impl TaxonomyRow {
    /// Row with every rank present
    pub fn new(names: [&str; RANK_COUNT]) -> Self {
        Self { names: names.map(|n| Some(n.to_string())) }
    }

    /// Row that may have gaps
    pub fn from_options(names: [Option<String>; RANK_COUNT]) -> Self {
        Self { names }
    }

    /// Name at a rank (empty strings count as missing)
    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.names[rank.index()].as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Read-only taxonomy shared by the codec, the loss and the loaders
#[derive(Debug, Clone)]
pub struct TaxonomyTree {
    labels: [Vec<String>; RANK_COUNT],
    index: [HashMap<String, usize>; RANK_COUNT],
    /// parents[r][i] = index at rank r-1; empty for kingdom
    parents: [Vec<usize>; RANK_COUNT],
    /// Full lineage of every species, by species index
    species_lineages: Vec<LabelVector>,
}

impl TaxonomyTree {
    /// Build the tree from table rows
    ///
    /// Row numbers in error messages are 1-based.
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = TaxonomyRow>,
    {
        let mut builder = TreeBuilder::default();
        for (i, row) in rows.into_iter().enumerate() {
            builder.add_row(i + 1, &row)?;
        }
        builder.build()
    }

    /// Number of labels at a rank
    pub fn rank_size(&self, rank: Rank) -> usize {
        self.labels[rank.index()].len()
    }

    /// Label counts for all ranks, kingdom first
    pub fn rank_sizes(&self) -> [usize; RANK_COUNT] {
        Rank::ALL.map(|r| self.rank_size(r))
    }

    /// Dense index of a label within its rank
    pub fn index_of(&self, rank: Rank, label: &str) -> Result<usize> {
        self.index[rank.index()].get(label).copied().ok_or_else(|| Error::UnknownTaxonLabel {
            rank,
            label: label.to_string(),
        })
    }

    /// Label name for a dense index
    pub fn label_of(&self, rank: Rank, index: usize) -> Result<&str> {
        self.labels[rank.index()].get(index).map(String::as_str).ok_or(Error::IndexOutOfRange {
            rank,
            index,
            size: self.rank_size(rank),
        })
    }

    /// Parent index at the rank above; fails for kingdom
    pub fn parent_of(&self, rank: Rank, index: usize) -> Result<usize> {
        if rank.parent().is_none() {
            return Err(Error::NoParent(rank));
        }
        self.parents[rank.index()].get(index).copied().ok_or(Error::IndexOutOfRange {
            rank,
            index,
            size: self.rank_size(rank),
        })
    }

    /// Full lineage (7 indices) of a species label
    pub fn lineage_of(&self, species: &str) -> Result<LabelVector> {
        let idx = self.index_of(Rank::Species, species)?;
        Ok(self.species_lineages[idx])
    }

    /// Full lineage of a species by index
    pub fn lineage_of_index(&self, species_index: usize) -> Result<LabelVector> {
        self.species_lineages.get(species_index).copied().ok_or(Error::IndexOutOfRange {
            rank: Rank::Species,
            index: species_index,
            size: self.rank_size(Rank::Species),
        })
    }

    /// Lineages of every species, by species index
    pub fn species_lineages(&self) -> &[LabelVector] {
        &self.species_lineages
    }

    /// Names for each index of a label vector
    pub fn lineage_names(&self, labels: &LabelVector) -> Result<Lineage> {
        let mut names: [String; RANK_COUNT] = Default::default();
        for (rank, idx) in labels.iter() {
            names[rank.index()] = self.label_of(rank, idx)?.to_string();
        }
        Ok(Lineage::new(names))
    }

    /// Whether all seven indices lie on one root-to-leaf path
    pub fn is_consistent(&self, labels: &LabelVector) -> bool {
        Rank::ALL.iter().skip(1).all(|&rank| {
            let parent_rank = Rank::ALL[rank.index() - 1];
            matches!(
                self.parent_of(rank, labels.get(rank)),
                Ok(p) if p == labels.get(parent_rank)
            )
        })
    }

    /// Labels registered at a rank, by index
    pub fn labels(&self, rank: Rank) -> &[String] {
        &self.labels[rank.index()]
    }
}

#[derive(Default)]
struct TreeBuilder {
    labels: [Vec<String>; RANK_COUNT],
    index: [HashMap<String, usize>; RANK_COUNT],
    parents: [Vec<usize>; RANK_COUNT],
    owner: HashMap<String, Rank>,
}

impl TreeBuilder {
    fn add_row(&mut self, row_number: usize, row: &TaxonomyRow) -> Result<()> {
        let mut names = [""; RANK_COUNT];
        for rank in Rank::ALL {
            names[rank.index()] = row.get(rank).ok_or_else(|| {
                Error::InconsistentTaxonomy(format!(
                    "row {row_number}: missing {rank} (species '{}')",
                    row.get(Rank::Species).unwrap_or("<missing>")
                ))
            })?;
        }

        let mut parent_idx: Option<usize> = None;
        for rank in Rank::ALL {
            let name = names[rank.index()];

            match self.owner.get(name) {
                Some(&owner) if owner != rank => {
                    return Err(Error::InconsistentTaxonomy(format!(
                        "row {row_number}: label '{name}' appears at both {owner} and {rank}"
                    )));
                }
                _ => {}
            }

            let r = rank.index();
            let idx = match self.index[r].get(name) {
                Some(&existing) => {
                    if let Some(expected_parent) = parent_idx {
                        let registered = self.parents[r][existing];
                        if registered != expected_parent {
                            let parent_rank = Rank::ALL[r - 1];
                            return Err(Error::InconsistentTaxonomy(format!(
                                "row {row_number}: {rank} '{name}' has conflicting parents: \
                                 {parent_rank} '{}' and {parent_rank} '{}'",
                                self.labels[r - 1][registered],
                                self.labels[r - 1][expected_parent],
                            )));
                        }
                    }
                    existing
                }
                None => {
                    let idx = self.labels[r].len();
                    self.labels[r].push(name.to_string());
                    self.index[r].insert(name.to_string(), idx);
                    self.owner.insert(name.to_string(), rank);
                    if let Some(p) = parent_idx {
                        self.parents[r].push(p);
                    }
                    idx
                }
            };
            parent_idx = Some(idx);
        }

        Ok(())
    }

    fn build(self) -> Result<TaxonomyTree> {
        if self.labels[Rank::Species.index()].is_empty() {
            return Err(Error::InconsistentTaxonomy("taxonomy table has no rows".into()));
        }

        let species_count = self.labels[Rank::Species.index()].len();
        let species_lineages = (0..species_count)
            .map(|s| {
                let mut indices = [0usize; RANK_COUNT];
                let mut current = s;
                for r in (0..RANK_COUNT).rev() {
                    indices[r] = current;
                    if r > 0 {
                        current = self.parents[r][current];
                    }
                }
                LabelVector::new(indices)
            })
            .collect();

        Ok(TaxonomyTree {
            labels: self.labels,
            index: self.index,
            parents: self.parents,
            species_lineages,
        })
    }
}
