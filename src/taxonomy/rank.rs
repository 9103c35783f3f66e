//! The seven fixed taxonomic ranks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of ranks in every lineage
pub const RANK_COUNT: usize = 7;

/// Taxonomic rank, ordered from the root (kingdom) to the leaves (species)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// All ranks, root first
    pub const ALL: [Rank; RANK_COUNT] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Position of the rank (kingdom = 0, species = 6)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank at a position, if in range
    pub fn from_index(index: usize) -> Option<Rank> {
        Self::ALL.get(index).copied()
    }

    /// The next coarser rank; `None` for kingdom
    pub fn parent(self) -> Option<Rank> {
        self.index().checked_sub(1).and_then(Rank::from_index)
    }

    /// The next finer rank; `None` for species
    pub fn child(self) -> Option<Rank> {
        Rank::from_index(self.index() + 1)
    }

    /// Lowercase column name
    pub const fn name(self) -> &'static str {
        match self {
            Rank::Kingdom => "kingdom",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Rank::ALL
            .into_iter()
            .find(|r| r.name() == needle)
            .ok_or_else(|| format!("unknown rank '{s}' (expected one of kingdom..species)"))
    }
}
