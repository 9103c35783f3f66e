//! Per-sample lineage representations

use super::{Rank, RANK_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Seven dense label indices, one per rank, kingdom first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelVector([usize; RANK_COUNT]);

impl LabelVector {
    /// Build from raw per-rank indices
    pub const fn new(indices: [usize; RANK_COUNT]) -> Self {
        Self(indices)
    }

    /// Index at a rank
    pub fn get(&self, rank: Rank) -> usize {
        self.0[rank.index()]
    }

    /// Raw indices, kingdom first
    pub fn as_array(&self) -> &[usize; RANK_COUNT] {
        &self.0
    }

    /// (rank, index) pairs, kingdom first
    pub fn iter(&self) -> impl Iterator<Item = (Rank, usize)> + '_ {
        Rank::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<Rank> for LabelVector {
    type Output = usize;

    fn index(&self, rank: Rank) -> &usize {
        &self.0[rank.index()]
    }
}

/// Human-readable lineage, kingdom first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage([String; RANK_COUNT]);

impl Lineage {
    /// Build from per-rank names
    pub fn new(names: [String; RANK_COUNT]) -> Self {
        Self(names)
    }

    /// Name at a rank
    pub fn get(&self, rank: Rank) -> &str {
        &self.0[rank.index()]
    }

    /// Species name
    pub fn species(&self) -> &str {
        self.get(Rank::Species)
    }

    /// Names, kingdom first
    pub fn names(&self) -> &[String; RANK_COUNT] {
        &self.0
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_vector_access() {
        let lv = LabelVector::new([0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(lv.get(Rank::Order), 3);
        assert_eq!(lv[Rank::Species], 6);
        let pairs: Vec<_> = lv.iter().collect();
        assert_eq!(pairs[0], (Rank::Kingdom, 0));
        assert_eq!(pairs.len(), RANK_COUNT);
    }

    #[test]
    fn test_lineage_display() {
        let lineage = Lineage::new(["A", "B", "C", "D", "E", "F", "G"].map(String::from));
        assert_eq!(lineage.to_string(), "A > B > C > D > E > F > G");
        assert_eq!(lineage.species(), "G");
    }
}
