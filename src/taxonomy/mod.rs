//! Taxonomy: ranks, the immutable tree, and the label codec

mod codec;
mod lineage;
mod rank;
mod table;
mod tree;

pub use codec::LabelCodec;
pub use lineage::{LabelVector, Lineage};
pub use rank::{Rank, RANK_COUNT};
pub use tree::{TaxonomyRow, TaxonomyTree};
