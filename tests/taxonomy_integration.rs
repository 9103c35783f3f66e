//! Taxonomy construction, encoding and decoding against real lineages

mod common;

use linaje::taxonomy::{LabelCodec, LabelVector, Rank, TaxonomyRow, TaxonomyTree};
use linaje::Error;
use proptest::prelude::*;
use std::sync::Arc;

#[test]
fn corymorpha_round_trip() {
    let tree = common::tree();
    let codec = LabelCodec::new(Arc::clone(&tree));

    let labels = codec.encode("Corymorpha_sp1").unwrap();
    for (rank, name) in Rank::ALL.iter().zip(common::LINEAGES[0]) {
        assert_eq!(labels.get(*rank), tree.index_of(*rank, name).unwrap());
    }

    let lineage = codec.decode(&labels).unwrap();
    let names: Vec<&str> = lineage.names().iter().map(String::as_str).collect();
    assert_eq!(names, common::LINEAGES[0]);
    assert_eq!(lineage.species(), "Corymorpha_sp1");
    assert!(tree.is_consistent(&labels));
}

#[test]
fn misspelled_family_is_rejected() {
    let mut typo = common::LINEAGES[1];
    typo[4] = "Corymorpidae";
    let err = TaxonomyTree::from_rows(vec![TaxonomyRow::new(common::LINEAGES[0]), TaxonomyRow::new(typo)]).unwrap_err();

    assert!(matches!(err, Error::InconsistentTaxonomy(_)));
    let msg = err.to_string();
    assert!(msg.contains("Corymorpha"), "{msg}");
    assert!(msg.contains("Corymorphidae"), "{msg}");
    assert!(msg.contains("Corymorpidae"), "{msg}");
}

#[test]
fn unknown_species_names_the_label() {
    let codec = LabelCodec::new(common::tree());
    let err = codec.encode("Corymorpha_sp9").unwrap_err();
    match err {
        Error::UnknownTaxonLabel { rank, label } => {
            assert_eq!(rank, Rank::Species);
            assert_eq!(label, "Corymorpha_sp9");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn csv_table_matches_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taxonomy.csv");
    common::write_taxonomy_csv(&path);

    let from_csv = TaxonomyTree::from_csv(&path).unwrap();
    let from_rows = common::tree();
    assert_eq!(from_csv.rank_sizes(), from_rows.rank_sizes());
    assert_eq!(from_csv.rank_sizes(), [1, 2, 2, 2, 3, 3, 4]);
    assert_eq!(from_csv.species_lineages(), from_rows.species_lineages());
}

#[test]
fn parent_lookup_at_kingdom_fails() {
    let tree = common::tree();
    assert!(matches!(tree.parent_of(Rank::Kingdom, 0), Err(Error::NoParent(Rank::Kingdom))));
}

/// Rows for `genera[i]` species, genus g under family g/2 under order g/4
fn generated_rows(genera: &[usize]) -> Vec<TaxonomyRow> {
    genera
        .iter()
        .enumerate()
        .map(|(s, &g)| {
            let names = [
                "K".to_string(),
                "P".to_string(),
                "C".to_string(),
                format!("O{}", g / 4),
                format!("F{}", g / 2),
                format!("G{g}"),
                format!("S{s}"),
            ];
            TaxonomyRow::from_options(names.map(Some))
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_lineage_round_trip(genera in proptest::collection::vec(0usize..8, 1..30)) {
        let tree = Arc::new(TaxonomyTree::from_rows(generated_rows(&genera)).unwrap());
        let codec = LabelCodec::new(Arc::clone(&tree));

        for (s, &g) in genera.iter().enumerate() {
            let species = format!("S{s}");
            let labels = codec.encode(&species).unwrap();
            prop_assert!(tree.is_consistent(&labels));

            let lineage = codec.decode(&labels).unwrap();
            prop_assert_eq!(lineage.get(Rank::Genus), format!("G{g}"));
            prop_assert_eq!(lineage.get(Rank::Family), format!("F{}", g / 2));
            prop_assert_eq!(lineage.species(), species.as_str());
            prop_assert_eq!(codec.encode(lineage.species()).unwrap(), labels);
        }
    }

    #[test]
    fn prop_parent_chain_matches_lineage(genera in proptest::collection::vec(0usize..8, 1..30)) {
        let tree = TaxonomyTree::from_rows(generated_rows(&genera)).unwrap();
        for labels in tree.species_lineages() {
            for rank in &Rank::ALL[1..] {
                let parent_rank = rank.parent().unwrap();
                prop_assert_eq!(tree.parent_of(*rank, labels.get(*rank)).unwrap(), labels.get(parent_rank));
            }
        }
    }

    #[test]
    fn prop_shifted_species_is_inconsistent(genera in proptest::collection::vec(0usize..8, 2..30)) {
        let tree = TaxonomyTree::from_rows(generated_rows(&genera)).unwrap();
        let lineages = tree.species_lineages();
        // Graft the genus of one species onto another species' lineage
        for (a, b) in lineages.iter().zip(lineages.iter().skip(1)) {
            if a.get(Rank::Genus) != b.get(Rank::Genus) {
                let mut idx = *a.as_array();
                idx[Rank::Genus.index()] = b.get(Rank::Genus);
                prop_assert!(!tree.is_consistent(&LabelVector::new(idx)));
            }
        }
    }
}
