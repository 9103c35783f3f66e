//! Shared fixtures: a small hydrozoan/nudibranch taxonomy with separable features

#![allow(dead_code)]

use linaje::data::{Dataset, RawSample};
use linaje::taxonomy::{LabelCodec, TaxonomyRow, TaxonomyTree};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const LINEAGES: [[&str; 7]; 4] = [
    ["Animalia", "Cnidaria", "Hydrozoa", "Anthoathecata", "Corymorphidae", "Corymorpha", "Corymorpha_sp1"],
    ["Animalia", "Cnidaria", "Hydrozoa", "Anthoathecata", "Corymorphidae", "Corymorpha", "Corymorpha_nutans"],
    ["Animalia", "Cnidaria", "Hydrozoa", "Anthoathecata", "Tubulariidae", "Tubularia", "Tubularia_indivisa"],
    ["Animalia", "Mollusca", "Gastropoda", "Nudibranchia", "Flabellinidae", "Flabellina", "Flabellina_affinis"],
];

pub const FEATURE_DIM: usize = 4;

pub fn tree() -> Arc<TaxonomyTree> {
    Arc::new(TaxonomyTree::from_rows(LINEAGES.map(TaxonomyRow::new)).unwrap())
}

/// Species `s` lights up feature `s`; `k` adds a small deterministic jitter
pub fn features(s: usize, k: usize) -> Vec<f32> {
    (0..FEATURE_DIM)
        .map(|d| {
            let jitter = ((k * 7 + d * 3) % 5) as f32 * 0.05;
            if d == s {
                2.0 + jitter
            } else {
                jitter
            }
        })
        .collect()
}

pub fn raw_samples(prefix: &str, per_species: usize) -> Vec<RawSample> {
    (0..per_species)
        .flat_map(|k| {
            LINEAGES
                .iter()
                .enumerate()
                .map(move |(s, lineage)| RawSample::new(format!("{prefix}{}", k * LINEAGES.len() + s), lineage[6], features(s, k)))
        })
        .collect()
}

pub fn dataset(tree: &Arc<TaxonomyTree>, prefix: &str, per_species: usize) -> Arc<Dataset> {
    let codec = LabelCodec::new(Arc::clone(tree));
    Arc::new(Dataset::encode(raw_samples(prefix, per_species), &codec).unwrap())
}

pub fn write_taxonomy_csv(path: &Path) {
    let mut text = String::from("kingdom,phylum,class,order,family,genus,species\n");
    for lineage in LINEAGES {
        text.push_str(&lineage.join(","));
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

pub fn write_feature_csv(path: &Path, samples: &[RawSample]) {
    let mut text = String::from("id,label");
    for d in 0..FEATURE_DIM {
        text.push_str(&format!(",f{d}"));
    }
    text.push('\n');
    for s in samples {
        text.push_str(&format!("{},{}", s.id, s.species));
        for v in &s.image {
            text.push_str(&format!(",{v}"));
        }
        text.push('\n');
    }
    fs::write(path, text).unwrap();
}

/// Taxonomy, train/val tables and a config in `dir`; returns the config path
pub fn write_fixture(dir: &Path, extra_training: &str) -> PathBuf {
    write_taxonomy_csv(&dir.join("taxonomy.csv"));
    write_feature_csv(&dir.join("train.csv"), &raw_samples("t", 6));
    write_feature_csv(&dir.join("val.csv"), &raw_samples("v", 2));

    let config = format!(
        "taxonomy:\n  path: taxonomy.csv\n\
         data:\n  train: train.csv\n  val: val.csv\n  batch_size: 4\n\
         model:\n  encoder: linear\n  embed_dim: 8\n\
         optimizer:\n  name: adamw\n  lr: 0.05\n  weight_decay: 0.0\n\
         training:\n  epochs: 4\n  early_stopping_patience: 0\n  random_seed: 3\n  output_dir: out\n{extra_training}"
    );
    let path = dir.join("config.yaml");
    fs::write(&path, config).unwrap();
    path
}
