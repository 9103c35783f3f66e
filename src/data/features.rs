//! Feature tables: `id,label,f0,f1,...`
//!
//! Each row carries a ready image vector. The label column holds the species
//! name; an empty label marks an unlabeled sample and is rejected later by
//! [`Dataset::encode`](super::Dataset::encode).

use super::RawSample;
use crate::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a feature table from disk
pub fn read_feature_csv(path: impl AsRef<Path>) -> Result<Vec<RawSample>> {
    let path = path.as_ref();
    let samples = read_features(File::open(path)?)?;
    log::info!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Read a feature table from any reader
pub fn read_features<R: Read>(reader: R) -> Result<Vec<RawSample>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::ConfigError(format!("feature table is missing the '{name}' column")))
    };
    let id_col = column("id")?;
    let label_col = column("label")?;
    let feature_cols: Vec<usize> =
        (0..headers.len()).filter(|&c| c != id_col && c != label_col).collect();

    let mut samples = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let id = record.get(id_col).unwrap_or_default().to_string();
        if id.is_empty() {
            return Err(Error::ConfigError(format!("row {}: empty sample id", row + 1)));
        }
        let species = record.get(label_col).unwrap_or_default().to_string();

        let mut image = Vec::with_capacity(feature_cols.len());
        for &c in &feature_cols {
            let cell = record.get(c).unwrap_or_default();
            let value: f32 = cell.parse().map_err(|_| {
                Error::ConfigError(format!(
                    "sample '{id}': column '{}' is not a number: '{cell}'",
                    &headers[c]
                ))
            })?;
            image.push(value);
        }
        samples.push(RawSample { id, species, image });
    }

    Ok(samples)
}
