//! JSON artifact loading

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read and deserialize a JSON file
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;

    serde_json::from_str(&content).map_err(|e| {
        Error::Serialization(format!("JSON deserialization of {} failed: {e}", path.display()))
    })
}
