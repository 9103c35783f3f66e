//! Samples and encoded datasets

use crate::error::Stage;
use crate::taxonomy::{LabelCodec, LabelVector};
use crate::{Error, Result};
use std::collections::HashSet;

/// Item of the sample source: a ready image tensor plus its species label
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub id: String,
    pub species: String,
    pub image: Vec<f32>,
}

impl RawSample {
    pub fn new(id: impl Into<String>, species: impl Into<String>, image: Vec<f32>) -> Self {
        Self { id: id.into(), species: species.into(), image }
    }
}

/// An image paired with its encoded lineage; immutable after creation
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    id: String,
    image: Vec<f32>,
    labels: LabelVector,
}

impl Sample {
    pub fn new(id: impl Into<String>, image: Vec<f32>, labels: LabelVector) -> Self {
        Self { id: id.into(), image, labels }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn image(&self) -> &[f32] {
        &self.image
    }

    pub fn labels(&self) -> &LabelVector {
        &self.labels
    }
}

/// Encoded samples sharing one input width
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<Sample>,
    input_dim: usize,
}

impl Dataset {
    /// Encode raw samples against the taxonomy
    ///
    /// Fails at the construction stage, naming the sample, on an unknown
    /// species, a duplicate id or an image width that differs from the first.
    pub fn encode<I>(raw: I, codec: &LabelCodec) -> Result<Self>
    where
        I: IntoIterator<Item = RawSample>,
    {
        let mut samples = Vec::new();
        let mut seen = HashSet::new();
        let mut input_dim = None;

        for item in raw {
            let labels = codec
                .encode(&item.species)
                .map_err(|e| e.at_sample(Stage::Construction, &item.id))?;

            let expected = *input_dim.get_or_insert(item.image.len());
            if item.image.len() != expected {
                return Err(Error::ShapeMismatch {
                    context: "sample image width".into(),
                    expected,
                    actual: item.image.len(),
                }
                .at_sample(Stage::Construction, &item.id));
            }

            if !seen.insert(item.id.clone()) {
                let id = item.id.clone();
                return Err(Error::DuplicateSampleId(id.clone()).at_sample(Stage::Construction, id));
            }

            samples.push(Sample::new(item.id, item.image, labels));
        }

        Ok(Self { samples, input_dim: input_dim.unwrap_or(0) })
    }

    /// Wrap already-encoded samples
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        let input_dim = samples.first().map_or(0, |s| s.image().len());
        if let Some(bad) = samples.iter().find(|s| s.image().len() != input_dim) {
            return Err(Error::ShapeMismatch {
                context: "sample image width".into(),
                expected: input_dim,
                actual: bad.image().len(),
            }
            .at_sample(Stage::Construction, bad.id()));
        }
        Ok(Self { samples, input_dim })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Width of every image vector
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }
}
