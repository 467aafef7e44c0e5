//! Feature vectors and the sampled feature builder

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use scout_compress::{average_entropy, MAX_ENTROPY_BITS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hint::{HintTable, TypeHint};
use crate::sampler::{ByteChunk, ChunkSampler};
use crate::{Error, Result};

/// Number of features in a vector
pub const FEATURE_COUNT: usize = 3;

/// Feature names in export order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["avg_entropy", "log10_size", "type_hint"];

/// `log10(size + 1)`, so an empty file maps to 0
#[must_use]
pub fn log10_size(size: u64) -> f64 {
    (size as f64 + 1.0).log10()
}

/// Per-file features in the order `[avg_entropy, log10_size, type_hint]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FeatureFields")]
pub struct FeatureVector {
    avg_entropy: f64,
    log10_size: f64,
    type_hint: TypeHint,
}

/// Serialized form, checked before it becomes a [`FeatureVector`]
#[derive(Deserialize)]
struct FeatureFields {
    avg_entropy: f64,
    log10_size: f64,
    type_hint: TypeHint,
}

impl TryFrom<FeatureFields> for FeatureVector {
    type Error = String;

    fn try_from(fields: FeatureFields) -> std::result::Result<Self, Self::Error> {
        if !(0.0..=MAX_ENTROPY_BITS).contains(&fields.avg_entropy) {
            return Err(format!(
                "avg_entropy {} outside [0, {MAX_ENTROPY_BITS}]",
                fields.avg_entropy
            ));
        }
        if !(fields.log10_size.is_finite() && fields.log10_size >= 0.0) {
            return Err(format!("log10_size {} is not a valid size", fields.log10_size));
        }
        Ok(Self {
            avg_entropy: fields.avg_entropy,
            log10_size: fields.log10_size,
            type_hint: fields.type_hint,
        })
    }
}

impl FeatureVector {
    /// Assemble a vector from its parts. Entropy is clamped to `[0, 8]`.
    #[must_use]
    pub fn new(avg_entropy: f64, file_size: u64, type_hint: TypeHint) -> Self {
        Self {
            avg_entropy: avg_entropy.clamp(0.0, MAX_ENTROPY_BITS),
            log10_size: log10_size(file_size),
            type_hint,
        }
    }

    /// Mean entropy of the sampled windows, bits per byte
    #[must_use]
    pub fn avg_entropy(&self) -> f64 {
        self.avg_entropy
    }

    /// `log10(file_size + 1)`
    #[must_use]
    pub fn log10_size(&self) -> f64 {
        self.log10_size
    }

    /// Filename hint
    #[must_use]
    pub fn type_hint(&self) -> TypeHint {
        self.type_hint
    }

    /// Export layout consumed by the trainer and by inference clients
    #[must_use]
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.avg_entropy as f32,
            self.log10_size as f32,
            f32::from(self.type_hint.code()),
        ]
    }
}

/// Builds a [`FeatureVector`] from a bounded sample of a file.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    sampler: ChunkSampler,
    hints: HintTable,
}

impl FeatureBuilder {
    /// Builder with the standard sampler and the given hint table
    #[must_use]
    pub fn new(hints: HintTable) -> Self {
        Self {
            sampler: ChunkSampler::new(),
            hints,
        }
    }

    /// Builder with the standard sampler and hint table
    #[must_use]
    pub fn standard() -> Self {
        Self::new(HintTable::standard())
    }

    /// Replace the sampler
    #[must_use]
    pub fn with_sampler(mut self, sampler: ChunkSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Hint table in use
    #[must_use]
    pub fn hints(&self) -> &HintTable {
        &self.hints
    }

    /// Extract features from the file at `path`.
    pub fn build_from_path(&self, path: &Path) -> Result<FeatureVector> {
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        let metadata = file.metadata().map_err(|e| Error::io(path, e))?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let chunks = self
            .sampler
            .sample(&mut file, metadata.len())
            .map_err(|e| Error::io(path, e))?;

        Ok(self.combine(&name, metadata.len(), &chunks))
    }

    /// Extract features from `reader`, holding a file called `name` of
    /// `size` bytes. Only the sampled windows are read.
    pub fn build_from_reader<R: Read + Seek>(
        &self,
        name: &str,
        size: u64,
        reader: &mut R,
    ) -> Result<FeatureVector> {
        let chunks = self
            .sampler
            .sample(reader, size)
            .map_err(|e| Error::io(name, e))?;
        Ok(self.combine(name, size, &chunks))
    }

    fn combine(&self, name: &str, size: u64, chunks: &[ByteChunk]) -> FeatureVector {
        let avg_entropy = average_entropy(chunks.iter().map(ByteChunk::bytes));
        let hint = self.hints.classify(name);
        debug!(name, size, avg_entropy, hint = %hint, "Extracted features");
        FeatureVector::new(avg_entropy, size, hint)
    }
}
