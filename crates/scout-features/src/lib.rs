//! scout-features: cheap per-file features for codec selection
//!
//! Everything in this crate reads a bounded amount of a file, so the same
//! code can run offline while building a training set and on a client that
//! only has partial access to the file:
//!
//! - [`ChunkSampler`]: head, middle and tail windows of at most
//!   [`WINDOW_SIZE`] bytes each
//! - [`HintTable`]: filename to [`TypeHint`] lookup, driven by data tables
//! - [`FeatureBuilder`]: combines the two with the file size into a
//!   [`FeatureVector`]
//!
//! # Feature layout
//!
//! A feature vector is always exported as `[avg_entropy, log10_size, type_hint]`
//! with `type_hint` encoded as `0 = Generic`, `1 = Text`, `2 = Media`.
//! Training and inference must agree on this order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod features;
pub mod hint;
pub mod sampler;

pub use features::{log10_size, FeatureBuilder, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use hint::{HintTable, TypeHint};
pub use sampler::{ByteChunk, ChunkOrigin, ChunkSampler, WINDOW_SIZE};

use std::path::PathBuf;

/// Feature extraction error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Path exists but is not a regular file
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Type hint name not recognised
    #[error("Unknown type hint: {0}")]
    UnknownHint(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for feature extraction
pub type Result<T> = std::result::Result<T, Error>;
