//! scout-core: corpus labeling pipeline
//!
//! Ties feature extraction and the ground-truth codec race together:
//! - Corpus scanning and synthetic "already compressed" samples
//! - Parallel per-file labeling with skip-and-continue on unreadable files
//! - Dataset export in the `[avg_entropy, log10_size, type_hint] -> label` layout

#![warn(missing_docs)]

pub mod corpus;
pub mod dataset;
pub mod labeler;
pub mod pipeline;

pub use corpus::{Synthesis, Synthesizer};
pub use dataset::{write_dataset, DatasetFormat, DatasetRow, DatasetWriter};
pub use labeler::{BatchOutcome, LabelDistribution, LabeledSample, Labeler, SkippedFile};
pub use pipeline::{hint_table, run, RunSummary};

use std::path::PathBuf;

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error with the path it happened on
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Feature extraction error
    #[error("Feature error: {0}")]
    Features(#[from] scout_features::Error),

    /// Codec race error
    #[error("Label error: {0}")]
    Label(#[from] scout_label::Error),

    /// Codec construction or compression error
    #[error("Compression error: {0}")]
    Compress(#[from] scout_compress::Error),

    /// Worker pool could not be built
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for scout-core operations
pub type Result<T> = std::result::Result<T, Error>;
