//! scout-label: ground-truth labels from a codec race
//!
//! The label for a file is decided by actually compressing all of it with
//! both candidate codecs ([`AlgorithmRacer`]) and running the sizes through
//! a fixed cost/benefit rule ([`LabelPolicy`]). This is the expensive half of
//! dataset generation; it is never run at inference time.
//!
//! Labels are encoded as `0 = AlgoA` (Brotli), `1 = AlgoB` (Zstd),
//! `2 = None` (store uncompressed).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod policy;
pub mod racer;

pub use policy::{decide, Label, LabelPolicy};
pub use racer::{AlgorithmRacer, GroundTruthRacer, RaceReport, RaceResult};

use std::path::PathBuf;

/// Labeling error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the file to race failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Codec could not be constructed
    #[error("Codec error: {0}")]
    Codec(#[from] scout_compress::Error),

    /// Label name or code not recognised
    #[error("Unknown label: {0}")]
    UnknownLabel(String),
}

/// Result type for labeling operations
pub type Result<T> = std::result::Result<T, Error>;
