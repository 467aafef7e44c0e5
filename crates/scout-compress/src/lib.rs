//! scout-compress: codecs and entropy estimation for packscout
//!
//! This crate provides the two pieces of byte-level machinery the rest of the
//! workspace builds on:
//!
//! - **Codecs**: the [`Codec`] capability plus the two concrete codecs raced
//!   during ground-truth generation, [`BrotliCodec`] (algorithm A,
//!   text-optimized) and [`ZstdCodec`] (algorithm B, balanced).
//! - **Entropy**: Shannon entropy in bits per byte over sampled chunks.
//!
//! Codec failures are never fatal here. [`CodecOutcome`] records them as a
//! value so callers decide how to fold them into a size.
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_compress::{Codec, CodecOutcome, ZstdCodec, shannon_entropy};
//!
//! let mut zstd = ZstdCodec::new(3)?;
//! let outcome = CodecOutcome::capture(&mut zstd, b"aaaaaaaaaaaaaaaa");
//! let size = outcome.size_or(16);
//! let bits = shannon_entropy(b"hello world");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod brotli_codec;
mod codec;
pub mod entropy;
mod zstd_codec;

pub use brotli_codec::BrotliCodec;
pub use codec::{Codec, CodecOutcome};
pub use entropy::{average_entropy, normalized_entropy, shannon_entropy, MAX_ENTROPY_BITS};
pub use zstd_codec::ZstdCodec;

/// Brotli quality used when generating ground-truth labels.
pub const GROUND_TRUTH_BROTLI_QUALITY: u32 = 11;

/// Brotli window (log2 of the window size) used when generating ground-truth labels.
pub const GROUND_TRUTH_BROTLI_LGWIN: u32 = 22;

/// Zstd level used when generating ground-truth labels.
pub const GROUND_TRUTH_ZSTD_LEVEL: i32 = 3;

/// Compression error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Codec reported a failure while compressing
    #[error("{codec} compression failed: {message}")]
    Compression {
        /// Codec name
        codec: &'static str,
        /// Underlying error message
        message: String,
    },

    /// Level outside the range the codec accepts
    #[error("Invalid level {level} for {codec} (allowed {min}..={max})")]
    InvalidLevel {
        /// Codec name
        codec: &'static str,
        /// Requested level
        level: i32,
        /// Lowest accepted level
        min: i32,
        /// Highest accepted level
        max: i32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_truth_codecs_construct() {
        assert!(BrotliCodec::with_window(GROUND_TRUTH_BROTLI_QUALITY, GROUND_TRUTH_BROTLI_LGWIN).is_ok());
        assert!(ZstdCodec::new(GROUND_TRUTH_ZSTD_LEVEL).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidLevel {
            codec: "brotli",
            level: 12,
            min: 0,
            max: 11,
        };
        assert_eq!(err.to_string(), "Invalid level 12 for brotli (allowed 0..=11)");
    }
}
