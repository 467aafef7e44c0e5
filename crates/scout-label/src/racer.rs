//! Full-file codec race

use std::path::Path;
use std::time::Instant;

use scout_compress::{
    BrotliCodec, Codec, CodecOutcome, ZstdCodec, GROUND_TRUTH_BROTLI_LGWIN,
    GROUND_TRUTH_BROTLI_QUALITY, GROUND_TRUTH_ZSTD_LEVEL,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::policy::{Label, LabelPolicy};
use crate::{Error, Result};

/// Sizes after compressing a whole file with each codec.
///
/// A codec that failed is recorded with the original size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceResult {
    /// Input size in bytes
    pub original_size: u64,
    /// Output size of algorithm A
    pub size_a: u64,
    /// Output size of algorithm B
    pub size_b: u64,
}

impl RaceResult {
    /// Result for an empty input
    pub const ZERO: Self = Self {
        original_size: 0,
        size_a: 0,
        size_b: 0,
    };

    /// Ground-truth label for this result
    #[must_use]
    pub fn label(&self) -> Label {
        LabelPolicy::decide(self)
    }
}

/// A [`RaceResult`] plus what each codec actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceReport {
    /// Sizes used for labeling
    pub result: RaceResult,
    /// Outcome of algorithm A
    pub outcome_a: CodecOutcome,
    /// Outcome of algorithm B
    pub outcome_b: CodecOutcome,
}

impl RaceReport {
    /// Number of codecs that failed (0-2)
    #[must_use]
    pub fn failures(&self) -> usize {
        usize::from(self.outcome_a.is_failed()) + usize::from(self.outcome_b.is_failed())
    }

    /// Ground-truth label for this race
    #[must_use]
    pub fn label(&self) -> Label {
        self.result.label()
    }
}

/// Ground-truth racer: Brotli (A) against Zstd (B)
pub type GroundTruthRacer = AlgorithmRacer<BrotliCodec, ZstdCodec>;

/// Compresses whole buffers with two codecs and records the sizes.
///
/// The racer owns its codecs; build one per worker thread.
#[derive(Debug)]
pub struct AlgorithmRacer<A, B> {
    codec_a: A,
    codec_b: B,
}

impl GroundTruthRacer {
    /// Brotli quality 11 / window 22 against Zstd level 3
    pub fn ground_truth() -> Result<Self> {
        Ok(Self::new(
            BrotliCodec::with_window(GROUND_TRUTH_BROTLI_QUALITY, GROUND_TRUTH_BROTLI_LGWIN)?,
            ZstdCodec::new(GROUND_TRUTH_ZSTD_LEVEL)?,
        ))
    }
}

impl<A: Codec, B: Codec> AlgorithmRacer<A, B> {
    /// Race `codec_a` against `codec_b`
    pub fn new(codec_a: A, codec_b: B) -> Self {
        Self { codec_a, codec_b }
    }

    /// Names of the two codecs
    pub fn codec_names(&self) -> (&'static str, &'static str) {
        (self.codec_a.name(), self.codec_b.name())
    }

    /// Compress all of `data` with both codecs.
    ///
    /// Empty input returns [`RaceResult::ZERO`] without running either codec.
    /// A codec failure only affects that codec's size.
    pub fn race(&mut self, data: &[u8]) -> RaceReport {
        if data.is_empty() {
            return RaceReport {
                result: RaceResult::ZERO,
                outcome_a: CodecOutcome::Success { size: 0 },
                outcome_b: CodecOutcome::Success { size: 0 },
            };
        }

        let original_size = data.len() as u64;
        let outcome_a = run_codec(&mut self.codec_a, data);
        let outcome_b = run_codec(&mut self.codec_b, data);

        RaceReport {
            result: RaceResult {
                original_size,
                size_a: outcome_a.size_or(original_size),
                size_b: outcome_b.size_or(original_size),
            },
            outcome_a,
            outcome_b,
        }
    }

    /// Read all of `path` and race it.
    pub fn race_path(&mut self, path: &Path) -> Result<RaceReport> {
        let data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.race(&data))
    }
}

fn run_codec<C: Codec>(codec: &mut C, data: &[u8]) -> CodecOutcome {
    let start = Instant::now();
    let outcome = CodecOutcome::capture(codec, data);

    match &outcome {
        CodecOutcome::Success { size } => debug!(
            codec = codec.name(),
            level = codec.level(),
            input = data.len(),
            output = size,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Codec finished"
        ),
        CodecOutcome::Failed { reason } => warn!(
            codec = codec.name(),
            level = codec.level(),
            input = data.len(),
            reason = %reason,
            "Codec failed, counting as no compression benefit"
        ),
    }

    outcome
}
