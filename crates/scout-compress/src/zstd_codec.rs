//! Zstd codec (algorithm B, balanced)

use std::fmt;

use tracing::trace;
use zstd::bulk::Compressor;

use crate::{Codec, Error, Result};

/// Zstd compressor owning a reusable compression context.
pub struct ZstdCodec {
    level: i32,
    context: Compressor<'static>,
}

impl ZstdCodec {
    /// Create a Zstd codec at `level`.
    pub fn new(level: i32) -> Result<Self> {
        let range = zstd::compression_level_range();
        if !range.contains(&level) {
            return Err(Error::InvalidLevel {
                codec: "zstd",
                level,
                min: *range.start(),
                max: *range.end(),
            });
        }
        let context = Compressor::new(level)?;
        trace!(level, "Allocated zstd compression context");
        Ok(Self { level, context })
    }
}

impl fmt::Debug for ZstdCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdCodec").field("level", &self.level).finish()
    }
}

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.context.compress(data).map_err(|e| Error::Compression {
            codec: "zstd",
            message: e.to_string(),
        })
    }
}
