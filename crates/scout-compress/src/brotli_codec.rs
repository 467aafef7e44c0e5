//! Brotli codec (algorithm A, text-optimized)

use brotli::enc::BrotliEncoderParams;

use crate::{Codec, Error, Result};

const MAX_QUALITY: u32 = 11;
const MIN_LGWIN: u32 = 10;
const MAX_LGWIN: u32 = 24;
const DEFAULT_LGWIN: u32 = 22;

/// Brotli compressor with a fixed quality and window.
#[derive(Debug, Clone)]
pub struct BrotliCodec {
    quality: u32,
    lgwin: u32,
}

impl BrotliCodec {
    /// Create a Brotli codec at `quality` (0-11) with the default 4 MiB window.
    pub fn new(quality: u32) -> Result<Self> {
        Self::with_window(quality, DEFAULT_LGWIN)
    }

    /// Create a Brotli codec with an explicit window (log2 bytes, 10-24).
    pub fn with_window(quality: u32, lgwin: u32) -> Result<Self> {
        if quality > MAX_QUALITY {
            return Err(Error::InvalidLevel {
                codec: "brotli",
                level: quality as i32,
                min: 0,
                max: MAX_QUALITY as i32,
            });
        }
        if !(MIN_LGWIN..=MAX_LGWIN).contains(&lgwin) {
            return Err(Error::InvalidLevel {
                codec: "brotli-window",
                level: lgwin as i32,
                min: MIN_LGWIN as i32,
                max: MAX_LGWIN as i32,
            });
        }
        Ok(Self { quality, lgwin })
    }

    /// Configured window (log2 bytes)
    #[must_use]
    pub fn lgwin(&self) -> u32 {
        self.lgwin
    }

    fn params(&self) -> BrotliEncoderParams {
        let mut params = BrotliEncoderParams::default();
        params.quality = self.quality as i32;
        params.lgwin = self.lgwin as i32;
        params
    }
}

impl Codec for BrotliCodec {
    fn name(&self) -> &'static str {
        "brotli"
    }

    fn level(&self) -> i32 {
        self.quality as i32
    }

    fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = data;
        let mut output = Vec::with_capacity(data.len() / 2 + 64);
        brotli::BrotliCompress(&mut input, &mut output, &self.params()).map_err(|e| {
            Error::Compression {
                codec: "brotli",
                message: e.to_string(),
            }
        })?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompress(data: &[u8]) -> Vec<u8> {
        let mut input = data;
        let mut output = Vec::new();
        brotli::BrotliDecompress(&mut input, &mut output).unwrap();
        output
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        assert!(matches!(
            BrotliCodec::new(12),
            Err(Error::InvalidLevel { level: 12, .. })
        ));
        assert!(BrotliCodec::with_window(5, 9).is_err());
        assert!(BrotliCodec::with_window(5, 25).is_err());
    }

    #[test]
    fn test_text_shrinks_and_decodes() {
        let text = "the quick brown fox jumps over the lazy dog. ".repeat(200);
        let mut codec = BrotliCodec::new(11).unwrap();
        let compressed = codec.compress(text.as_bytes()).unwrap();

        assert!(compressed.len() < text.len() / 10);
        assert_eq!(decompress(&compressed), text.as_bytes());
    }

    #[test]
    fn test_empty_input() {
        let mut codec = BrotliCodec::new(4).unwrap();
        let compressed = codec.compress(&[]).unwrap();
        assert!(decompress(&compressed).is_empty());
    }

    #[test]
    fn test_name_and_level() {
        let codec = BrotliCodec::new(4).unwrap();
        assert_eq!(codec.name(), "brotli");
        assert_eq!(codec.level(), 4);
        assert_eq!(codec.lgwin(), 22);
    }
}
