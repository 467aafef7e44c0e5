//! The codec capability and its per-call outcome

use std::fmt;

use crate::Result;

/// A compressor that turns a buffer into a compressed buffer.
///
/// Implementations own their compression context, so `compress` takes
/// `&mut self` and a codec is never shared between threads. Each worker
/// builds its own instances.
pub trait Codec: Send {
    /// Short stable name used in logs and reports
    fn name(&self) -> &'static str;

    /// Level or quality the codec was configured with
    fn level(&self) -> i32;

    /// Compress the whole buffer
    fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn level(&self) -> i32 {
        (**self).level()
    }

    fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }
}

/// Result of a single codec invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecOutcome {
    /// Codec produced output of `size` bytes
    Success {
        /// Compressed size in bytes
        size: u64,
    },
    /// Codec failed; `reason` is the rendered error
    Failed {
        /// Why the codec failed
        reason: String,
    },
}

impl CodecOutcome {
    /// Run `codec` over `data` and record what happened.
    pub fn capture<C: Codec + ?Sized>(codec: &mut C, data: &[u8]) -> Self {
        match codec.compress(data) {
            Ok(compressed) => Self::Success {
                size: compressed.len() as u64,
            },
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Compressed size, or `original` when the codec failed.
    #[must_use]
    pub fn size_or(&self, original: u64) -> u64 {
        match self {
            Self::Success { size } => *size,
            Self::Failed { .. } => original,
        }
    }

    /// Whether the codec failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for CodecOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { size } => write!(f, "{size} bytes"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Fixed(usize);

    impl Codec for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn level(&self) -> i32 {
            0
        }

        fn compress(&mut self, _data: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![0; self.0])
        }
    }

    struct Broken;

    impl Codec for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn level(&self) -> i32 {
            0
        }

        fn compress(&mut self, _data: &[u8]) -> Result<Vec<u8>> {
            Err(Error::Compression {
                codec: "broken",
                message: "out of memory".into(),
            })
        }
    }

    #[test]
    fn test_capture_success() {
        let outcome = CodecOutcome::capture(&mut Fixed(7), b"abc");
        assert_eq!(outcome, CodecOutcome::Success { size: 7 });
        assert_eq!(outcome.size_or(100), 7);
        assert!(!outcome.is_failed());
    }

    #[test]
    fn test_capture_failure_falls_back_to_original() {
        let outcome = CodecOutcome::capture(&mut Broken, b"abc");
        assert!(outcome.is_failed());
        assert_eq!(outcome.size_or(100), 100);
        assert!(outcome.to_string().contains("out of memory"));
    }

    #[test]
    fn test_boxed_codec_delegates() {
        let mut boxed: Box<dyn Codec> = Box::new(Fixed(3));
        assert_eq!(boxed.name(), "fixed");
        assert_eq!(CodecOutcome::capture(&mut boxed, b"x").size_or(0), 3);
    }
}
