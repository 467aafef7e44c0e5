//! Shannon entropy of byte buffers
//!
//! Entropy is reported in bits per byte, `0.0` for a single repeated byte up
//! to `8.0` when all 256 values are equally likely. Values near 8 indicate
//! data that is already compressed, encrypted or random.

/// Upper bound of byte entropy (8-bit alphabet)
pub const MAX_ENTROPY_BITS: f64 = 8.0;

/// Calculate Shannon entropy of `data` in bits per byte.
///
/// Empty input has entropy `0.0` by convention.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let freq = byte_histogram(data);
    let len = data.len() as f64;
    let mut entropy = 0.0;

    for &count in &freq {
        if count > 0 {
            let p = count as f64 / len;
            entropy -= p * p.log2();
        }
    }

    entropy.clamp(0.0, MAX_ENTROPY_BITS)
}

/// Entropy scaled to 0.0-1.0
pub fn normalized_entropy(data: &[u8]) -> f64 {
    shannon_entropy(data) / MAX_ENTROPY_BITS
}

/// Mean entropy of the non-empty buffers in `chunks`.
///
/// Empty buffers are excluded from the mean; if every buffer is empty (or
/// there are none) the result is `0.0`.
pub fn average_entropy<'a, I>(chunks: I) -> f64
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let (sum, count) = chunks
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .fold((0.0, 0usize), |(sum, count), chunk| {
            (sum + shannon_entropy(chunk), count + 1)
        });

    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Byte frequency histogram.
///
/// Uses a 4-way split histogram so consecutive increments do not stall on
/// the same counter; the four tables are merged at the end.
#[inline]
fn byte_histogram(data: &[u8]) -> [u64; 256] {
    let mut freq0 = [0u64; 256];
    let mut freq1 = [0u64; 256];
    let mut freq2 = [0u64; 256];
    let mut freq3 = [0u64; 256];

    let chunks = data.chunks_exact(4);
    let remainder = chunks.remainder();

    for chunk in chunks {
        freq0[chunk[0] as usize] += 1;
        freq1[chunk[1] as usize] += 1;
        freq2[chunk[2] as usize] += 1;
        freq3[chunk[3] as usize] += 1;
    }

    for &byte in remainder {
        freq0[byte as usize] += 1;
    }

    for i in 0..256 {
        freq0[i] += freq1[i] + freq2[i] + freq3[i];
    }

    freq0
}
