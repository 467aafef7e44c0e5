//! Bounded head/middle/tail sampling

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sampling window size (16 KiB)
pub const WINDOW_SIZE: usize = 16 * 1024;

/// Where in the file a chunk was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkOrigin {
    /// Start of the file
    Head,
    /// Starting at the midpoint
    Mid,
    /// Last window of the file
    Tail,
}

impl ChunkOrigin {
    /// All origins in sampling order
    pub const ALL: [Self; 3] = [Self::Head, Self::Mid, Self::Tail];

    /// Byte offset of this window in a file of `size` bytes.
    ///
    /// The middle window always starts at `size / 2`, so in a file shorter
    /// than two windows it only covers the back half.
    #[must_use]
    pub fn offset(self, size: u64, window: u64) -> u64 {
        match self {
            Self::Head => 0,
            Self::Mid => size / 2,
            Self::Tail => size.saturating_sub(window),
        }
    }
}

/// A sampled window of at most one window size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteChunk {
    origin: ChunkOrigin,
    bytes: Vec<u8>,
}

impl ByteChunk {
    /// Window this chunk came from
    #[must_use]
    pub fn origin(&self) -> ChunkOrigin {
        self.origin
    }

    /// Sampled bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of sampled bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing was read for this window
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Reads up to three windows of a file without reading the rest of it.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSampler {
    window: usize,
}

impl ChunkSampler {
    /// Sampler with the standard 16 KiB window
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: WINDOW_SIZE,
        }
    }

    /// Sampler with a custom window; a zero window is raised to one byte
    #[must_use]
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// Window size in bytes
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Sample `reader`, which holds `size` bytes.
    ///
    /// Returns no chunks for an empty file. At most `3 * window` bytes are
    /// read. Windows overlap in files shorter than three windows; head and
    /// tail then cover the whole file while the middle window holds
    /// `[size / 2, size)`. A reader shorter than `size` yields shorter chunks.
    pub fn sample<R: Read + Seek>(&self, reader: &mut R, size: u64) -> std::io::Result<Vec<ByteChunk>> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let window = self.window as u64;
        ChunkOrigin::ALL
            .iter()
            .map(|&origin| {
                let offset = origin.offset(size, window);
                let len = window.min(size - offset);
                read_window(reader, offset, len).map(|bytes| ByteChunk { origin, bytes })
            })
            .collect()
    }

    /// Open `path` and sample it. Returns the file size and the chunks.
    pub fn sample_path(&self, path: &Path) -> Result<(u64, Vec<ByteChunk>)> {
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        let size = file.metadata().map_err(|e| Error::io(path, e))?.len();
        let chunks = self.sample(&mut file, size).map_err(|e| Error::io(path, e))?;
        Ok((size, chunks))
    }
}

impl Default for ChunkSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn read_window<R: Read + Seek>(reader: &mut R, offset: u64, len: u64) -> std::io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(len as usize);
    reader.by_ref().take(len).read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    /// Counts bytes handed out by the wrapped reader
    struct CountingReader<R> {
        inner: R,
        read: u64,
    }

    impl<R: Read> Read for CountingReader<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.read += n as u64;
            Ok(n)
        }
    }

    impl<R: Seek> Seek for CountingReader<R> {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn numbered(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_empty_file_has_no_chunks() {
        let chunks = ChunkSampler::new().sample(&mut Cursor::new(Vec::new()), 0).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_small_file_mid_is_back_half() {
        let data = b"tiny file contents".to_vec();
        let chunks = ChunkSampler::new()
            .sample(&mut Cursor::new(data.clone()), data.len() as u64)
            .unwrap();

        assert_eq!(chunks.len(), 3);
        for (chunk, origin) in chunks.iter().zip(ChunkOrigin::ALL) {
            assert_eq!(chunk.origin(), origin);
        }
        assert_eq!(chunks[0].bytes(), data.as_slice());
        assert_eq!(chunks[1].bytes(), &data[data.len() / 2..]);
        assert_eq!(chunks[2].bytes(), data.as_slice());
    }

    #[test]
    fn test_small_file_half_zero_half_counting() {
        // 50 zero bytes followed by 1..=50
        let mut data = vec![0u8; 50];
        data.extend(1..=50u8);
        let chunks = ChunkSampler::new()
            .sample(&mut Cursor::new(data.clone()), 100)
            .unwrap();

        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[1].len(), 50);
        assert_eq!(chunks[1].bytes(), &data[50..]);
        assert_eq!(chunks[2].len(), 100);
    }

    #[test]
    fn test_exactly_one_window() {
        let data = numbered(WINDOW_SIZE);
        let chunks = ChunkSampler::new()
            .sample(&mut Cursor::new(data.clone()), data.len() as u64)
            .unwrap();
        assert_eq!(chunks[0].bytes(), data.as_slice());
        assert_eq!(chunks[1].bytes(), &data[WINDOW_SIZE / 2..]);
        assert_eq!(chunks[2].bytes(), data.as_slice());
    }

    #[test]
    fn test_one_byte_file() {
        let chunks = ChunkSampler::new().sample(&mut Cursor::new(vec![7u8]), 1).unwrap();
        assert!(chunks.iter().all(|c| c.bytes() == [7u8]));
    }

    #[test]
    fn test_large_file_windows() {
        let size = 100_000;
        let data = numbered(size);
        let chunks = ChunkSampler::new()
            .sample(&mut Cursor::new(data.clone()), size as u64)
            .unwrap();

        assert_eq!(chunks[0].bytes(), &data[..WINDOW_SIZE]);
        assert_eq!(chunks[1].bytes(), &data[size / 2..size / 2 + WINDOW_SIZE]);
        assert_eq!(chunks[2].bytes(), &data[size - WINDOW_SIZE..]);
    }

    #[test]
    fn test_mid_window_clipped_at_end() {
        // Between one and two windows the middle window runs off the end
        let size = WINDOW_SIZE + 100;
        let data = numbered(size);
        let chunks = ChunkSampler::new()
            .sample(&mut Cursor::new(data.clone()), size as u64)
            .unwrap();

        assert_eq!(chunks[1].bytes(), &data[size / 2..]);
        assert_eq!(chunks[1].len(), size - size / 2);
        assert_eq!(chunks[2].bytes(), &data[100..]);
    }

    #[test]
    fn test_reads_are_bounded() {
        let size = 10 * 1024 * 1024;
        let mut reader = CountingReader {
            inner: Cursor::new(vec![0u8; size]),
            read: 0,
        };
        let chunks = ChunkSampler::new().sample(&mut reader, size as u64).unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(reader.read <= 3 * WINDOW_SIZE as u64);
    }

    #[test]
    fn test_small_file_reads() {
        let mut reader = CountingReader {
            inner: Cursor::new(vec![1u8; 500]),
            read: 0,
        };
        ChunkSampler::new().sample(&mut reader, 500).unwrap();
        assert_eq!(reader.read, 500 + 250 + 500);
    }

    #[test]
    fn test_truncated_reader_gives_short_chunks() {
        // Size claims more than the reader holds
        let data = numbered(WINDOW_SIZE * 2);
        let chunks = ChunkSampler::new()
            .sample(&mut Cursor::new(data), (WINDOW_SIZE * 4) as u64)
            .unwrap();

        assert_eq!(chunks[0].len(), WINDOW_SIZE);
        assert_eq!(chunks[1].len(), 0);
        assert_eq!(chunks[2].len(), 0);
    }

    #[test]
    fn test_custom_window() {
        let sampler = ChunkSampler::with_window(4);
        let chunks = sampler.sample(&mut Cursor::new(b"0123456789".to_vec()), 10).unwrap();
        assert_eq!(chunks[0].bytes(), b"0123");
        assert_eq!(chunks[1].bytes(), b"5678");
        assert_eq!(chunks[2].bytes(), b"6789");
        assert_eq!(ChunkSampler::with_window(0).window(), 1);
    }

    #[test]
    fn test_sample_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let (size, chunks) = ChunkSampler::new().sample_path(file.path()).unwrap();
        assert_eq!(size, 11);
        assert_eq!(chunks[0].bytes(), b"hello world");
        assert_eq!(chunks[1].bytes(), b" world");
    }

    #[test]
    fn test_sample_missing_path_names_file() {
        let err = ChunkSampler::new()
            .sample_path(Path::new("/nonexistent/packscout/sample.bin"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/packscout/sample.bin"));
    }
}
