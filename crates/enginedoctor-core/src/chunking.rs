//! Fixed-count chunking.
//!
//! The waveform is cut into `chunk_count` equal slices starting at offset 0.
//! Samples past the last full slice are never scored.

/// Length of each chunk, or 0 when the waveform is too short to cut.
pub fn chunk_size(len: usize, chunk_count: usize) -> usize {
    if chunk_count == 0 {
        return 0;
    }
    len / chunk_count
}

/// A contiguous slice of the waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk<'a> {
    pub offset: usize,
    pub samples: &'a [f64],
}

impl Chunk<'_> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Split `samples` into `chunk_count` contiguous chunks of equal length.
///
/// Returns an empty vector when `chunk_size` would be 0.
pub fn split_chunks(samples: &[f64], chunk_count: usize) -> Vec<Chunk<'_>> {
    let size = chunk_size(samples.len(), chunk_count);
    if size == 0 {
        return Vec::new();
    }
    samples
        .chunks_exact(size)
        .take(chunk_count)
        .enumerate()
        .map(|(i, samples)| Chunk {
            offset: i * size,
            samples,
        })
        .collect()
}

/// Number of trailing samples that fall outside every chunk.
pub fn discarded_tail(len: usize, chunk_count: usize) -> usize {
    len - chunk_size(len, chunk_count) * chunk_count
}
