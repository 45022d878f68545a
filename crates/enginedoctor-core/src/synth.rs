//! Synthetic engine recordings.
//!
//! Deterministic generators for calibration files and tests: a steady tone,
//! a low noise floor, and dropouts where a stretch of the signal goes quiet
//! (a skipped beat, a misfire).

use std::f64::consts::PI;
use std::ops::Range;

use crate::waveform::Waveform;

/// Constant-amplitude sine tone.
pub fn sine(n_samples: usize, sample_rate: u32, freq_hz: f64, amplitude: f64) -> Waveform {
    let rate = sample_rate.max(1) as f64;
    let samples = (0..n_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / rate).sin())
        .collect();
    Waveform::new(samples, sample_rate)
}

/// Uniform white noise in `[-amplitude, amplitude)` from a seeded LCG.
pub fn noise(n_samples: usize, sample_rate: u32, amplitude: f64, seed: u64) -> Waveform {
    let mut lcg = Lcg::new(seed);
    let samples = (0..n_samples).map(|_| amplitude * lcg.next_signed()).collect();
    Waveform::new(samples, sample_rate)
}

/// Add a uniform noise floor to an existing waveform.
pub fn with_noise_floor(waveform: &Waveform, amplitude: f64, seed: u64) -> Waveform {
    let mut lcg = Lcg::new(seed);
    let samples = waveform
        .samples
        .iter()
        .map(|&s| s + amplitude * lcg.next_signed())
        .collect();
    Waveform::new(samples, waveform.sample_rate)
}

/// Multiply the samples in `range` by `gain`. The range is clipped to the
/// waveform.
pub fn attenuate(waveform: &Waveform, range: Range<usize>, gain: f64) -> Waveform {
    let end = range.end.min(waveform.len());
    let start = range.start.min(end);
    let mut samples = waveform.samples.clone();
    for s in &mut samples[start..end] {
        *s *= gain;
    }
    Waveform::new(samples, waveform.sample_rate)
}

/// Attenuate exactly one of `chunk_count` equal chunks.
pub fn attenuate_chunk(
    waveform: &Waveform,
    chunk_count: usize,
    chunk_index: usize,
    gain: f64,
) -> Waveform {
    let size = crate::chunking::chunk_size(waveform.len(), chunk_count);
    let start = chunk_index * size;
    attenuate(waveform, start..start + size, gain)
}

/// 64-bit LCG (Knuth's MMIX constants).
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Uniform in `[-1, 1)`.
    fn next_signed(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (self.state >> 11) as f64 / (1u64 << 53) as f64;
        2.0 * unit - 1.0
    }
}
