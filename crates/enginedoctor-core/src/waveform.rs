//! Recorded waveform and the channel-folding preprocessor.
//!
//! Every diagnosis starts from a mono [`Waveform`]. Decoders hand us an
//! interleaved buffer (`L R L R ...`); [`fold_to_mono`] averages each frame
//! down to one sample.

use serde::{Deserialize, Serialize};

/// A mono recording. The sample rate rides along for presentation and
/// reporting; the scoring math never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Build a mono waveform from an interleaved multi-channel buffer.
    pub fn from_interleaved(buffer: &[f64], channels: usize, sample_rate: u32) -> Self {
        Self::new(fold_to_mono(buffer, channels), sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, 0.0 when the rate is unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Fold an interleaved buffer to mono by averaging each frame.
///
/// A channel count of 0 is treated as mono. A trailing partial frame is
/// dropped.
pub fn fold_to_mono(buffer: &[f64], channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return buffer.to_vec();
    }
    let scale = channels as f64;
    buffer
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / scale)
        .collect()
}
