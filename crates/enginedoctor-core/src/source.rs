//! Audio source trait and the decoded buffer it produces.
//!
//! Every way of getting sound into the pipeline (a WAV file, any file ffmpeg
//! can decode, a live microphone) implements [`AudioSource`]. Sources only
//! decode; folding and scoring happen downstream.

use serde::{Deserialize, Serialize};

use crate::waveform::Waveform;

/// How a source obtains its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Decoded from a file on disk.
    File,
    /// Recorded live from an input device.
    Capture,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Capture => write!(f, "capture"),
        }
    }
}

/// Metadata about an audio source.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique identifier (e.g. `"wav_file"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    pub kind: SourceKind,
    /// External programs the source shells out to.
    pub requires: &'static [&'static str],
}

/// Interleaved samples straight from a decoder, normalized to roughly
/// `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAudio {
    pub samples: Vec<f64>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl RawAudio {
    /// Number of complete frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Fold to a mono [`Waveform`].
    pub fn into_waveform(self) -> Waveform {
        Waveform::from_interleaved(&self.samples, self.channels, self.sample_rate)
    }
}

/// Trait that every audio source must implement.
pub trait AudioSource: Send + Sync {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Check if this source can operate on the current machine.
    fn is_available(&self) -> bool;

    /// Decode or record the audio.
    fn capture(&self) -> std::io::Result<RawAudio>;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
