//! # enginedoctor-core
//!
//! **Hold a microphone to a running engine; get a turbulence score.**
//!
//! `enginedoctor-core` scores a few seconds of engine sound for rhythmic
//! regularity. A healthy engine has near-constant local energy from one
//! slice of the recording to the next ("laminar flow"); a loose part or a
//! misfire makes some slices spiky and others calm.
//!
//! ## Quick Start
//!
//! ```
//! use enginedoctor_core::{DiagnosticParams, HealthLabel, compute_turbulence, synth};
//!
//! // One second of a steady 440 Hz tone.
//! let waveform = synth::sine(44100, 44100, 440.0, 0.8);
//! let result = compute_turbulence(&waveform, &DiagnosticParams::default());
//!
//! assert_eq!(result.label, HealthLabel::Healthy);
//! println!("turbulence {:.3}", result.turbulence_variance);
//! ```
//!
//! ## Architecture
//!
//! Preprocess → Chunk → Envelope → Chaos score → Aggregate → Classify
//!
//! - **Preprocess** ([`waveform`]): fold interleaved channels to mono.
//! - **Chunk** ([`chunking`]): cut into `chunk_count` equal slices; the tail
//!   that does not fill a slice is dropped.
//! - **Envelope** ([`envelope`]): magnitude of each slice's analytic signal.
//! - **Chaos score** ([`chaos`]): std-dev of the log envelope per slice.
//! - **Aggregate** ([`aggregate`]): std-dev and mean of the slice scores.
//! - **Classify** ([`classify`]): HEALTHY / WARNING / CRITICAL from the
//!   std-dev alone.
//!
//! Every stage is a pure function and every constant travels in
//! [`DiagnosticParams`]. Too-short recordings yield the `(0, 0, HEALTHY)`
//! sentinel rather than an error.
//!
//! Audio comes in through the [`AudioSource`] trait: native WAV decoding,
//! ffmpeg-decoded files, or ffmpeg microphone capture.

pub mod aggregate;
pub mod chaos;
pub mod chunking;
pub mod classify;
pub mod envelope;
pub mod params;
pub mod pipeline;
pub mod presentation;
pub mod source;
pub mod sources;
pub mod synth;
pub mod waveform;

pub use aggregate::{TurbulenceScores, aggregate_scores};
pub use chaos::chunk_chaos_score;
pub use chunking::{Chunk, chunk_size, split_chunks};
pub use classify::{HealthLabel, Thresholds, classify};
pub use envelope::{EnvelopeExtractor, analytic_envelope};
pub use params::DiagnosticParams;
pub use pipeline::{
    ChunkScore, DiagnosticResult, TurbulenceBreakdown, compute_breakdown, compute_turbulence,
    diagnose,
};
pub use presentation::{DiagnosticReport, WaveformPreview, decimate};
pub use source::{AudioSource, RawAudio, SourceInfo, SourceKind};
pub use sources::{open_recording, source_catalog};
pub use waveform::{Waveform, fold_to_mono};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
