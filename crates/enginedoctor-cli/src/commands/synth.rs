use std::path::Path;

use enginedoctor_core::params::DEFAULT_CHUNK_COUNT;
use enginedoctor_core::sources::wav::save_waveform;
use enginedoctor_core::{DiagnosticParams, Waveform, compute_turbulence, synth};

/// Noise floor mixed into every synthetic recording.
const NOISE_FLOOR: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthKind {
    /// Steady tone.
    Steady,
    /// One chunk drops to the noise floor.
    Rough,
    /// A dropout straddling two chunks.
    Misfire,
}

impl SynthKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "rough" => Self::Rough,
            "misfire" => Self::Misfire,
            _ => Self::Steady,
        }
    }
}

pub struct SynthCommandConfig<'a> {
    pub path: &'a str,
    pub kind: &'a str,
    pub seconds: f64,
    pub sample_rate: u32,
    pub freq_hz: f64,
    pub seed: u64,
}

pub fn run(cfg: SynthCommandConfig<'_>) {
    if !cfg.seconds.is_finite() || cfg.seconds <= 0.0 {
        eprintln!("--seconds must be positive, got {}", cfg.seconds);
        std::process::exit(1);
    }
    let kind = SynthKind::parse(cfg.kind);
    let n_samples = (cfg.seconds * f64::from(cfg.sample_rate)).round() as usize;
    let waveform = generate(kind, n_samples, cfg.sample_rate, cfg.freq_hz, cfg.seed);

    if let Err(e) = save_waveform(Path::new(cfg.path), &waveform) {
        eprintln!("Failed to write {}: {e}", cfg.path);
        std::process::exit(1);
    }

    let expected = compute_turbulence(&waveform, &DiagnosticParams::default());
    println!(
        "Wrote {} ({:?}, {:.2} s @ {} Hz), expected {} (turbulence {:.3})",
        cfg.path,
        kind,
        waveform.duration_secs(),
        cfg.sample_rate,
        expected.label,
        expected.turbulence_variance
    );
}

pub fn generate(
    kind: SynthKind,
    n_samples: usize,
    sample_rate: u32,
    freq_hz: f64,
    seed: u64,
) -> Waveform {
    let tone = synth::sine(n_samples, sample_rate, freq_hz, 0.8);
    let base = synth::with_noise_floor(&tone, NOISE_FLOOR, seed);
    match kind {
        SynthKind::Steady => base,
        SynthKind::Rough => {
            let quiet =
                synth::attenuate_chunk(&base, DEFAULT_CHUNK_COUNT, DEFAULT_CHUNK_COUNT / 3, 0.0);
            synth::with_noise_floor(&quiet, NOISE_FLOOR, seed.wrapping_add(1))
        }
        SynthKind::Misfire => {
            let size = n_samples / DEFAULT_CHUNK_COUNT;
            let start = (DEFAULT_CHUNK_COUNT / 2) * size - size / 2;
            synth::attenuate(&base, start..start + size, 1e-3)
        }
    }
}
