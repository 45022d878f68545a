//! Basic diagnosis example.
//!
//! Builds a steady idle and the same idle with a skipped beat, then prints
//! both diagnoses.
//!
//! Run: `cargo run --example basic`

use enginedoctor_core::{DiagnosticParams, compute_breakdown, synth};

fn main() {
    let params = DiagnosticParams::default();

    // One second of a 440 Hz tone over a faint noise floor
    let idle = synth::with_noise_floor(&synth::sine(44100, 44100, 440.0, 0.8), 1e-3, 1);

    // Same recording with chunk 7 of 20 gone quiet
    let misfire = synth::attenuate_chunk(&idle, params.chunk_count, 7, 1e-3);

    for (name, waveform) in [("steady idle", &idle), ("skipped beat", &misfire)] {
        let breakdown = compute_breakdown(waveform, &params);
        let result = breakdown.result;
        println!(
            "{name:>12}: {:<14} turbulence {:.3}, intensity {:.3} ({} chunks scored)",
            result.label.headline(),
            result.turbulence_variance,
            result.average_intensity,
            breakdown.scored_chunks()
        );
    }
}
