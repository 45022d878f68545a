//! Amplitude envelope via the analytic signal.
//!
//! The analytic signal is built in the frequency domain: forward FFT, drop
//! the negative frequencies, double the positive ones, inverse FFT. Its
//! magnitude is the instantaneous amplitude of the chunk regardless of the
//! oscillation phase.

use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Envelope extractor for one fixed chunk length.
///
/// Plans are built once and shared read-only, so a single extractor can be
/// used from many threads at once.
pub struct EnvelopeExtractor {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    weights: Vec<f64>,
}

impl EnvelopeExtractor {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            len,
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
            weights: analytic_weights(len),
        }
    }

    /// Chunk length this extractor was planned for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Envelope of `chunk`, one magnitude per sample.
    ///
    /// A chunk whose length differs from the planned one gets a one-off plan.
    pub fn envelope(&self, chunk: &[f64]) -> Vec<f64> {
        if chunk.is_empty() {
            return Vec::new();
        }
        if chunk.len() != self.len {
            log::debug!(
                "envelope: chunk of {} samples on a {}-sample plan, replanning",
                chunk.len(),
                self.len
            );
            return EnvelopeExtractor::new(chunk.len()).envelope(chunk);
        }

        let mut buffer: Vec<Complex<f64>> =
            chunk.iter().map(|&x| Complex { re: x, im: 0.0 }).collect();
        self.forward.process(&mut buffer);
        for (bin, &w) in buffer.iter_mut().zip(&self.weights) {
            *bin *= w;
        }
        self.inverse.process(&mut buffer);

        // rustfft leaves the inverse unnormalized.
        let scale = self.len as f64;
        buffer.iter().map(|c| c.norm() / scale).collect()
    }
}

/// One-shot envelope of a single chunk.
pub fn analytic_envelope(chunk: &[f64]) -> Vec<f64> {
    if chunk.is_empty() {
        return Vec::new();
    }
    EnvelopeExtractor::new(chunk.len()).envelope(chunk)
}

/// Spectral weights turning a real spectrum into an analytic one.
///
/// DC (and Nyquist for even lengths) keep weight 1, strictly positive
/// frequencies get 2, negative frequencies get 0.
fn analytic_weights(n: usize) -> Vec<f64> {
    let mut w = vec![0.0; n];
    if n == 0 {
        return w;
    }
    w[0] = 1.0;
    if n % 2 == 0 {
        w[n / 2] = 1.0;
        for x in &mut w[1..n / 2] {
            *x = 2.0;
        }
    } else {
        for x in &mut w[1..n.div_ceil(2)] {
            *x = 2.0;
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn cosine(n: usize, cycles: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * cycles * i as f64 / n as f64).cos())
            .collect()
    }

    #[test]
    fn weights_even_length() {
        assert_eq!(analytic_weights(6), vec![1.0, 2.0, 2.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn weights_odd_length() {
        assert_eq!(analytic_weights(5), vec![1.0, 2.0, 2.0, 0.0, 0.0]);
        assert_eq!(analytic_weights(1), vec![1.0]);
    }

    #[test]
    fn envelope_preserves_length() {
        let chunk = cosine(257, 7.3, 1.0);
        assert_eq!(analytic_envelope(&chunk).len(), 257);
    }

    #[test]
    fn empty_chunk_gives_empty_envelope() {
        assert!(analytic_envelope(&[]).is_empty());
        assert!(EnvelopeExtractor::new(8).envelope(&[]).is_empty());
    }

    #[test]
    fn periodic_tone_has_flat_envelope() {
        let chunk = cosine(1024, 32.0, 0.7);
        let env = analytic_envelope(&chunk);
        for (i, &e) in env.iter().enumerate() {
            assert!((e - 0.7).abs() < 1e-9, "sample {i}: envelope {e}");
        }
    }

    #[test]
    fn envelope_is_phase_independent() {
        let n = 800;
        let sine: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 40.0 * i as f64 / n as f64).sin())
            .collect();
        let cos = cosine(n, 40.0, 1.0);
        let a = analytic_envelope(&sine);
        let b = analytic_envelope(&cos);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn recovers_amplitude_modulation() {
        let n = 1000;
        let chunk: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                (1.0 + 0.5 * (2.0 * PI * 5.0 * t).cos()) * (2.0 * PI * 100.0 * t).cos()
            })
            .collect();
        let env = analytic_envelope(&chunk);
        for (i, &e) in env.iter().enumerate() {
            let t = i as f64 / n as f64;
            let expected = 1.0 + 0.5 * (2.0 * PI * 5.0 * t).cos();
            assert!((e - expected).abs() < 1e-9, "sample {i}: {e} vs {expected}");
        }
    }

    #[test]
    fn envelope_is_non_negative() {
        let chunk: Vec<f64> = (0..300).map(|i| ((i * 37 % 101) as f64 - 50.0) / 50.0).collect();
        assert!(analytic_envelope(&chunk).iter().all(|&e| e >= 0.0));
    }

    #[test]
    fn reused_plan_matches_one_shot() {
        let extractor = EnvelopeExtractor::new(512);
        let chunk = cosine(512, 11.5, 0.3);
        assert_eq!(extractor.envelope(&chunk), analytic_envelope(&chunk));
    }

    #[test]
    fn mismatched_length_is_replanned() {
        let extractor = EnvelopeExtractor::new(64);
        let chunk = cosine(100, 10.0, 1.0);
        assert_eq!(extractor.envelope(&chunk).len(), 100);
    }
}
