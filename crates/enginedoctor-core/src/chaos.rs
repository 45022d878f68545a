//! Per-chunk log-divergence ("chaos") score.
//!
//! A chunk with steady local energy has a flat log envelope and scores near
//! zero; a chunk that skips beats or flutters spreads out in log space.

use statrs::statistics::Statistics;

/// Default minimum chunk length, in samples, for a chunk to be scored.
pub const DEFAULT_MIN_CHUNK_LEN: usize = 50;

/// Default floor added to the envelope before taking the logarithm.
pub const DEFAULT_LOG_FLOOR: f64 = 1e-9;

/// Population standard deviation of `ln(envelope + floor)`.
///
/// Returns `None` when the envelope is shorter than `min_len` (or empty):
/// such chunks are left out of the aggregate entirely.
pub fn chunk_chaos_score(envelope: &[f64], min_len: usize, floor: f64) -> Option<f64> {
    if envelope.is_empty() || envelope.len() < min_len {
        return None;
    }
    Some(
        envelope
            .iter()
            .map(|&e| (e + floor).ln())
            .population_std_dev(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_chunk_is_skipped() {
        let env = vec![1.0; 49];
        assert_eq!(chunk_chaos_score(&env, 50, 1e-9), None);
    }

    #[test]
    fn exactly_min_len_is_scored() {
        let env = vec![1.0; 50];
        assert!(chunk_chaos_score(&env, 50, 1e-9).is_some());
    }

    #[test]
    fn empty_is_skipped_even_without_minimum() {
        assert_eq!(chunk_chaos_score(&[], 0, 1e-9), None);
    }

    #[test]
    fn flat_envelope_scores_zero() {
        let env = vec![0.42; 200];
        let score = chunk_chaos_score(&env, 50, 1e-9).unwrap();
        assert!(score.abs() < 1e-12, "score {score}");
    }

    #[test]
    fn silence_is_finite() {
        let env = vec![0.0; 100];
        let score = chunk_chaos_score(&env, 50, 1e-9).unwrap();
        assert!(score.is_finite());
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn two_level_envelope_matches_closed_form() {
        // Half at amplitude 1, half at amplitude e^-2: log values 0 and -2,
        // population std-dev is exactly 1.
        let mut env = vec![1.0; 100];
        env.extend(vec![(-2.0f64).exp(); 100]);
        let score = chunk_chaos_score(&env, 50, 0.0).unwrap();
        assert!((score - 1.0).abs() < 1e-12, "score {score}");
    }

    #[test]
    fn score_is_scale_invariant() {
        let env: Vec<f64> = (0..128).map(|i| 1.0 + 0.5 * ((i as f64) * 0.3).sin()).collect();
        let scaled: Vec<f64> = env.iter().map(|e| e * 10.0).collect();
        let a = chunk_chaos_score(&env, 50, 0.0).unwrap();
        let b = chunk_chaos_score(&scaled, 50, 0.0).unwrap();
        assert!((a - b).abs() < 1e-12);
    }
}
