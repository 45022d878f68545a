//! Reduce per-chunk chaos scores to the turbulence pair.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Spread and mean of the per-chunk chaos scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceScores {
    /// Population standard deviation of the chunk scores.
    pub variance: f64,
    /// Mean chunk score.
    pub intensity: f64,
}

impl TurbulenceScores {
    /// "Not enough signal" pair returned for degenerate input.
    pub const SENTINEL: TurbulenceScores = TurbulenceScores {
        variance: 0.0,
        intensity: 0.0,
    };
}

/// Aggregate qualifying chunk scores.
///
/// The reduction runs over a sorted copy, so the result is bit-identical
/// for every ordering of `scores`. No scores gives [`TurbulenceScores::SENTINEL`].
pub fn aggregate_scores(scores: &[f64]) -> TurbulenceScores {
    if scores.is_empty() {
        return TurbulenceScores::SENTINEL;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    TurbulenceScores {
        variance: sorted.iter().population_std_dev(),
        intensity: sorted.iter().mean(),
    }
}
