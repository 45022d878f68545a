//! The turbulence pipeline: preprocess → chunk → envelope → score →
//! aggregate → classify.
//!
//! Each stage lives in its own module and is a pure function; this module
//! only wires them together. Chunks are independent until aggregation, so
//! envelope extraction and scoring fan out over rayon when
//! [`DiagnosticParams::parallel`] is set. Results are collected in chunk
//! order and the reduction is order-independent, so both paths produce the
//! same bits.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{TurbulenceScores, aggregate_scores};
use crate::chaos::chunk_chaos_score;
use crate::chunking::{Chunk, chunk_size, discarded_tail, split_chunks};
use crate::classify::{HealthLabel, classify};
use crate::envelope::EnvelopeExtractor;
use crate::params::DiagnosticParams;
use crate::waveform::Waveform;

/// Terminal artifact of one diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub turbulence_variance: f64,
    pub average_intensity: f64,
    pub label: HealthLabel,
}

impl DiagnosticResult {
    fn from_scores(scores: TurbulenceScores, params: &DiagnosticParams) -> Self {
        Self {
            turbulence_variance: scores.variance,
            average_intensity: scores.intensity,
            label: classify(scores.variance, &params.thresholds),
        }
    }
}

/// Score of one chunk, kept for the detailed view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkScore {
    pub index: usize,
    pub offset: usize,
    pub len: usize,
    /// `None` when the chunk was too short to score.
    pub chaos: Option<f64>,
}

/// Intermediate values of one pipeline run alongside its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceBreakdown {
    pub sample_count: usize,
    pub sample_rate: u32,
    pub chunk_size: usize,
    /// Samples after the last full chunk, never scored.
    pub discarded_samples: usize,
    pub chunks: Vec<ChunkScore>,
    pub result: DiagnosticResult,
}

impl TurbulenceBreakdown {
    /// Number of chunks that contributed to the aggregate.
    pub fn scored_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.chaos.is_some()).count()
    }

    /// True when the result is the "not enough signal" sentinel.
    pub fn is_degenerate(&self) -> bool {
        self.scored_chunks() == 0
    }
}

/// Fold an interleaved buffer to mono and compute its diagnosis.
pub fn diagnose(
    buffer: &[f64],
    channels: usize,
    sample_rate: u32,
    params: &DiagnosticParams,
) -> DiagnosticResult {
    compute_turbulence(&Waveform::from_interleaved(buffer, channels, sample_rate), params)
}

/// Compute the diagnosis of a mono waveform.
pub fn compute_turbulence(waveform: &Waveform, params: &DiagnosticParams) -> DiagnosticResult {
    compute_breakdown(waveform, params).result
}

/// Compute the diagnosis and keep every intermediate score.
pub fn compute_breakdown(waveform: &Waveform, params: &DiagnosticParams) -> TurbulenceBreakdown {
    let len = waveform.len();
    let size = chunk_size(len, params.chunk_count);
    let chunks = split_chunks(&waveform.samples, params.chunk_count);

    log::debug!(
        "turbulence: {len} samples @ {} Hz, {} chunks of {size}, {} discarded",
        waveform.sample_rate,
        chunks.len(),
        discarded_tail(len, params.chunk_count)
    );

    let chunk_scores = score_chunks(&chunks, params);
    let qualifying: Vec<f64> = chunk_scores.iter().filter_map(|c| c.chaos).collect();

    if qualifying.is_empty() {
        log::warn!(
            "turbulence: no chunk of {size} samples reached the {}-sample minimum \
             ({len} samples, {} chunks); reporting the zero sentinel",
            params.min_chunk_len,
            params.chunk_count
        );
    }

    let result = DiagnosticResult::from_scores(aggregate_scores(&qualifying), params);

    TurbulenceBreakdown {
        sample_count: len,
        sample_rate: waveform.sample_rate,
        chunk_size: size,
        discarded_samples: discarded_tail(len, params.chunk_count),
        chunks: chunk_scores,
        result,
    }
}

/// Envelope and chaos score for every chunk, in waveform order.
fn score_chunks(chunks: &[Chunk<'_>], params: &DiagnosticParams) -> Vec<ChunkScore> {
    let Some(first) = chunks.first() else {
        return Vec::new();
    };
    // Short chunks are skipped before paying for an FFT plan.
    if first.len() < params.min_chunk_len {
        return chunks
            .iter()
            .enumerate()
            .map(|(index, c)| ChunkScore {
                index,
                offset: c.offset,
                len: c.len(),
                chaos: None,
            })
            .collect();
    }

    let extractor = EnvelopeExtractor::new(first.len());
    let score = |(index, chunk): (usize, &Chunk<'_>)| {
        let envelope = extractor.envelope(chunk.samples);
        ChunkScore {
            index,
            offset: chunk.offset,
            len: chunk.len(),
            chaos: chunk_chaos_score(&envelope, params.min_chunk_len, params.log_floor),
        }
    };

    if params.parallel {
        chunks.par_iter().enumerate().map(score).collect()
    } else {
        chunks.iter().enumerate().map(score).collect()
    }
}
