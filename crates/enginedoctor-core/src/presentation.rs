//! Presentation helpers shared by the CLI and the server.
//!
//! Nothing here feeds back into scoring: these functions only shape a
//! finished diagnosis and the raw waveform for display or JSON output.

use serde::Serialize;

use crate::params::DiagnosticParams;
use crate::pipeline::{DiagnosticResult, TurbulenceBreakdown};
use crate::waveform::Waveform;

/// Keep every 50th sample for waveform views.
pub const DEFAULT_DECIMATION: usize = 50;

/// Every `step`-th sample, starting with the first. A step of 0 is treated
/// as 1.
pub fn decimate(samples: &[f64], step: usize) -> Vec<f64> {
    samples.iter().step_by(step.max(1)).copied().collect()
}

/// A decimated view of the raw waveform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformPreview {
    pub step: usize,
    pub points: Vec<f64>,
}

impl WaveformPreview {
    pub fn new(waveform: &Waveform, step: usize) -> Self {
        Self {
            step: step.max(1),
            points: decimate(&waveform.samples, step),
        }
    }
}

/// Score as shown to users: three decimals.
pub fn format_score(score: f64) -> String {
    format!("{score:.3}")
}

/// Everything a front end needs to show one diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub version: &'static str,
    /// File name or source identifier, if known.
    pub source: Option<String>,
    pub channels: usize,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub result: DiagnosticResult,
    pub headline: &'static str,
    pub diagnosis: &'static str,
    pub scored_chunks: usize,
    pub params: DiagnosticParams,
    pub breakdown: TurbulenceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<WaveformPreview>,
}

impl DiagnosticReport {
    pub fn new(
        source: Option<String>,
        channels: usize,
        waveform: &Waveform,
        params: &DiagnosticParams,
        breakdown: TurbulenceBreakdown,
    ) -> Self {
        let result = breakdown.result;
        Self {
            version: crate::VERSION,
            source,
            channels,
            sample_rate: waveform.sample_rate,
            duration_secs: waveform.duration_secs(),
            result,
            headline: result.label.headline(),
            diagnosis: result.label.diagnosis(),
            scored_chunks: breakdown.scored_chunks(),
            params: params.clone(),
            breakdown,
            preview: None,
        }
    }

    /// Attach a decimated waveform view.
    pub fn with_preview(mut self, waveform: &Waveform, step: usize) -> Self {
        self.preview = Some(WaveformPreview::new(waveform, step));
        self
    }
}
