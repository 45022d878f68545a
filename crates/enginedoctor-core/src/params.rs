//! Pipeline parameters.
//!
//! Every constant of the scoring pipeline travels in [`DiagnosticParams`] and
//! is passed explicitly to the compute functions; nothing is read from
//! module-level state. `Default` carries the field-tested values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chaos::{DEFAULT_LOG_FLOOR, DEFAULT_MIN_CHUNK_LEN};
use crate::classify::Thresholds;

/// Default number of chunks a waveform is cut into.
pub const DEFAULT_CHUNK_COUNT: usize = 20;

/// Parameters for one turbulence computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticParams {
    /// Number of equal chunks to cut the waveform into.
    pub chunk_count: usize,
    /// Chunks shorter than this are not scored.
    pub min_chunk_len: usize,
    /// Added to the envelope before the logarithm.
    pub log_floor: f64,
    pub thresholds: Thresholds,
    /// Score chunks on the rayon pool. Results are identical either way.
    pub parallel: bool,
}

impl Default for DiagnosticParams {
    fn default() -> Self {
        Self {
            chunk_count: DEFAULT_CHUNK_COUNT,
            min_chunk_len: DEFAULT_MIN_CHUNK_LEN,
            log_floor: DEFAULT_LOG_FLOOR,
            thresholds: Thresholds::default(),
            parallel: true,
        }
    }
}

impl DiagnosticParams {
    /// Load parameters from a JSON file. Missing fields keep their defaults.
    pub fn load_from_path(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let params = serde_json::from_str::<DiagnosticParams>(&raw).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("failed to parse parameter JSON: {e}"),
            )
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Reject parameter sets the pipeline cannot interpret.
    pub fn validate(&self) -> std::io::Result<()> {
        let invalid = |msg: String| -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
        };

        // ln(0) is -inf, so the floor has to keep every envelope value positive.
        if !self.log_floor.is_finite() || self.log_floor <= 0.0 {
            return invalid(format!(
                "log_floor must be finite and > 0, got {}",
                self.log_floor
            ));
        }
        let Thresholds { warning, critical } = self.thresholds;
        if !warning.is_finite() || !critical.is_finite() {
            return invalid(format!(
                "thresholds must be finite, got warning={warning} critical={critical}"
            ));
        }
        if warning > critical {
            return invalid(format!(
                "warning threshold {warning} is above critical threshold {critical}"
            ));
        }
        Ok(())
    }
}
