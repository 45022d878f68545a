//! Health bands.
//!
//! Classification looks at the turbulence variance only; intensity is
//! reported but never gates the label.

use serde::{Deserialize, Serialize};

/// Default variance above which an engine is flagged as showing wear.
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.08;

/// Default variance above which an engine is flagged as faulty.
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.15;

/// Engine health label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthLabel {
    /// Laminar flow: steady, low-variance rhythm.
    Healthy,
    /// High wear or rough idle.
    Warning,
    /// Rhythm instability: loose part or misfire.
    Critical,
}

impl HealthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Short banner for result displays.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY ENGINE",
            Self::Warning => "WARNING SIGNS",
            Self::Critical => "CRITICAL FAULT",
        }
    }

    /// One-line diagnosis for result displays.
    pub fn diagnosis(&self) -> &'static str {
        match self {
            Self::Healthy => "Laminar flow (perfect rhythm)",
            Self::Warning => "High wear / rough idle",
            Self::Critical => "Rhythm instability detected (loose part / misfire)",
        }
    }
}

impl std::fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variance cut-offs for the three bands. Both comparisons are strict, so a
/// variance equal to a threshold stays in the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: DEFAULT_WARNING_THRESHOLD,
            critical: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

/// Map a turbulence variance to a health label.
pub fn classify(variance: f64, thresholds: &Thresholds) -> HealthLabel {
    if variance > thresholds.critical {
        HealthLabel::Critical
    } else if variance > thresholds.warning {
        HealthLabel::Warning
    } else {
        HealthLabel::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        let t = Thresholds::default();
        assert_eq!(classify(0.08, &t), HealthLabel::Healthy);
        assert_eq!(classify(0.0800001, &t), HealthLabel::Warning);
        assert_eq!(classify(0.15, &t), HealthLabel::Warning);
        assert_eq!(classify(0.1500001, &t), HealthLabel::Critical);
    }

    #[test]
    fn zero_is_healthy() {
        assert_eq!(classify(0.0, &Thresholds::default()), HealthLabel::Healthy);
    }

    #[test]
    fn nan_never_escalates() {
        assert_eq!(classify(f64::NAN, &Thresholds::default()), HealthLabel::Healthy);
    }

    #[test]
    fn custom_thresholds() {
        let t = Thresholds {
            warning: 0.5,
            critical: 1.0,
        };
        assert_eq!(classify(0.2, &t), HealthLabel::Healthy);
        assert_eq!(classify(0.7, &t), HealthLabel::Warning);
        assert_eq!(classify(1.2, &t), HealthLabel::Critical);
    }

    #[test]
    fn label_text() {
        assert_eq!(HealthLabel::Critical.to_string(), "CRITICAL");
        assert_eq!(HealthLabel::Warning.headline(), "WARNING SIGNS");
        assert!(HealthLabel::Healthy.diagnosis().contains("Laminar"));
    }

    #[test]
    fn label_serializes_upper_case() {
        let json = serde_json::to_string(&HealthLabel::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let back: HealthLabel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(back, HealthLabel::Critical);
    }
}
