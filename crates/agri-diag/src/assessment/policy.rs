use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::SeverityLevel;

/// What the assessor does when a diagnosis has no expected evidence to
/// validate the model's probability against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Fail the assessment with the engine's `InvalidInput`.
    #[default]
    Reject,
    /// Report the raw model probability, flagged as unadjusted.
    Unadjusted,
}

impl FallbackPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            FallbackPolicy::Reject => "reject",
            FallbackPolicy::Unadjusted => "unadjusted",
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" | "abort" => Ok(FallbackPolicy::Reject),
            "unadjusted" | "raw" => Ok(FallbackPolicy::Unadjusted),
            other => Err(format!(
                "unknown fallback policy '{other}' (expected 'reject' or 'unadjusted')"
            )),
        }
    }
}

/// Numeric severity used by report consumers. Kept apart from the engine's
/// categorical output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityScoreMap {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for SeverityScoreMap {
    fn default() -> Self {
        Self {
            low: 0.25,
            medium: 0.65,
            high: 0.85,
        }
    }
}

impl SeverityScoreMap {
    pub fn score_for(&self, level: SeverityLevel) -> f64 {
        match level {
            SeverityLevel::Low => self.low,
            SeverityLevel::Medium => self.medium,
            SeverityLevel::High => self.high,
        }
    }
}
