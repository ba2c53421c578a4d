use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::SeverityLevel;

pub(crate) const LABORATORY_CONFIRMATION_NOTE: &str =
    "Recommend laboratory confirmation for definitive diagnosis.";
pub(crate) const PROCEED_NOTE: &str = "High confidence - proceed with recommended treatments.";
pub(crate) const VERIFICATION_RISK_FACTOR: &str =
    "Low detection confidence - verification recommended";

/// How soon treatment should follow the diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    pub fn label(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::High => "High",
            UrgencyLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency reported for each severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyMap {
    pub low: UrgencyLevel,
    pub medium: UrgencyLevel,
    pub high: UrgencyLevel,
}

impl Default for UrgencyMap {
    fn default() -> Self {
        Self {
            low: UrgencyLevel::Low,
            medium: UrgencyLevel::Medium,
            high: UrgencyLevel::High,
        }
    }
}

impl UrgencyMap {
    pub fn urgency_for(&self, level: SeverityLevel) -> UrgencyLevel {
        match level {
            SeverityLevel::Low => self.low,
            SeverityLevel::Medium => self.medium,
            SeverityLevel::High => self.high,
        }
    }
}

/// Confidence cut-offs (exclusive upper bounds) for the advisory attached to
/// an assessment, plus the severity-to-urgency mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryThresholds {
    /// Below this, the notes recommend laboratory confirmation.
    pub laboratory_confirmation_below: f64,
    /// Below this, verification is listed as a risk factor.
    pub verification_below: f64,
    pub urgency: UrgencyMap,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            laboratory_confirmation_below: 0.75,
            verification_below: 0.70,
            urgency: UrgencyMap::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Advisory {
    pub(crate) confidence_notes: String,
    pub(crate) risk_factors: Vec<String>,
    pub(crate) urgency_level: UrgencyLevel,
}

pub(crate) fn advise(
    thresholds: &AdvisoryThresholds,
    confidence: f64,
    severity: SeverityLevel,
) -> Advisory {
    let recommendation = if confidence < thresholds.laboratory_confirmation_below {
        LABORATORY_CONFIRMATION_NOTE
    } else {
        PROCEED_NOTE
    };
    let confidence_notes = format!(
        "Detection confidence: {:.1}%. {recommendation}",
        confidence * 100.0
    );

    let mut risk_factors = Vec::new();
    if confidence < thresholds.verification_below {
        risk_factors.push(VERIFICATION_RISK_FACTOR.to_string());
    }

    Advisory {
        confidence_notes,
        risk_factors,
        urgency_level: thresholds.urgency.urgency_for(severity),
    }
}
