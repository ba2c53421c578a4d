//! Deterministic post-processing of vision-model output.
//!
//! The engine blends the model's raw probability with how much of the expected
//! evidence was actually observed, and classifies damage severity from the
//! affected-area percentage and the crop's growth stage. Both operations are
//! pure: the only state is the [`ScoringConfig`] fixed at construction.

mod confidence;
mod config;
mod domain;
mod severity;

pub use confidence::ConfidenceBreakdown;
pub use config::{ScoringConfig, ScoringConfigError, SeverityThresholds, StageThresholds};
pub use domain::{GrowthStage, SeverityLevel};
pub use severity::SeverityBreakdown;

use tracing::debug;

/// Stateless scorer applying an injected [`ScoringConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Build an engine, rejecting configurations that cannot yield a bounded
    /// confidence or a total severity table.
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Adjusted confidence in `[0, 1]` for a diagnosis.
    ///
    /// Evidence is compared as sets after trimming and lower-casing; there is
    /// no partial credit for near matches.
    pub fn calculate_confidence<F, R, S, T>(
        &self,
        raw_probability: f64,
        evidence_found: F,
        required_evidence: R,
    ) -> Result<f64, InvalidInput>
    where
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.score_confidence(raw_probability, evidence_found, required_evidence)
            .map(|breakdown| breakdown.adjusted)
    }

    pub fn score_confidence<F, R, S, T>(
        &self,
        raw_probability: f64,
        evidence_found: F,
        required_evidence: R,
    ) -> Result<ConfidenceBreakdown, InvalidInput>
    where
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let breakdown = confidence::score_confidence(
            &self.config,
            raw_probability,
            evidence_found,
            required_evidence,
        )?;

        debug!(
            raw_probability,
            match_ratio = breakdown.match_ratio,
            matched = breakdown.matched_evidence.len(),
            missing = breakdown.missing_evidence.len(),
            adjusted = breakdown.adjusted,
            "confidence adjusted"
        );

        Ok(breakdown)
    }

    pub fn calculate_severity(
        &self,
        lesion_area_percentage: f64,
        growth_stage: GrowthStage,
    ) -> Result<SeverityLevel, InvalidInput> {
        self.score_severity(lesion_area_percentage, growth_stage)
            .map(|breakdown| breakdown.level)
    }

    /// Same as [`ScoringEngine::calculate_severity`] for a free-text stage label.
    pub fn calculate_severity_for_label(
        &self,
        lesion_area_percentage: f64,
        growth_stage: &str,
    ) -> Result<SeverityLevel, InvalidInput> {
        let stage = growth_stage.parse::<GrowthStage>()?;
        self.calculate_severity(lesion_area_percentage, stage)
    }

    pub fn score_severity(
        &self,
        lesion_area_percentage: f64,
        growth_stage: GrowthStage,
    ) -> Result<SeverityBreakdown, InvalidInput> {
        let breakdown =
            severity::score_severity(&self.config, lesion_area_percentage, growth_stage)?;

        debug!(
            lesion_area_percentage,
            stage = %growth_stage,
            medium_threshold = breakdown.thresholds.medium,
            high_threshold = breakdown.thresholds.high,
            level = %breakdown.level,
            "severity classified"
        );

        Ok(breakdown)
    }
}

/// The only failure the engine raises: an argument outside its domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("raw probability must be within 0.0..=1.0 (got {0})")]
    ProbabilityOutOfRange(f64),
    #[error("required evidence must contain at least one entry")]
    EmptyRequiredEvidence,
    #[error("lesion area percentage must be within 0.0..=100.0 (got {0})")]
    LesionAreaOutOfRange(f64),
    #[error("unknown growth stage `{0}`")]
    UnknownGrowthStage(String),
}
