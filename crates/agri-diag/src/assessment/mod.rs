//! Assembles scoring engine output into a diagnostic assessment.
//!
//! The assessor owns the decisions the engine leaves to its caller: where the
//! expected evidence for a diagnosis comes from, what happens when there is
//! none, how a categorical severity maps to a numeric score, and which
//! advisory notes accompany the result.

mod advisory;
mod catalogue;
mod policy;

pub use advisory::{AdvisoryThresholds, UrgencyLevel, UrgencyMap};
pub use catalogue::{CatalogueError, EvidenceCatalogue};
pub use policy::{FallbackPolicy, SeverityScoreMap};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scoring::{
    ConfidenceBreakdown, GrowthStage, InvalidInput, ScoringEngine, SeverityLevel, StageThresholds,
};

/// Parsed vision-model output for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticObservation {
    pub label: String,
    pub raw_probability: f64,
    #[serde(default)]
    pub evidence_found: Vec<String>,
    pub growth_stage: String,
    pub lesion_area_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    Adjusted,
    Unadjusted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedConfidence {
    pub value: f64,
    pub source: ConfidenceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ConfidenceBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedSeverity {
    pub level: SeverityLevel,
    pub quantitative_score: f64,
    pub growth_stage: GrowthStage,
    pub affected_area_percentage: f64,
    pub thresholds: StageThresholds,
}

/// Scored diagnosis ready to be merged into a user-facing report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticAssessment {
    pub label: String,
    pub confidence: AssessedConfidence,
    pub severity: AssessedSeverity,
    pub yield_loss_estimate: String,
    pub urgency_level: UrgencyLevel,
    pub confidence_notes: String,
    pub risk_factors: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

pub struct DiagnosticAssessor {
    engine: Arc<ScoringEngine>,
    catalogue: EvidenceCatalogue,
    policy: FallbackPolicy,
    severity_scores: SeverityScoreMap,
    advisory: AdvisoryThresholds,
}

impl DiagnosticAssessor {
    pub fn new(
        engine: Arc<ScoringEngine>,
        catalogue: EvidenceCatalogue,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            engine,
            catalogue,
            policy,
            severity_scores: SeverityScoreMap::default(),
            advisory: AdvisoryThresholds::default(),
        }
    }

    pub fn with_severity_scores(mut self, severity_scores: SeverityScoreMap) -> Self {
        self.severity_scores = severity_scores;
        self
    }

    pub fn with_advisory_thresholds(mut self, advisory: AdvisoryThresholds) -> Self {
        self.advisory = advisory;
        self
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn catalogue(&self) -> &EvidenceCatalogue {
        &self.catalogue
    }

    pub fn assess(
        &self,
        observation: &DiagnosticObservation,
    ) -> Result<DiagnosticAssessment, AssessmentError> {
        self.assess_at(observation, Utc::now())
    }

    /// Assess with an explicit timestamp.
    pub fn assess_at(
        &self,
        observation: &DiagnosticObservation,
        assessed_at: DateTime<Utc>,
    ) -> Result<DiagnosticAssessment, AssessmentError> {
        let severity = self.assess_severity(observation)?;
        let confidence = self.assess_confidence(observation)?;

        let advisory = advisory::advise(&self.advisory, confidence.value, severity.level);

        let adjusted = confidence.source == ConfidenceSource::Adjusted;
        info!(
            label = %observation.label,
            confidence = confidence.value,
            adjusted,
            severity = %severity.level,
            urgency = %advisory.urgency_level,
            "diagnosis assessed"
        );

        Ok(DiagnosticAssessment {
            label: observation.label.clone(),
            confidence,
            yield_loss_estimate: format!("{:.1}%", severity.affected_area_percentage),
            urgency_level: advisory.urgency_level,
            confidence_notes: advisory.confidence_notes,
            risk_factors: advisory.risk_factors,
            severity,
            assessed_at,
        })
    }

    fn assess_severity(
        &self,
        observation: &DiagnosticObservation,
    ) -> Result<AssessedSeverity, AssessmentError> {
        let severity_error = |source: InvalidInput| AssessmentError::Severity {
            label: observation.label.clone(),
            source,
        };

        let stage = observation
            .growth_stage
            .parse::<GrowthStage>()
            .map_err(severity_error)?;
        let breakdown = self
            .engine
            .score_severity(observation.lesion_area_percentage, stage)
            .map_err(severity_error)?;

        Ok(AssessedSeverity {
            level: breakdown.level,
            quantitative_score: self.severity_scores.score_for(breakdown.level),
            growth_stage: breakdown.growth_stage,
            affected_area_percentage: breakdown.lesion_area_percentage,
            thresholds: breakdown.thresholds,
        })
    }

    fn assess_confidence(
        &self,
        observation: &DiagnosticObservation,
    ) -> Result<AssessedConfidence, AssessmentError> {
        let required = self.catalogue.required_for(&observation.label);

        match self.engine.score_confidence(
            observation.raw_probability,
            &observation.evidence_found,
            required,
        ) {
            Ok(breakdown) => Ok(AssessedConfidence {
                value: breakdown.adjusted,
                source: ConfidenceSource::Adjusted,
                breakdown: Some(breakdown),
            }),
            // The probability is range-checked before the evidence, so reaching
            // this arm means the raw value is usable as-is.
            Err(InvalidInput::EmptyRequiredEvidence)
                if self.policy == FallbackPolicy::Unadjusted =>
            {
                warn!(
                    label = %observation.label,
                    raw_probability = observation.raw_probability,
                    "no expected evidence catalogued; reporting unadjusted confidence"
                );
                Ok(AssessedConfidence {
                    value: observation.raw_probability,
                    source: ConfidenceSource::Unadjusted,
                    breakdown: None,
                })
            }
            Err(source) => Err(AssessmentError::Confidence {
                label: observation.label.clone(),
                source,
            }),
        }
    }
}

/// Failure to assess an observation, tagged with the step that rejected it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("confidence for '{label}' could not be adjusted: {source}")]
    Confidence {
        label: String,
        #[source]
        source: InvalidInput,
    },
    #[error("severity for '{label}' could not be classified: {source}")]
    Severity {
        label: String,
        #[source]
        source: InvalidInput,
    },
}

impl AssessmentError {
    pub fn invalid_input(&self) -> &InvalidInput {
        match self {
            AssessmentError::Confidence { source, .. }
            | AssessmentError::Severity { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observation(label: &str) -> DiagnosticObservation {
        DiagnosticObservation {
            label: label.to_string(),
            raw_probability: 0.82,
            evidence_found: vec![
                "Concentric brown rings (target-like lesions)".to_string(),
                "yellow halo around lesions ".to_string(),
                "Brown necrotic lesions".to_string(),
            ],
            growth_stage: "vegetative".to_string(),
            lesion_area_percentage: 18.5,
        }
    }

    fn assessor(policy: FallbackPolicy) -> DiagnosticAssessor {
        DiagnosticAssessor::new(
            Arc::new(ScoringEngine::default()),
            EvidenceCatalogue::standard(),
            policy,
        )
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn assesses_catalogued_diagnosis() {
        let assessment = assessor(FallbackPolicy::Reject)
            .assess_at(&observation("Early Blight (Alternaria solani)"), fixed_time())
            .expect("assessment succeeds");

        assert_eq!(assessment.confidence.source, ConfidenceSource::Adjusted);
        let breakdown = assessment.confidence.breakdown.expect("breakdown present");
        assert!((breakdown.match_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(breakdown.missing_evidence, vec!["starts on lower leaves"]);
        assert!((assessment.confidence.value - (0.70 * 0.82 + 0.20)).abs() < 1e-9);

        assert_eq!(assessment.severity.level, SeverityLevel::Medium);
        assert_eq!(assessment.severity.quantitative_score, 0.65);
        assert_eq!(assessment.severity.growth_stage, GrowthStage::Vegetative);
        assert_eq!(assessment.yield_loss_estimate, "18.5%");
        assert_eq!(assessment.urgency_level, UrgencyLevel::Medium);
        assert_eq!(
            assessment.confidence_notes,
            "Detection confidence: 77.4%. High confidence - proceed with recommended treatments."
        );
        assert!(assessment.risk_factors.is_empty());
        assert_eq!(assessment.assessed_at, fixed_time());
    }

    #[test]
    fn advisory_tracks_reported_confidence() {
        let mut input = observation("Fusarium Head Blight");
        input.lesion_area_percentage = 26.0;

        input.raw_probability = 0.6999;
        let low = assessor(FallbackPolicy::Unadjusted)
            .assess_at(&input, fixed_time())
            .expect("fallback applies");
        assert_eq!(
            low.risk_factors,
            vec!["Low detection confidence - verification recommended"]
        );
        assert!(low.confidence_notes.contains("laboratory confirmation"));
        assert_eq!(low.urgency_level, UrgencyLevel::High);

        input.raw_probability = 0.70;
        let at_verification = assessor(FallbackPolicy::Unadjusted)
            .assess_at(&input, fixed_time())
            .expect("fallback applies");
        assert!(at_verification.risk_factors.is_empty());
        assert!(at_verification
            .confidence_notes
            .contains("laboratory confirmation"));

        input.raw_probability = 0.75;
        let at_confirmation = assessor(FallbackPolicy::Unadjusted)
            .assess_at(&input, fixed_time())
            .expect("fallback applies");
        assert_eq!(
            at_confirmation.confidence_notes,
            "Detection confidence: 75.0%. High confidence - proceed with recommended treatments."
        );
    }

    #[test]
    fn custom_advisory_thresholds_are_applied() {
        let assessment = assessor(FallbackPolicy::Reject)
            .with_advisory_thresholds(AdvisoryThresholds {
                laboratory_confirmation_below: 0.5,
                verification_below: 0.8,
                urgency: UrgencyMap {
                    medium: UrgencyLevel::High,
                    ..UrgencyMap::default()
                },
            })
            .assess_at(&observation("Early Blight"), fixed_time())
            .expect("assessment succeeds");

        assert!(assessment.confidence_notes.ends_with("proceed with recommended treatments."));
        assert_eq!(assessment.risk_factors.len(), 1);
        assert_eq!(assessment.urgency_level, UrgencyLevel::High);
    }

    #[test]
    fn reject_policy_surfaces_missing_catalogue_entry() {
        let err = assessor(FallbackPolicy::Reject)
            .assess_at(&observation("Fusarium Head Blight"), fixed_time())
            .unwrap_err();

        assert!(matches!(err, AssessmentError::Confidence { .. }));
        assert_eq!(err.invalid_input(), &InvalidInput::EmptyRequiredEvidence);
    }

    #[test]
    fn unadjusted_policy_reports_raw_probability() {
        let assessment = assessor(FallbackPolicy::Unadjusted)
            .assess_at(&observation("Fusarium Head Blight"), fixed_time())
            .expect("fallback applies");

        assert_eq!(assessment.confidence.source, ConfidenceSource::Unadjusted);
        assert_eq!(assessment.confidence.value, 0.82);
        assert!(assessment.confidence.breakdown.is_none());
    }

    #[test]
    fn unadjusted_policy_still_rejects_out_of_range_probability() {
        let mut input = observation("Fusarium Head Blight");
        input.raw_probability = 1.5;

        let err = assessor(FallbackPolicy::Unadjusted)
            .assess_at(&input, fixed_time())
            .unwrap_err();
        assert_eq!(
            err.invalid_input(),
            &InvalidInput::ProbabilityOutOfRange(1.5)
        );
    }

    #[test]
    fn severity_failures_abort_regardless_of_policy() {
        let mut input = observation("Early Blight");
        input.growth_stage = "dormant".to_string();

        let err = assessor(FallbackPolicy::Unadjusted)
            .assess_at(&input, fixed_time())
            .unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::Severity {
                source: InvalidInput::UnknownGrowthStage(_),
                ..
            }
        ));
    }

    #[test]
    fn custom_severity_scores_are_applied() {
        let assessment = assessor(FallbackPolicy::Reject)
            .with_severity_scores(SeverityScoreMap {
                low: 0.1,
                medium: 0.5,
                high: 0.9,
            })
            .assess_at(&observation("Early Blight"), fixed_time())
            .expect("assessment succeeds");
        assert_eq!(assessment.severity.quantitative_score, 0.5);
    }

    #[test]
    fn observation_deserializes_without_evidence() {
        let input: DiagnosticObservation = serde_json::from_str(
            r#"{
                "label": "Powdery Mildew",
                "raw_probability": 0.7,
                "growth_stage": "Flowering",
                "lesion_area_percentage": 4.0
            }"#,
        )
        .expect("observation parses");

        assert!(input.evidence_found.is_empty());
        let assessment = assessor(FallbackPolicy::Reject)
            .assess_at(&input, fixed_time())
            .expect("assessment succeeds");
        assert!((assessment.confidence.value - 0.49).abs() < 1e-9);
        assert_eq!(assessment.severity.level, SeverityLevel::Low);
    }
}
