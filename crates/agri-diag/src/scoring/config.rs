use serde::{Deserialize, Serialize};

use super::domain::GrowthStage;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Tunable weights and thresholds injected into the scoring engine.
///
/// Every field has a default, so a partial JSON document only overrides the
/// values it names. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub confidence_weight_probability: f64,
    pub confidence_weight_evidence: f64,
    pub severity_thresholds: SeverityThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_weight_probability: 0.70,
            confidence_weight_evidence: 0.30,
            severity_thresholds: SeverityThresholds::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for (name, value) in [
            (
                "confidence_weight_probability",
                self.confidence_weight_probability,
            ),
            ("confidence_weight_evidence", self.confidence_weight_evidence),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringConfigError::InvalidWeight { name, value });
            }
        }

        let sum = self.confidence_weight_probability + self.confidence_weight_evidence;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringConfigError::WeightsDoNotSumToOne { sum });
        }

        for stage in GrowthStage::ALL {
            let thresholds = self.severity_thresholds.for_stage(stage);
            if !thresholds.is_well_formed() {
                return Err(ScoringConfigError::InvalidThresholds {
                    stage,
                    medium: thresholds.medium,
                    high: thresholds.high,
                });
            }
        }

        Ok(())
    }
}

/// Lower bounds (inclusive, in percent of affected tissue) of the Medium and
/// High tiers for one growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageThresholds {
    pub medium: f64,
    pub high: f64,
}

impl StageThresholds {
    pub const fn new(medium: f64, high: f64) -> Self {
        Self { medium, high }
    }

    fn is_well_formed(&self) -> bool {
        let in_range = |value: f64| (0.0..=100.0).contains(&value);
        in_range(self.medium) && in_range(self.high) && self.medium <= self.high
    }
}

/// Per-stage threshold table. One field per stage keeps the lookup total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeverityThresholds {
    pub seedling: StageThresholds,
    pub vegetative: StageThresholds,
    pub flowering: StageThresholds,
    pub fruiting: StageThresholds,
    pub mature: StageThresholds,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            seedling: StageThresholds::new(5.0, 10.0),
            vegetative: StageThresholds::new(15.0, 25.0),
            flowering: StageThresholds::new(10.0, 20.0),
            fruiting: StageThresholds::new(12.0, 22.0),
            mature: StageThresholds::new(20.0, 30.0),
        }
    }
}

impl SeverityThresholds {
    pub fn for_stage(&self, stage: GrowthStage) -> StageThresholds {
        match stage {
            GrowthStage::Seedling => self.seedling,
            GrowthStage::Vegetative => self.vegetative,
            GrowthStage::Flowering => self.flowering,
            GrowthStage::Fruiting => self.fruiting,
            GrowthStage::Mature => self.mature,
        }
    }
}

/// Raised when a scoring configuration cannot back a working engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("confidence weight `{name}` must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("confidence weights must sum to 1.0 (got {sum})")]
    WeightsDoNotSumToOne { sum: f64 },
    #[error(
        "severity thresholds for {stage} must satisfy 0 <= medium <= high <= 100 \
         (got medium {medium}, high {high})"
    )]
    InvalidThresholds {
        stage: GrowthStage,
        medium: f64,
        high: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ScoringConfig::default()
            .validate()
            .expect("defaults validate");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: ScoringConfig = serde_json::from_str(
            r#"{
                "confidence_weight_probability": 0.6,
                "confidence_weight_evidence": 0.4,
                "severity_thresholds": { "mature": { "medium": 25.0, "high": 40.0 } }
            }"#,
        )
        .expect("config parses");

        assert_eq!(config.confidence_weight_probability, 0.6);
        assert_eq!(
            config.severity_thresholds.for_stage(GrowthStage::Mature),
            StageThresholds::new(25.0, 40.0)
        );
        assert_eq!(
            config.severity_thresholds.for_stage(GrowthStage::Seedling),
            StageThresholds::new(5.0, 10.0)
        );
        config.validate().expect("overridden config validates");
    }

    #[test]
    fn rejects_misspelled_keys() {
        for raw in [
            r#"{ "severity_thresholds": { "seedlings": { "medium": 1.0, "high": 2.0 } } }"#,
            r#"{ "confidence_weight_probabilty": 0.5 }"#,
            r#"{ "severity_thresholds": { "seedling": { "medium": 1.0, "hgih": 2.0 } } }"#,
        ] {
            let err = serde_json::from_str::<ScoringConfig>(raw).unwrap_err();
            assert!(
                err.to_string().contains("unknown field"),
                "unexpected error for {raw}: {err}"
            );
        }
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let config = ScoringConfig {
            confidence_weight_probability: 0.8,
            ..ScoringConfig::default()
        };

        match config.validate() {
            Err(ScoringConfigError::WeightsDoNotSumToOne { sum }) => {
                assert!((sum - 1.1).abs() < 1e-9);
            }
            other => panic!("expected weight sum error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_or_non_finite_weights() {
        let config = ScoringConfig {
            confidence_weight_probability: 1.3,
            confidence_weight_evidence: -0.3,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScoringConfigError::InvalidWeight {
                name: "confidence_weight_evidence",
                ..
            })
        ));

        let config = ScoringConfig {
            confidence_weight_probability: f64::NAN,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScoringConfigError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut config = ScoringConfig::default();
        config.severity_thresholds.flowering = StageThresholds::new(30.0, 20.0);

        match config.validate() {
            Err(ScoringConfigError::InvalidThresholds { stage, .. }) => {
                assert_eq!(stage, GrowthStage::Flowering);
            }
            other => panic!("expected threshold error, got {other:?}"),
        }
    }
}
