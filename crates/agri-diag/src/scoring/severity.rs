use serde::{Deserialize, Serialize};

use super::config::{ScoringConfig, StageThresholds};
use super::domain::{GrowthStage, SeverityLevel};
use super::InvalidInput;

/// Classification result together with the threshold row that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub level: SeverityLevel,
    pub growth_stage: GrowthStage,
    pub lesion_area_percentage: f64,
    pub thresholds: StageThresholds,
}

fn ensure_lesion_area(lesion_area_percentage: f64) -> Result<(), InvalidInput> {
    if (0.0..=100.0).contains(&lesion_area_percentage) {
        Ok(())
    } else {
        Err(InvalidInput::LesionAreaOutOfRange(lesion_area_percentage))
    }
}

// Thresholds are inclusive lower bounds of their tier.
fn classify(lesion_area_percentage: f64, thresholds: StageThresholds) -> SeverityLevel {
    if lesion_area_percentage >= thresholds.high {
        SeverityLevel::High
    } else if lesion_area_percentage >= thresholds.medium {
        SeverityLevel::Medium
    } else {
        SeverityLevel::Low
    }
}

pub(crate) fn score_severity(
    config: &ScoringConfig,
    lesion_area_percentage: f64,
    growth_stage: GrowthStage,
) -> Result<SeverityBreakdown, InvalidInput> {
    ensure_lesion_area(lesion_area_percentage)?;

    let thresholds = config.severity_thresholds.for_stage(growth_stage);
    let level = classify(lesion_area_percentage, thresholds);

    Ok(SeverityBreakdown {
        level,
        growth_stage,
        lesion_area_percentage,
        thresholds,
    })
}
