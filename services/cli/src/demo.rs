use agri_diag::assessment::{ConfidenceSource, DiagnosticObservation, FallbackPolicy};
use agri_diag::config::AppConfig;
use agri_diag::error::AppError;
use agri_diag::scoring::{GrowthStage, ScoringEngine};

use crate::commands::{build_assessor, build_engine};

struct SeverityCase {
    lesion_area: f64,
    stage: GrowthStage,
}

const SEVERITY_CASES: [SeverityCase; 4] = [
    SeverityCase {
        lesion_area: 18.5,
        stage: GrowthStage::Vegetative,
    },
    SeverityCase {
        lesion_area: 3.0,
        stage: GrowthStage::Seedling,
    },
    SeverityCase {
        lesion_area: 3.0,
        stage: GrowthStage::Mature,
    },
    SeverityCase {
        lesion_area: 30.0,
        stage: GrowthStage::Mature,
    },
];

pub(crate) fn run_demo(config: &AppConfig) -> Result<(), AppError> {
    let engine = build_engine(config)?;

    println!("Crop diagnostic scoring demo");
    println!(
        "Weights: {:.2} model probability | {:.2} evidence completeness",
        engine.config().confidence_weight_probability,
        engine.config().confidence_weight_evidence
    );

    render_confidence_cases(&engine)?;
    render_severity_cases(&engine)?;
    render_assessments(config)?;

    Ok(())
}

fn render_confidence_cases(engine: &ScoringEngine) -> Result<(), AppError> {
    println!("\nConfidence adjustment");
    let cases: [(f64, &[&str], &[&str]); 2] = [
        (0.90, &["rings", "halo"], &["rings", "halo", "lesion"]),
        (
            0.82,
            &["rings", "lesion", "halo"],
            &["rings", "lesion", "halo"],
        ),
    ];

    for (raw, found, required) in cases {
        let breakdown = engine.score_confidence(raw, found, required)?;
        println!(
            "- raw {:.2} | {}/{} expected symptoms observed | adjusted {:.3}",
            raw,
            breakdown.matched_evidence.len(),
            breakdown.matched_evidence.len() + breakdown.missing_evidence.len(),
            breakdown.adjusted
        );
        if !breakdown.missing_evidence.is_empty() {
            println!("  missing: {}", breakdown.missing_evidence.join(", "));
        }
    }
    Ok(())
}

fn render_severity_cases(engine: &ScoringEngine) -> Result<(), AppError> {
    println!("\nSeverity classification");
    for case in &SEVERITY_CASES {
        let breakdown = engine.score_severity(case.lesion_area, case.stage)?;
        println!(
            "- {:>5.1}% affected at {:<10} -> {:<6} (medium >= {:.0}%, high >= {:.0}%)",
            case.lesion_area,
            case.stage.label(),
            breakdown.level.label(),
            breakdown.thresholds.medium,
            breakdown.thresholds.high
        );
    }
    Ok(())
}

fn render_assessments(config: &AppConfig) -> Result<(), AppError> {
    println!("\nDiagnostic assessments");

    let observations = [
        DiagnosticObservation {
            label: "Early Blight (Alternaria solani)".to_string(),
            raw_probability: 0.82,
            evidence_found: vec![
                "Concentric brown rings (target-like lesions)".to_string(),
                "Yellow halo around lesions".to_string(),
                "Brown necrotic lesions".to_string(),
            ],
            growth_stage: "vegetative".to_string(),
            lesion_area_percentage: 18.5,
        },
        DiagnosticObservation {
            label: "Septoria Leaf Spot".to_string(),
            raw_probability: 0.64,
            evidence_found: vec!["Small circular spots".to_string()],
            growth_stage: "fruit set".to_string(),
            lesion_area_percentage: 9.0,
        },
    ];

    for policy in [FallbackPolicy::Reject, FallbackPolicy::Unadjusted] {
        println!("Fallback policy: {policy}");
        let assessor = build_assessor(config, policy)?;
        for observation in &observations {
            match assessor.assess(observation) {
                Ok(assessment) => {
                    let source = match assessment.confidence.source {
                        ConfidenceSource::Adjusted => "adjusted",
                        ConfidenceSource::Unadjusted => "unadjusted",
                    };
                    println!(
                        "- {}: confidence {:.3} ({}) | severity {} ({:.2}) at {} | yield loss {} | urgency {}",
                        assessment.label,
                        assessment.confidence.value,
                        source,
                        assessment.severity.level,
                        assessment.severity.quantitative_score,
                        assessment.severity.growth_stage,
                        assessment.yield_loss_estimate,
                        assessment.urgency_level
                    );
                    println!("  {}", assessment.confidence_notes);
                    for risk in &assessment.risk_factors {
                        println!("  risk: {risk}");
                    }
                }
                Err(err) => println!("- {}: rejected ({err})", observation.label),
            }
        }
    }
    Ok(())
}
