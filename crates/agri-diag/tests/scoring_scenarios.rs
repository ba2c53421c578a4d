use agri_diag::scoring::{GrowthStage, InvalidInput, ScoringEngine, SeverityLevel};

fn engine() -> ScoringEngine {
    ScoringEngine::default()
}

fn approx_eq(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn two_of_three_expected_symptoms() {
    let confidence = engine()
        .calculate_confidence(0.90, ["rings", "halo"], ["rings", "halo", "lesion"])
        .expect("valid input");

    assert!(approx_eq(confidence, 0.70 * 0.90 + 0.30 * (2.0 / 3.0)));
    assert!((confidence - 0.830).abs() < 1e-3);
}

#[test]
fn every_expected_symptom_observed() {
    let confidence = engine()
        .calculate_confidence(
            0.82,
            ["rings", "lesion", "halo"],
            ["rings", "lesion", "halo"],
        )
        .expect("valid input");

    assert!(approx_eq(confidence, 0.70 * 0.82 + 0.30));
}

#[test]
fn evidence_order_is_irrelevant() {
    let forward = engine()
        .calculate_confidence(0.55, ["rings", "halo"], ["lesion", "halo", "rings"])
        .expect("valid input");
    let reversed = engine()
        .calculate_confidence(0.55, ["halo", "rings"], ["rings", "halo", "lesion"])
        .expect("valid input");
    assert_eq!(forward, reversed);
}

#[test]
fn vegetative_leaf_damage_is_medium() {
    assert_eq!(
        engine().calculate_severity(18.5, GrowthStage::Vegetative),
        Ok(SeverityLevel::Medium)
    );
}

#[test]
fn light_damage_is_low_for_seedlings_and_mature_plants() {
    assert_eq!(
        engine().calculate_severity(3.0, GrowthStage::Seedling),
        Ok(SeverityLevel::Low)
    );
    assert_eq!(
        engine().calculate_severity(3.0, GrowthStage::Mature),
        Ok(SeverityLevel::Low)
    );
}

#[test]
fn mature_high_threshold_is_inclusive() {
    assert_eq!(
        engine().calculate_severity(30.0, GrowthStage::Mature),
        Ok(SeverityLevel::High)
    );
}

#[test]
fn invalid_arguments_fail_explicitly() {
    let engine = engine();

    assert_eq!(
        engine.calculate_confidence(1.5, ["rings"], ["rings"]),
        Err(InvalidInput::ProbabilityOutOfRange(1.5))
    );
    assert_eq!(
        engine.calculate_confidence(0.5, ["rings"], Vec::<String>::new()),
        Err(InvalidInput::EmptyRequiredEvidence)
    );
    assert_eq!(
        engine.calculate_severity(-1.0, GrowthStage::Flowering),
        Err(InvalidInput::LesionAreaOutOfRange(-1.0))
    );
    assert_eq!(
        engine.calculate_severity(101.0, GrowthStage::Flowering),
        Err(InvalidInput::LesionAreaOutOfRange(101.0))
    );
    assert_eq!(
        engine.calculate_severity_for_label(10.0, "bolting"),
        Err(InvalidInput::UnknownGrowthStage("bolting".to_string()))
    );
}
