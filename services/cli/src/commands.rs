use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agri_diag::assessment::{DiagnosticAssessor, DiagnosticObservation, FallbackPolicy};
use agri_diag::config::AppConfig;
use agri_diag::error::AppError;
use agri_diag::scoring::{GrowthStage, ScoringEngine};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub(crate) struct ConfidenceArgs {
    /// Probability the vision model reported for its top label (0.0-1.0)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) raw_probability: f64,
    /// Observed symptom; repeat for each symptom
    #[arg(long = "found")]
    pub(crate) found: Vec<String>,
    /// Symptom expected for the diagnosis; repeat for each symptom
    #[arg(long = "required")]
    pub(crate) required: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct SeverityArgs {
    /// Percentage of observed tissue showing damage (0-100)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lesion_area: f64,
    /// Growth stage label, e.g. "seedling" or "fruit set"
    #[arg(long)]
    pub(crate) stage: String,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON observation file, or '-' to read standard input
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the configured fallback policy (reject | unadjusted)
    #[arg(long)]
    pub(crate) policy: Option<FallbackPolicy>,
}

pub(crate) fn build_engine(config: &AppConfig) -> Result<Arc<ScoringEngine>, AppError> {
    Ok(Arc::new(ScoringEngine::new(config.scoring.clone())?))
}

pub(crate) fn build_assessor(
    config: &AppConfig,
    policy: FallbackPolicy,
) -> Result<DiagnosticAssessor, AppError> {
    let engine = build_engine(config)?;
    let catalogue = config.load_catalogue()?;
    Ok(DiagnosticAssessor::new(engine, catalogue, policy))
}

pub(crate) fn run_confidence(config: &AppConfig, args: ConfidenceArgs) -> Result<(), AppError> {
    let engine = build_engine(config)?;
    let breakdown = engine.score_confidence(args.raw_probability, &args.found, &args.required)?;
    print_json(&breakdown)
}

pub(crate) fn run_severity(config: &AppConfig, args: SeverityArgs) -> Result<(), AppError> {
    let engine = build_engine(config)?;
    let stage = args.stage.parse::<GrowthStage>()?;
    let breakdown = engine.score_severity(args.lesion_area, stage)?;
    print_json(&breakdown)
}

pub(crate) fn run_assess(config: &AppConfig, args: AssessArgs) -> Result<(), AppError> {
    let policy = args.policy.unwrap_or(config.fallback_policy);
    let assessor = build_assessor(config, policy)?;

    let raw = read_input(&args.input)?;
    let observation: DiagnosticObservation = serde_json::from_str(&raw)?;
    let assessment = assessor.assess(&observation)?;
    print_json(&assessment)
}

pub(crate) fn show_config(config: &AppConfig) -> Result<(), AppError> {
    print_json(&config.scoring)
}

fn read_input(path: &Path) -> Result<String, AppError> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
