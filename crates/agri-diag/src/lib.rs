//! Confidence and severity scoring for crop pest and disease diagnoses.

pub mod assessment;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;

pub use assessment::{DiagnosticAssessment, DiagnosticAssessor, DiagnosticObservation};
pub use scoring::{GrowthStage, InvalidInput, ScoringConfig, ScoringEngine, SeverityLevel};
