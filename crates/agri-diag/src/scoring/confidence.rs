use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use super::InvalidInput;

/// Audit trail for a single confidence adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub raw_probability: f64,
    pub match_ratio: f64,
    pub matched_evidence: Vec<String>,
    pub missing_evidence: Vec<String>,
    pub adjusted: f64,
}

/// Trim and lower-case every entry, collapsing duplicates. Entries that are
/// blank after trimming carry no evidence and are dropped.
fn normalize_evidence<I, S>(evidence: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    evidence
        .into_iter()
        .map(|entry| entry.as_ref().trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn ensure_probability(raw_probability: f64) -> Result<(), InvalidInput> {
    if (0.0..=1.0).contains(&raw_probability) {
        Ok(())
    } else {
        Err(InvalidInput::ProbabilityOutOfRange(raw_probability))
    }
}

pub(crate) fn score_confidence<F, R, S, T>(
    config: &ScoringConfig,
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
    ensure_probability(raw_probability)?;

    let required = normalize_evidence(required_evidence);
    if required.is_empty() {
        return Err(InvalidInput::EmptyRequiredEvidence);
    }
    let found = normalize_evidence(evidence_found);

    let (matched_evidence, missing_evidence): (Vec<String>, Vec<String>) = required
        .into_iter()
        .partition(|requirement| found.contains(requirement));

    let required_count = matched_evidence.len() + missing_evidence.len();
    let match_ratio = matched_evidence.len() as f64 / required_count as f64;

    let adjusted = (config.confidence_weight_probability * raw_probability
        + config.confidence_weight_evidence * match_ratio)
        .clamp(0.0, 1.0);

    Ok(ConfidenceBreakdown {
        raw_probability,
        match_ratio,
        matched_evidence,
        missing_evidence,
        adjusted,
    })
}
