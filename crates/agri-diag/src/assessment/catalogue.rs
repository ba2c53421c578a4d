use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Expected visual evidence per diagnosis.
///
/// Labels are matched on their common name: a trailing parenthetical (usually
/// the pathogen's binomial) is ignored, and comparison is case- and
/// whitespace-insensitive. `"Early Blight (Alternaria solani)"` and
/// `"early blight"` resolve to the same entry. A label with no common name,
/// such as `"(Alternaria)"`, never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct EvidenceCatalogue {
    entries: BTreeMap<String, Vec<String>>,
}

impl EvidenceCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostic features shipped with the service for the crops it is
    /// prompted about.
    pub fn standard() -> Self {
        Self::new()
            .with_entry(
                "Early Blight",
                [
                    "Concentric brown rings (target-like lesions)",
                    "Yellow halo around lesions",
                    "Starts on lower leaves",
                ],
            )
            .with_entry(
                "Late Blight",
                ["Water-soaked spots on leaves", "Brown/black lesions"],
            )
            .with_entry(
                "Gray Leaf Spot",
                ["Rectangular gray lesions", "Dark borders"],
            )
            .with_entry("Powdery Mildew", ["White powder coating"])
            .with_entry(
                "Downy Mildew",
                [
                    "Yellow spots on upper leaf surface",
                    "Gray/white fungal growth",
                ],
            )
    }

    pub fn with_entry<I, S>(mut self, label: &str, evidence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(label, evidence);
        self
    }

    /// Register (or replace) the expected evidence for a diagnosis. Returns
    /// `false`, leaving the catalogue untouched, when the label has no common
    /// name.
    pub fn insert<I, S>(&mut self, label: &str, evidence: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(key) = catalogue_key(label) else {
            return false;
        };
        self.entries
            .insert(key, evidence.into_iter().map(Into::into).collect());
        true
    }

    /// Expected evidence for a diagnosis; empty when the label is unknown.
    pub fn required_for(&self, label: &str) -> &[String] {
        catalogue_key(label)
            .and_then(|key| self.entries.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for EvidenceCatalogue {
    type Error = CatalogueError;

    fn try_from(entries: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        let mut catalogue = Self::new();
        for (label, evidence) in entries {
            if !catalogue.insert(&label, evidence) {
                return Err(CatalogueError::MissingCommonName(label));
            }
        }
        Ok(catalogue)
    }
}

impl From<EvidenceCatalogue> for BTreeMap<String, Vec<String>> {
    fn from(catalogue: EvidenceCatalogue) -> Self {
        catalogue.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    #[error("catalogue label `{0}` has no common name")]
    MissingCommonName(String),
}

fn catalogue_key(label: &str) -> Option<String> {
    let common_name = label.split('(').next().unwrap_or(label);
    let key = common_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    (!key.is_empty()).then_some(key)
}
