use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assessment::{EvidenceCatalogue, FallbackPolicy};
use crate::scoring::{ScoringConfig, ScoringConfigError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub fallback_policy: FallbackPolicy,
    pub evidence_catalogue: Option<PathBuf>,
}

impl AppConfig {
    /// Read `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Weight overrides apply on top of the scoring file (or the defaults),
    /// and the merged scoring configuration is validated before returning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment =
            AppEnvironment::from_str(&lookup("APP_ENV").unwrap_or_else(|| "development".into()));

        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let format = match lookup("APP_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            None => LogFormat::Compact,
        };

        let mut scoring = match lookup("AGRI_SCORING_CONFIG") {
            Some(path) => read_json::<ScoringConfig>(Path::new(&path))?,
            None => ScoringConfig::default(),
        };
        if let Some(weight) = parse_weight(&lookup, "AGRI_CONFIDENCE_WEIGHT_PROBABILITY")? {
            scoring.confidence_weight_probability = weight;
        }
        if let Some(weight) = parse_weight(&lookup, "AGRI_CONFIDENCE_WEIGHT_EVIDENCE")? {
            scoring.confidence_weight_evidence = weight;
        }
        scoring.validate()?;

        let fallback_policy = match lookup("AGRI_FALLBACK_POLICY") {
            Some(raw) => raw
                .parse::<FallbackPolicy>()
                .map_err(|_| ConfigError::InvalidFallbackPolicy(raw))?,
            None => FallbackPolicy::default(),
        };

        let evidence_catalogue = lookup("AGRI_EVIDENCE_CATALOGUE").map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level, format },
            scoring,
            fallback_policy,
            evidence_catalogue,
        })
    }

    /// The configured evidence catalogue, or the built-in one when no file is set.
    pub fn load_catalogue(&self) -> Result<EvidenceCatalogue, ConfigError> {
        match &self.evidence_catalogue {
            Some(path) => read_json(path),
            None => Ok(EvidenceCatalogue::standard()),
        }
    }
}

fn parse_weight<F>(lookup: &F, key: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidWeight { key, value: raw })
        })
        .transpose()
}

fn read_json<T>(path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidLogFormat(String),
    InvalidWeight {
        key: &'static str,
        value: String,
    },
    InvalidFallbackPolicy(String),
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },
    Scoring(ScoringConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'full' (got '{value}')")
            }
            ConfigError::InvalidWeight { key, value } => {
                write!(f, "{key} must be a decimal number (got '{value}')")
            }
            ConfigError::InvalidFallbackPolicy(value) => write!(
                f,
                "AGRI_FALLBACK_POLICY must be 'reject' or 'unadjusted' (got '{value}')"
            ),
            ConfigError::ReadFile { path, .. } => {
                write!(f, "unable to read {}", path.display())
            }
            ConfigError::ParseFile { path, .. } => {
                write!(f, "{} is not valid JSON for this setting", path.display())
            }
            ConfigError::Scoring(err) => write!(f, "invalid scoring configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidWeight { .. }
            | ConfigError::InvalidFallbackPolicy(_) => None,
            ConfigError::ReadFile { source, .. } => Some(source),
            ConfigError::ParseFile { source, .. } => Some(source),
            ConfigError::Scoring(err) => Some(err),
        }
    }
}

impl From<ScoringConfigError> for ConfigError {
    fn from(value: ScoringConfigError) -> Self {
        Self::Scoring(value)
    }
}
