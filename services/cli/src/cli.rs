use crate::commands::{
    run_assess, run_confidence, run_severity, show_config, AssessArgs, ConfidenceArgs,
    SeverityArgs,
};
use crate::demo::run_demo;
use agri_diag::config::AppConfig;
use agri_diag::error::AppError;
use agri_diag::telemetry;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "agri-diag",
    about = "Score crop pest and disease diagnoses from vision-model output",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adjust a raw model probability against expected evidence
    Confidence(ConfidenceArgs),
    /// Classify damage severity for a growth stage
    Severity(SeverityArgs),
    /// Score a JSON vision-model observation into a diagnostic assessment
    Assess(AssessArgs),
    /// Print the effective scoring configuration as JSON
    Config,
    /// Run the built-in diagnostic scenarios (default command)
    Demo,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command.unwrap_or(Command::Demo) {
        Command::Confidence(args) => run_confidence(&config, args),
        Command::Severity(args) => run_severity(&config, args),
        Command::Assess(args) => run_assess(&config, args),
        Command::Config => show_config(&config),
        Command::Demo => run_demo(&config),
    }
}
