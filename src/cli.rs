//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::agent::FailurePolicy;
use crate::models::AnalysisRequest;
use clap::Parser;
use std::path::PathBuf;

/// GenOpp - multi-agent generic drug opportunity grading
///
/// Runs a panel of market, production, patent, demographic and competition
/// agents against a molecule and grades the generic opportunity.
///
/// Examples:
///   genopp --query "Assess generic entry" --molecule Metformin
///   genopp --query "..." --molecule Atorvastatin --indication hypercholesterolemia --format json
///   genopp --query "..." --molecule Metformin --live-sources --on-agent-failure degrade
///   genopp --query "..." --fail-below 0.6
///   genopp --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Free-text analysis question
    ///
    /// Not required when using --init-config.
    #[arg(
        long,
        value_name = "TEXT",
        env = "GENOPP_QUERY",
        required_unless_present = "init_config"
    )]
    pub query: Option<String>,

    /// Molecule to evaluate
    #[arg(short, long, value_name = "NAME")]
    pub molecule: Option<String>,

    /// Target indication
    #[arg(short, long, value_name = "INDICATION")]
    pub indication: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .genopp.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "GENOPP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to the config file setting or genopp_report.txt.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Print the report to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Also query the public clinical trial, openFDA, PubMed and Open Targets registries
    #[arg(long)]
    pub live_sources: bool,

    /// Deadline for all agents in seconds
    ///
    /// No deadline unless set here or in the config file.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// What to do when an agent fails
    ///
    /// abort: fail the run. degrade: keep going with a placeholder result.
    #[arg(long, value_name = "POLICY")]
    pub on_agent_failure: Option<FailurePolicy>,

    /// Fail if the overall grade is below this score (0.0 - 1.0)
    ///
    /// Useful for screening pipelines. Exit code 2 when the grade is lower.
    #[arg(long, value_name = "SCORE")]
    pub fail_below: Option<f64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .genopp.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text report (default)
    #[default]
    Text,
    /// Full response as JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.query.as_deref().map_or(true, |q| q.trim().is_empty()) {
            return Err("Query must not be empty".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.stdout && self.output.is_some() {
            return Err("Cannot use both --stdout and --output".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(threshold) = self.fail_below {
            if !(0.0..=1.0).contains(&threshold) {
                return Err("--fail-below must be between 0.0 and 1.0".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build the analysis request from the query flags.
    pub fn request(&self) -> AnalysisRequest {
        let mut request = AnalysisRequest::new(self.query.clone().unwrap_or_default());
        if let Some(ref molecule) = self.molecule {
            request = request.with_molecule(molecule.clone());
        }
        if let Some(ref indication) = self.indication {
            request = request.with_indication(indication.clone());
        }
        request
    }
}
