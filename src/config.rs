//! Configuration file handling.
//!
//! This module handles loading, validating and merging configuration from
//! `.genopp.toml` files. Grading weights and the scoring rule table are
//! validated when the file is loaded.

use crate::agent::FailurePolicy;
use crate::analysis::{default_rules, GradingWeights, ScoringRule, WeightsError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".genopp.toml";

/// Semantic configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid grading weights: {0}")]
    InvalidWeights(#[from] WeightsError),

    #[error("invalid scoring rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Weight of each score group in the composite grade.
    #[serde(default)]
    pub grading: GradingWeights,

    /// Score extraction rules.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Fan-out behaviour.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Live registry sources.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "genopp_report.txt".to_string()
}

/// Rule table mapping agent names to score group fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<ScoringRule>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

/// Fan-out settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// What to do when an agent fails.
    #[serde(default)]
    pub on_agent_failure: FailurePolicy,

    /// Deadline for the whole fan-out. No deadline when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

/// Live registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Register the live registry agents.
    #[serde(default)]
    pub enabled: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_clinical_trials_url")]
    pub clinical_trials_url: String,

    #[serde(default = "default_open_fda_url")]
    pub open_fda_url: String,

    #[serde(default = "default_pubmed_url")]
    pub pubmed_url: String,

    #[serde(default = "default_open_targets_url")]
    pub open_targets_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_seconds: default_source_timeout(),
            clinical_trials_url: default_clinical_trials_url(),
            open_fda_url: default_open_fda_url(),
            pubmed_url: default_pubmed_url(),
            open_targets_url: default_open_targets_url(),
        }
    }
}

fn default_source_timeout() -> u64 {
    10
}

fn default_clinical_trials_url() -> String {
    "https://clinicaltrials.gov/api/v2/studies".to_string()
}

fn default_open_fda_url() -> String {
    "https://api.fda.gov/drug".to_string()
}

fn default_pubmed_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi".to_string()
}

fn default_open_targets_url() -> String {
    "https://api.platform.opentargets.org/api/v4/graphql".to_string()
}

impl Config {
    /// Load and validate configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be loaded.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.genopp.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check weights, rules and settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grading.validate()?;

        for (i, rule) in self.scoring.rules.iter().enumerate() {
            let index = i + 1;
            if !rule.patterns.iter().any(|p| !p.trim().is_empty()) {
                return Err(ConfigError::InvalidRule {
                    index,
                    reason: "at least one non-empty pattern is required".to_string(),
                });
            }
            if rule.field.trim().is_empty() {
                return Err(ConfigError::InvalidRule {
                    index,
                    reason: "field must not be empty".to_string(),
                });
            }
        }

        if self.pipeline.timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidSetting(
                "pipeline.timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.sources.timeout_seconds == 0 {
            return Err(ConfigError::InvalidSetting(
                "sources.timeout_seconds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(timeout) = args.timeout {
            self.pipeline.timeout_seconds = Some(timeout);
        }

        if let Some(policy) = args.on_agent_failure {
            self.pipeline.on_agent_failure = policy;
        }

        // Flags always override
        if args.live_sources {
            self.sources.enabled = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreGroup;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "genopp_report.txt");
        assert_eq!(config.grading, GradingWeights::default());
        assert_eq!(config.scoring.rules.len(), 8);
        assert_eq!(config.pipeline.on_agent_failure, FailurePolicy::Abort);
        assert!(!config.sources.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "metformin.txt"
verbose = true

[grading]
market_demand = 0.3
production_feasibility = 0.2
demographics = 0.2
patents_and_trials = 0.2
competition = 0.1

[pipeline]
on_agent_failure = "degrade"
timeout_seconds = 30

[sources]
enabled = true
"#;

        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(config.general.output, "metformin.txt");
        assert!(config.general.verbose);
        assert_eq!(config.grading.market_demand, 0.3);
        assert_eq!(config.pipeline.on_agent_failure, FailurePolicy::Degrade);
        assert_eq!(config.pipeline.timeout_seconds, Some(30));
        assert!(config.sources.enabled);
        assert_eq!(config.sources.timeout_seconds, 10);
        assert_eq!(config.scoring.rules, default_rules());
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let toml_content = r#"
[[scoring.rules]]
patterns = ["pricing"]
group = "competition"
field = "price_score"
"#;

        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(config.scoring.rules.len(), 1);
        assert_eq!(config.scoring.rules[0].group, ScoreGroup::Competition);
        assert!(config.scoring.rules[0].matches("RegionalPricingAgent"));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let toml_content = r#"
[grading]
market_demand = 0.5
"#;

        let err = Config::from_toml(toml_content).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::InvalidWeights(WeightsError::BadSum { .. })));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let toml_content = r#"
[grading]
market_demand = -0.25
production_feasibility = 0.75
"#;

        assert!(Config::from_toml(toml_content).is_err());
    }

    #[test]
    fn test_unknown_group_rejected() {
        let toml_content = r#"
[[scoring.rules]]
patterns = ["pricing"]
group = "pricing"
field = "price_score"
"#;

        assert!(Config::from_toml(toml_content).is_err());
    }

    #[test]
    fn test_rule_without_patterns_rejected() {
        let mut config = Config::default();
        config.scoring.rules.push(ScoringRule {
            patterns: vec![" ".to_string()],
            group: ScoreGroup::Demographics,
            field: "x".to_string(),
        });

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { index: 9, .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.pipeline.timeout_seconds = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSetting(_))));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[grading]"));
        assert!(toml_str.contains("[[scoring.rules]]"));
        assert!(toml_str.contains("[sources]"));

        let reparsed = Config::from_toml(&toml_str).unwrap();
        assert_eq!(reparsed.scoring.rules, default_rules());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[pipeline]\non_agent_failure = \"degrade\"\n",
        )
        .unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.pipeline.on_agent_failure, FailurePolicy::Degrade);
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[grading]\ncompetition = \"high\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
    }
}
