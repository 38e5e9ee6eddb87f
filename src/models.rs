//! Data models for the opportunity grader.
//!
//! This module contains the request, per-agent result, grading and response
//! structures that flow through one pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Raw signals reported by an agent, keyed by field name.
pub type RawData = BTreeMap<String, Value>;

/// Input to a pipeline run. Every agent reads the same request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Free-text query from the user.
    pub query: String,
    /// Molecule under evaluation, if known.
    #[serde(default)]
    pub molecule_name: Option<String>,
    /// Target indication, if known.
    #[serde(default)]
    pub target_indication: Option<String>,
}

impl AnalysisRequest {
    /// Creates a request with only a query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            molecule_name: None,
            target_indication: None,
        }
    }

    /// Sets the molecule name.
    pub fn with_molecule(mut self, molecule: impl Into<String>) -> Self {
        self.molecule_name = Some(molecule.into());
        self
    }

    /// Sets the target indication.
    pub fn with_indication(mut self, indication: impl Into<String>) -> Self {
        self.target_indication = Some(indication.into());
        self
    }

    /// Returns the molecule name or the given fallback.
    pub fn molecule_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(self.molecule_name.as_deref()).unwrap_or(fallback)
    }

    /// Returns the target indication or the given fallback.
    pub fn indication_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(self.target_indication.as_deref()).unwrap_or(fallback)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Output of a single agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Stable agent identifier, also used for score group matching.
    pub agent_name: String,
    /// Human-readable assessment.
    pub summary: String,
    /// Named signals backing the summary.
    #[serde(default)]
    pub raw_data: RawData,
}

impl AgentResult {
    pub fn new(agent_name: impl Into<String>, summary: impl Into<String>, raw_data: RawData) -> Self {
        Self {
            agent_name: agent_name.into(),
            summary: summary.into(),
            raw_data,
        }
    }

    /// Returns a numeric field as a score.
    ///
    /// Booleans, strings, lists and nulls are not scores and yield `None`.
    pub fn score_field(&self, field: &str) -> Option<f64> {
        self.raw_data.get(field).and_then(Value::as_f64)
    }
}

/// One of the five scoring dimensions of the composite grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGroup {
    MarketDemand,
    ProductionFeasibility,
    Demographics,
    PatentsAndTrials,
    Competition,
}

impl ScoreGroup {
    /// All groups in report order.
    pub const ALL: [ScoreGroup; 5] = [
        ScoreGroup::MarketDemand,
        ScoreGroup::ProductionFeasibility,
        ScoreGroup::Demographics,
        ScoreGroup::PatentsAndTrials,
        ScoreGroup::Competition,
    ];

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreGroup::MarketDemand => "market_demand",
            ScoreGroup::ProductionFeasibility => "production_feasibility",
            ScoreGroup::Demographics => "demographics",
            ScoreGroup::PatentsAndTrials => "patents_and_trials",
            ScoreGroup::Competition => "competition",
        }
    }

    /// Returns the label used in the executive summary.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreGroup::MarketDemand => "Market Demand",
            ScoreGroup::ProductionFeasibility => "Production Feasibility",
            ScoreGroup::Demographics => "Demographic Fit",
            ScoreGroup::PatentsAndTrials => "Patents & Trials",
            ScoreGroup::Competition => "Competition Landscape",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ScoreGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScoreGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoreGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown score group: {}", s))
    }
}

/// Averaged score per group for one run. Always holds all five groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupScores([f64; 5]);

impl GroupScores {
    /// Builds scores by evaluating `f` for every group.
    pub fn from_fn(mut f: impl FnMut(ScoreGroup) -> f64) -> Self {
        let mut scores = [0.0; 5];
        for group in ScoreGroup::ALL {
            scores[group.index()] = f(group);
        }
        Self(scores)
    }

    pub fn get(&self, group: ScoreGroup) -> f64 {
        self.0[group.index()]
    }

    /// Iterates `(group, score)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (ScoreGroup, f64)> + '_ {
        ScoreGroup::ALL.into_iter().map(move |g| (g, self.get(g)))
    }
}

/// Per-group scores plus the weighted composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingBreakdown {
    pub market_demand: f64,
    pub production_feasibility: f64,
    pub demographics: f64,
    pub patents_and_trials: f64,
    pub competition: f64,
    /// Weighted sum of the five group scores.
    pub overall_score: f64,
}

impl GradingBreakdown {
    /// Returns the score of a single group.
    pub fn group(&self, group: ScoreGroup) -> f64 {
        match group {
            ScoreGroup::MarketDemand => self.market_demand,
            ScoreGroup::ProductionFeasibility => self.production_feasibility,
            ScoreGroup::Demographics => self.demographics,
            ScoreGroup::PatentsAndTrials => self.patents_and_trials,
            ScoreGroup::Competition => self.competition,
        }
    }
}

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[default]
    Completed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Unique identifier of this run.
    pub run_id: String,
    pub grading: GradingBreakdown,
    /// Agent results in registration order.
    pub results: Vec<AgentResult>,
    /// Assembled narrative report.
    pub report_content: String,
    pub status: RunStatus,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
}
