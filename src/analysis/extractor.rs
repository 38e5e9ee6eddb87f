//! Score extraction from agent results.
//!
//! Each result is classified into score groups by matching its agent name
//! against a rule table. Every matching rule contributes the value of its
//! field, if present, to that group's candidates. Groups are then averaged.

use crate::models::{AgentResult, GroupScores, ScoreGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Score used for a group that received no candidates.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Routes a field of a matching agent's raw data into a score group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    /// Name fragments; the rule matches if the lower-cased agent name
    /// contains any of them.
    pub patterns: Vec<String>,
    /// Group receiving the value.
    pub group: ScoreGroup,
    /// Raw data field to read.
    pub field: String,
}

impl ScoringRule {
    pub fn new(patterns: &[&str], group: ScoreGroup, field: &str) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            group,
            field: field.to_string(),
        }
    }

    /// Case-insensitive substring match against an agent name.
    pub fn matches(&self, agent_name: &str) -> bool {
        let name = agent_name.to_lowercase();
        self.patterns
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| name.contains(&p.to_lowercase()))
    }
}

/// The built-in rule table.
pub fn default_rules() -> Vec<ScoringRule> {
    vec![
        ScoringRule::new(&["iqvia", "exim"], ScoreGroup::MarketDemand, "market_demand_score"),
        ScoringRule::new(
            &["iqvia", "exim"],
            ScoreGroup::MarketDemand,
            "overall_market_demand_score",
        ),
        ScoringRule::new(
            &["processdesign", "process design"],
            ScoreGroup::ProductionFeasibility,
            "production_feasibility_score",
        ),
        ScoringRule::new(
            &["techno"],
            ScoreGroup::ProductionFeasibility,
            "production_feasibility_score",
        ),
        ScoringRule::new(
            &["demographic"],
            ScoreGroup::Demographics,
            "demographic_overall_score",
        ),
        ScoringRule::new(&["patent"], ScoreGroup::PatentsAndTrials, "patent_overall_score"),
        ScoringRule::new(
            &["clinical"],
            ScoreGroup::PatentsAndTrials,
            "patents_and_trials_score",
        ),
        ScoringRule::new(
            &["competition"],
            ScoreGroup::Competition,
            "competition_overall_score",
        ),
    ]
}

/// Collect candidate scores per group.
pub fn collect_candidates(
    results: &[AgentResult],
    rules: &[ScoringRule],
) -> HashMap<ScoreGroup, Vec<f64>> {
    let mut candidates: HashMap<ScoreGroup, Vec<f64>> = HashMap::new();

    for result in results {
        for rule in rules.iter().filter(|r| r.matches(&result.agent_name)) {
            match result.score_field(&rule.field) {
                Some(score) => {
                    debug!(
                        "{} -> {} via {} = {}",
                        result.agent_name, rule.group, rule.field, score
                    );
                    candidates.entry(rule.group).or_default().push(score);
                }
                None => {
                    debug!(
                        "{} matched {} but has no numeric {}",
                        result.agent_name, rule.group, rule.field
                    );
                }
            }
        }
    }

    candidates
}

/// Arithmetic mean, or `default` when empty.
///
/// Values are summed in sorted order so the result does not depend on the
/// order the agents reported in.
pub fn mean_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        return default;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.iter().sum::<f64>() / sorted.len() as f64
}

/// Extract the five group scores from a set of agent results.
pub fn extract_group_scores(results: &[AgentResult], rules: &[ScoringRule]) -> GroupScores {
    let candidates = collect_candidates(results, rules);

    GroupScores::from_fn(|group| {
        candidates
            .get(&group)
            .map(|values| mean_or(values, NEUTRAL_SCORE))
            .unwrap_or(NEUTRAL_SCORE)
    })
}
