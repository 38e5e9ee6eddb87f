//! Weighted composite grading.

use crate::analysis::extractor::{default_rules, extract_group_scores, ScoringRule};
use crate::models::{AgentResult, GradingBreakdown, GroupScores, ScoreGroup};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Invalid grading weights.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("weight for {group} must be a finite, non-negative number (got {value})")]
    InvalidWeight { group: ScoreGroup, value: f64 },

    #[error("weights must sum to 1.0 (got {sum})")]
    BadSum { sum: f64 },
}

/// Weight per score group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingWeights {
    #[serde(default = "default_market_demand")]
    pub market_demand: f64,
    #[serde(default = "default_production_feasibility")]
    pub production_feasibility: f64,
    #[serde(default = "default_demographics")]
    pub demographics: f64,
    #[serde(default = "default_patents_and_trials")]
    pub patents_and_trials: f64,
    #[serde(default = "default_competition")]
    pub competition: f64,
}

impl Default for GradingWeights {
    fn default() -> Self {
        Self {
            market_demand: default_market_demand(),
            production_feasibility: default_production_feasibility(),
            demographics: default_demographics(),
            patents_and_trials: default_patents_and_trials(),
            competition: default_competition(),
        }
    }
}

fn default_market_demand() -> f64 {
    0.25
}

fn default_production_feasibility() -> f64 {
    0.25
}

fn default_demographics() -> f64 {
    0.15
}

fn default_patents_and_trials() -> f64 {
    0.2
}

fn default_competition() -> f64 {
    0.15
}

impl GradingWeights {
    pub fn weight(&self, group: ScoreGroup) -> f64 {
        match group {
            ScoreGroup::MarketDemand => self.market_demand,
            ScoreGroup::ProductionFeasibility => self.production_feasibility,
            ScoreGroup::Demographics => self.demographics,
            ScoreGroup::PatentsAndTrials => self.patents_and_trials,
            ScoreGroup::Competition => self.competition,
        }
    }

    pub fn sum(&self) -> f64 {
        ScoreGroup::ALL.iter().map(|g| self.weight(*g)).sum()
    }

    /// Check that every weight is finite and non-negative and that they sum to 1.0.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for group in ScoreGroup::ALL {
            let value = self.weight(group);
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight { group, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum { sum });
        }

        Ok(())
    }
}

/// Combine group scores into a breakdown.
///
/// Scores are neither clamped nor normalized; keeping the weights normalized
/// is the caller's job (see [`GradingWeights::validate`]).
pub fn grade(scores: &GroupScores, weights: &GradingWeights) -> GradingBreakdown {
    let overall_score: f64 = scores
        .iter()
        .map(|(group, score)| score * weights.weight(group))
        .sum();

    GradingBreakdown {
        market_demand: scores.get(ScoreGroup::MarketDemand),
        production_feasibility: scores.get(ScoreGroup::ProductionFeasibility),
        demographics: scores.get(ScoreGroup::Demographics),
        patents_and_trials: scores.get(ScoreGroup::PatentsAndTrials),
        competition: scores.get(ScoreGroup::Competition),
        overall_score,
    }
}

/// Rule table and weights applied together.
#[derive(Debug, Clone)]
pub struct Grader {
    rules: Vec<ScoringRule>,
    weights: GradingWeights,
}

impl Default for Grader {
    fn default() -> Self {
        Self::new(default_rules(), GradingWeights::default())
    }
}

impl Grader {
    pub fn new(rules: Vec<ScoringRule>, weights: GradingWeights) -> Self {
        Self { rules, weights }
    }

    /// Extract group scores from `results` and grade them.
    pub fn grade(&self, results: &[AgentResult]) -> GradingBreakdown {
        let scores = extract_group_scores(results, &self.rules);
        let breakdown = grade(&scores, &self.weights);
        debug!("Graded {} results: {:?}", results.len(), breakdown);
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawData;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_weights_are_valid() {
        let weights = GradingWeights::default();
        assert!(approx(weights.sum(), 1.0));
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_sum() {
        let weights = GradingWeights {
            competition: 0.5,
            ..GradingWeights::default()
        };
        assert!(matches!(weights.validate(), Err(WeightsError::BadSum { .. })));
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let weights = GradingWeights {
            market_demand: -0.25,
            production_feasibility: 0.75,
            ..GradingWeights::default()
        };
        assert_eq!(
            weights.validate(),
            Err(WeightsError::InvalidWeight {
                group: ScoreGroup::MarketDemand,
                value: -0.25
            })
        );
    }

    #[test]
    fn test_validate_rejects_nan() {
        let weights = GradingWeights {
            demographics: f64::NAN,
            ..GradingWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(WeightsError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_grade_single_market_score() {
        let scores = GroupScores::from_fn(|g| match g {
            ScoreGroup::MarketDemand => 0.82,
            _ => 0.5,
        });
        let breakdown = grade(&scores, &GradingWeights::default());

        assert_eq!(breakdown.market_demand, 0.82);
        assert!(approx(breakdown.overall_score, 0.58));
    }

    #[test]
    fn test_overall_in_unit_range_for_normalized_weights() {
        let weight_sets = [
            GradingWeights::default(),
            GradingWeights {
                market_demand: 1.0,
                production_feasibility: 0.0,
                demographics: 0.0,
                patents_and_trials: 0.0,
                competition: 0.0,
            },
            GradingWeights {
                market_demand: 0.2,
                production_feasibility: 0.2,
                demographics: 0.2,
                patents_and_trials: 0.2,
                competition: 0.2,
            },
        ];
        let score_grid = [0.0, 0.13, 0.5, 0.87, 1.0];

        for weights in &weight_sets {
            for (i, a) in score_grid.iter().enumerate() {
                for b in &score_grid[i..] {
                    let scores = GroupScores::from_fn(|g| match g {
                        ScoreGroup::MarketDemand | ScoreGroup::Demographics => *a,
                        _ => *b,
                    });
                    let overall = grade(&scores, weights).overall_score;
                    assert!(
                        (0.0 - 1e-12..=1.0 + 1e-12).contains(&overall),
                        "overall {} out of range",
                        overall
                    );
                }
            }
        }
    }

    #[test]
    fn test_grade_does_not_clamp_or_normalize() {
        let scores = GroupScores::from_fn(|_| 1.5);
        assert!(approx(grade(&scores, &GradingWeights::default()).overall_score, 1.5));

        let heavy = GradingWeights {
            market_demand: 1.0,
            production_feasibility: 1.0,
            demographics: 0.0,
            patents_and_trials: 0.0,
            competition: 0.0,
        };
        let scores = GroupScores::from_fn(|_| 1.0);
        assert!(approx(grade(&scores, &heavy).overall_score, 2.0));
    }

    #[test]
    fn test_grading_is_order_independent() {
        let make = |name: &str, field: &str, v: f64| {
            let mut raw = RawData::new();
            raw.insert(field.to_string(), json!(v));
            AgentResult::new(name, "s", raw)
        };
        let mut results = vec![
            make("IQVIA-North", "market_demand_score", 0.1),
            make("IQVIA-South", "market_demand_score", 0.2),
            make("IQVIA-East", "market_demand_score", 0.3),
            make("EXIMTrendAgent", "overall_market_demand_score", 0.78),
            make("ProcessDesignAgent", "production_feasibility_score", 0.76),
            make("TechnoEconomicAgent", "production_feasibility_score", 0.81),
            make("CompetitionAgent", "competition_overall_score", 0.55),
        ];

        let grader = Grader::default();
        let forward = grader.grade(&results);
        results.reverse();
        let reversed = grader.grade(&results);
        results.rotate_left(2);
        let rotated = grader.grade(&results);

        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_group_mean_is_bit_identical_across_orders() {
        let make = |name: &str, v: f64| {
            let mut raw = RawData::new();
            raw.insert("market_demand_score".to_string(), json!(v));
            AgentResult::new(name, "s", raw)
        };
        let forward = vec![
            make("IQVIA-A", 0.1),
            make("IQVIA-B", 0.2),
            make("IQVIA-C", 0.3),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        let grader = Grader::default();
        let a = grader.grade(&forward);
        let b = grader.grade(&reversed);

        assert_eq!(a.market_demand.to_bits(), b.market_demand.to_bits());
        assert_eq!(a.overall_score.to_bits(), b.overall_score.to_bits());
    }
}
