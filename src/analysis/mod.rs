//! Score extraction and composite grading.
//!
//! Agent results are classified into score groups by a rule table,
//! averaged per group and combined with fixed weights.

pub mod extractor;
pub mod grading;

pub use extractor::{default_rules, extract_group_scores, ScoringRule, NEUTRAL_SCORE};
pub use grading::{grade, Grader, GradingWeights, WeightsError};
