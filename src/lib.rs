//! GenOpp - multi-agent generic drug opportunity grading.
//!
//! A request naming a molecule is fanned out to a registry of analysis
//! agents. Their numeric signals are folded into five score groups, graded
//! with configurable weights and written up as a plain-text report.

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sources;

pub use agent::{Agent, AgentError, AgentRegistry, FailurePolicy};
pub use analysis::{Grader, GradingWeights, ScoringRule};
pub use config::Config;
pub use models::{AgentResult, AnalysisRequest, AnalysisResponse, GradingBreakdown, ScoreGroup};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
