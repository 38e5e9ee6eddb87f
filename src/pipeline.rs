//! Pipeline orchestration.
//!
//! A run moves strictly forward through
//! `Received -> FannedOut -> Graded -> Reported -> Completed`. Any failure
//! aborts the run and no response is produced.

use crate::agent::{AgentError, AgentRegistry, FailurePolicy, FanOutError, FanOutRunner};
use crate::analysis::{Grader, GradingWeights, ScoringRule};
use crate::config::Config;
use crate::domain;
use crate::models::{AnalysisRequest, AnalysisResponse, RunStatus};
use crate::report;
use crate::sources::{self, SourceSettings};
use chrono::Utc;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    FannedOut,
    Graded,
    Reported,
    Completed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Received => write!(f, "RECEIVED"),
            PipelineStage::FannedOut => write!(f, "FANNED_OUT"),
            PipelineStage::Graded => write!(f, "GRADED"),
            PipelineStage::Reported => write!(f, "REPORTED"),
            PipelineStage::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Fatal failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("agent {agent} failed: {source}")]
    AgentFailed {
        agent: String,
        #[source]
        source: AgentError,
    },

    #[error("agents did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to set up live sources: {0}")]
    Sources(#[from] AgentError),
}

impl From<FanOutError> for PipelineError {
    fn from(err: FanOutError) -> Self {
        match err {
            FanOutError::AgentFailed { agent, source } => PipelineError::AgentFailed { agent, source },
            FanOutError::Timeout(limit) => PipelineError::Timeout(limit),
        }
    }
}

/// Settings the pipeline is built from.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub weights: GradingWeights,
    pub rules: Vec<ScoringRule>,
    pub failure_policy: FailurePolicy,
    pub timeout: Option<Duration>,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            weights: config.grading,
            rules: config.scoring.rules.clone(),
            failure_policy: config.pipeline.on_agent_failure,
            timeout: config.pipeline.timeout_seconds.map(Duration::from_secs),
        }
    }
}

/// Runs agents, grades their results and assembles the report.
#[derive(Debug)]
pub struct Pipeline {
    registry: AgentRegistry,
    runner: FanOutRunner,
    grader: Grader,
}

impl Pipeline {
    pub fn new(registry: AgentRegistry, config: PipelineConfig) -> Self {
        Self {
            registry,
            runner: FanOutRunner::new(config.failure_policy, config.timeout),
            grader: Grader::new(config.rules, config.weights),
        }
    }

    /// Build the pipeline with the default agent set for `config`.
    ///
    /// Live registry agents are appended when `sources.enabled` is set.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let mut registry = domain::default_registry();

        if config.sources.enabled {
            sources::register_sources(&mut registry, SourceSettings::from(&config.sources))?;
        }

        Ok(Self::new(registry, PipelineConfig::from(config)))
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Execute one run for `request`.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, PipelineError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        log_stage(&run_id, PipelineStage::Received);
        debug!("Request: {:?}", request);

        let results = self
            .runner
            .run(&self.registry, request)
            .await
            .map_err(|err| {
                error!("Run {} aborted during fan-out: {}", run_id, err);
                PipelineError::from(err)
            })?;
        log_stage(&run_id, PipelineStage::FannedOut);

        let grading = self.grader.grade(&results);
        log_stage(&run_id, PipelineStage::Graded);

        let report_content = report::generate_report(request, &grading, &results);
        log_stage(&run_id, PipelineStage::Reported);

        // Persistence or export hooks belong here.

        log_stage(&run_id, PipelineStage::Completed);
        info!(
            "Run {} completed in {:.2}s: overall {:.3} from {} agents",
            run_id,
            started.elapsed().as_secs_f64(),
            grading.overall_score,
            results.len()
        );

        Ok(AnalysisResponse {
            run_id,
            grading,
            results,
            report_content,
            status: RunStatus::Completed,
            generated_at: Utc::now(),
        })
    }
}

fn log_stage(run_id: &str, stage: PipelineStage) {
    info!("Run {} -> {}", run_id, stage);
}
