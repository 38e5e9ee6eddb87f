//! Concurrent fan-out of one request to every registered agent.
//!
//! All agents are polled concurrently on the calling task. Results are
//! returned in registration order, never in completion order.

use super::{Agent, AgentError, AgentRegistry};
use crate::models::{AgentResult, AnalysisRequest, RawData};
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// What to do when an agent fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole fan-out on the first failure. In-flight agents are dropped.
    #[default]
    Abort,
    /// Replace the failed agent's result with a degraded one and carry on.
    Degrade,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Degrade => write!(f, "degrade"),
        }
    }
}

/// Fan-out failure. No partial results survive it.
#[derive(Debug, Error)]
pub enum FanOutError {
    #[error("agent {agent} failed: {source}")]
    AgentFailed {
        agent: String,
        #[source]
        source: AgentError,
    },

    #[error("agents did not finish within {0:?}")]
    Timeout(Duration),
}

/// Runs every agent of a registry against the same request.
#[derive(Debug, Clone, Default)]
pub struct FanOutRunner {
    policy: FailurePolicy,
    timeout: Option<Duration>,
}

impl FanOutRunner {
    pub fn new(policy: FailurePolicy, timeout: Option<Duration>) -> Self {
        Self { policy, timeout }
    }

    /// Run all agents and wait for every one of them.
    ///
    /// The optional timeout is a single deadline for the whole fan-out.
    pub async fn run(
        &self,
        registry: &AgentRegistry,
        request: &AnalysisRequest,
    ) -> Result<Vec<AgentResult>, FanOutError> {
        debug!(
            "Fanning out to {} agents (policy: {})",
            registry.len(),
            self.policy
        );

        let fan_out = self.execute(registry, request);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fan_out)
                .await
                .map_err(|_| FanOutError::Timeout(limit))?,
            None => fan_out.await,
        }
    }

    async fn execute(
        &self,
        registry: &AgentRegistry,
        request: &AnalysisRequest,
    ) -> Result<Vec<AgentResult>, FanOutError> {
        let agents = registry.agents();

        match self.policy {
            FailurePolicy::Abort => {
                try_join_all(agents.iter().map(|agent| run_agent(agent.as_ref(), request))).await
            }
            FailurePolicy::Degrade => {
                let outcomes =
                    join_all(agents.iter().map(|agent| run_agent(agent.as_ref(), request))).await;

                Ok(outcomes
                    .into_iter()
                    .zip(agents)
                    .map(|(outcome, agent)| {
                        outcome.unwrap_or_else(|err| {
                            warn!("Degrading result of {}: {}", agent.name(), err);
                            degraded_result(agent.name(), &err)
                        })
                    })
                    .collect())
            }
        }
    }
}

async fn run_agent(agent: &dyn Agent, request: &AnalysisRequest) -> Result<AgentResult, FanOutError> {
    let started = Instant::now();

    let result = agent
        .run(request)
        .await
        .map_err(|source| FanOutError::AgentFailed {
            agent: agent.name().to_string(),
            source,
        })?;

    if result.summary.trim().is_empty() {
        warn!("Agent {} returned an empty summary", agent.name());
    }
    debug!(
        "Agent {} finished in {}ms with {} signals",
        agent.name(),
        started.elapsed().as_millis(),
        result.raw_data.len()
    );

    Ok(result)
}

/// Stand-in result for a failed agent. Carries no score fields.
pub fn degraded_result(agent_name: &str, err: &FanOutError) -> AgentResult {
    let reason = match err {
        FanOutError::AgentFailed { source, .. } => source.to_string(),
        other => other.to_string(),
    };

    let mut raw_data = RawData::new();
    raw_data.insert("degraded".to_string(), Value::Bool(true));

    AgentResult::new(
        agent_name,
        format!("{} could not complete: {}", agent_name, reason),
        raw_data,
    )
}
