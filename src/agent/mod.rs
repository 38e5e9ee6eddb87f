//! Agent capability interface and concurrent execution.
//!
//! An agent turns an [`AnalysisRequest`] into exactly one [`AgentResult`].
//! Agents are registered in an [`AgentRegistry`] and executed together by
//! the [`FanOutRunner`].

pub mod registry;
pub mod runner;

use crate::models::{AgentResult, AnalysisRequest};
use async_trait::async_trait;
use thiserror::Error;

pub use registry::AgentRegistry;
pub use runner::{FailurePolicy, FanOutError, FanOutRunner};

/// Failure of a single agent run.
///
/// "No data" is not a failure: agents encode absence in their raw data
/// and summary instead of returning an error.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("{0}")]
    Failed(String),
}

/// A unit of analysis run against every request.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier. Score groups are matched against it, so it must
    /// not change once the agent is registered.
    fn name(&self) -> &str;

    /// Produce this agent's result for `request`.
    async fn run(&self, request: &AnalysisRequest) -> Result<AgentResult, AgentError>;
}

/// Short type name of `T`, used as the default agent name.
pub fn default_agent_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
