//! Knowledge agents. Their signals are informational and carry no score fields.

use super::raw_data;
use crate::agent::{Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest};
use async_trait::async_trait;
use serde_json::json;

simulated_agent!(
    /// General web and literature sentiment.
    WebIntelligenceAgent
);

#[async_trait]
impl Agent for WebIntelligenceAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("sentiment_score", json!(0.74)),
            (
                "key_themes",
                json!(["cost pressure", "supply chain resilience", "regulatory scrutiny"]),
            ),
        ]);

        let summary = "Web and literature signals highlight positive sentiment around generic \
                       entry, with themes focused on cost savings and supply resilience.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

simulated_agent!(
    /// Internal portfolio and capability alignment.
    InternalKnowledgeAgent
);

#[async_trait]
impl Agent for InternalKnowledgeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("manufacturing_capability_fit_score", json!(0.83)),
            ("portfolio_synergy_score", json!(0.78)),
            ("historical_success_in_therapy_area", json!(true)),
        ]);

        let summary = "Internal capability assessment suggests strong fit with existing \
                       manufacturing know-how and good synergy with the current portfolio in \
                       this therapy area.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}
