//! Demographic and competitive landscape agents.

use super::raw_data;
use crate::agent::{Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest};
use async_trait::async_trait;
use serde_json::json;

simulated_agent!(
    /// Disease burden and access fit in key markets.
    DemographicAgent
);

#[async_trait]
impl Agent for DemographicAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("disease_burden_score", json!(0.85)),
            ("age_distribution_fit_score", json!(0.8)),
            ("access_affordability_score", json!(0.75)),
            ("demographic_overall_score", json!(0.8)),
        ]);

        let summary = "Demographic analysis indicates a high disease burden with good alignment \
                       to target age groups and reasonable affordability potential in emerging \
                       and developed markets.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

simulated_agent!(
    /// Generic competition intensity and price erosion.
    CompetitionAgent
);

#[async_trait]
impl Agent for CompetitionAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("number_of_generic_players", json!(6)),
            // higher = more price pressure
            ("price_erosion_score", json!(0.6)),
            ("differentiation_potential_score", json!(0.7)),
            // higher = more favourable
            ("competition_overall_score", json!(0.55)),
        ]);

        let summary = "Competition analysis shows multiple generic players and moderate price \
                       erosion, but there is still room for differentiation via cost, quality or \
                       supply reliability.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}
