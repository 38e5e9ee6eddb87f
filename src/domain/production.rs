//! Production and chemical engineering agents.

use super::raw_data;
use crate::agent::{Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest};
use async_trait::async_trait;
use serde_json::json;

simulated_agent!(
    /// Process complexity, scalability and continuous manufacturing fit.
    ProcessDesignAgent
);

#[async_trait]
impl Agent for ProcessDesignAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            // higher = more complex
            ("process_complexity_score", json!(0.65)),
            ("scalability_score", json!(0.8)),
            ("continuous_manufacturing_fit", json!(0.7)),
            ("production_feasibility_score", json!(0.76)),
        ]);

        let summary = "Process design assessment indicates moderate complexity but good \
                       scalability potential. The molecule is reasonably suited for continuous \
                       manufacturing with appropriate optimisation.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

const PAYBACK_PERIOD_YEARS: f64 = 4.5;
const INTERNAL_RATE_OF_RETURN: f64 = 0.23;

simulated_agent!(
    /// Plant CAPEX/OPEX and return estimates.
    TechnoEconomicAgent
);

#[async_trait]
impl Agent for TechnoEconomicAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("capex_million_usd", json!(25.0)),
            ("opex_million_usd_per_year", json!(6.0)),
            ("payback_period_years", json!(PAYBACK_PERIOD_YEARS)),
            ("internal_rate_of_return", json!(INTERNAL_RATE_OF_RETURN)),
            ("production_feasibility_score", json!(0.81)),
        ]);

        let summary = format!(
            "Techno-economic analysis suggests acceptable CAPEX and OPEX with a payback period \
             of {} years and an IRR of {}%, indicating strong economic feasibility for plant \
             investment.",
            PAYBACK_PERIOD_YEARS,
            (INTERNAL_RATE_OF_RETURN * 100.0) as i64
        );

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_techno_economic_summary() {
        let result = TechnoEconomicAgent::default()
            .run(&AnalysisRequest::new("q"))
            .await
            .unwrap();
        assert!(result.summary.contains("payback period of 4.5 years"));
        assert!(result.summary.contains("IRR of 23%"));
        assert_eq!(result.score_field("production_feasibility_score"), Some(0.81));
    }

    #[tokio::test]
    async fn test_process_design_score() {
        let result = ProcessDesignAgent::default()
            .run(&AnalysisRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(result.agent_name, "ProcessDesignAgent");
        assert_eq!(result.score_field("production_feasibility_score"), Some(0.76));
    }
}
