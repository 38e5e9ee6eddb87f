//! Market, sales and demand agents.

use super::raw_data;
use crate::agent::{Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest};
use async_trait::async_trait;
use serde_json::json;

const MARKET_SIZE_BILLION_USD: f64 = 1.8;
const CAGR: f64 = 0.09;
const KEY_REGIONS: [&str; 3] = ["US", "EU5", "India"];

simulated_agent!(
    /// IQVIA-style market sizing and growth insights.
    IQVIAInsightsAgent
);

#[async_trait]
impl Agent for IQVIAInsightsAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let molecule = request.molecule_or("the molecule");
        let indication = request.indication_or("the indication");

        let data = raw_data([
            ("estimated_market_size_billion_usd", json!(MARKET_SIZE_BILLION_USD)),
            ("cagr", json!(CAGR)),
            ("key_regions", json!(KEY_REGIONS)),
            ("market_demand_score", json!(0.82)),
        ]);

        let summary = format!(
            "For {} in {}, the estimated global market size is ~${}B with ~{}% CAGR. \
             Strong demand is observed in {}.",
            molecule,
            indication,
            MARKET_SIZE_BILLION_USD,
            (CAGR * 100.0) as i64,
            KEY_REGIONS.join(", ")
        );

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

simulated_agent!(
    /// Export/import trade trends.
    EXIMTrendAgent
);

#[async_trait]
impl Agent for EXIMTrendAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            // lower is better
            ("import_dependency_score", json!(0.3)),
            ("export_opportunity_score", json!(0.75)),
            ("overall_market_demand_score", json!(0.78)),
        ]);

        let summary = "EXIM analysis suggests moderate import dependency and strong export \
                       opportunities, indicating a favourable landscape for generic manufacturing.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}
