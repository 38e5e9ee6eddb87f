//! Market signals from openFDA: labelers, approvals and adverse events.

use super::{skipped, usable_term, SourceClient};
use crate::agent::{default_agent_name, Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest, RawData};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct NdcResponse {
    #[serde(default)]
    pub results: Vec<NdcProduct>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NdcProduct {
    #[serde(default)]
    pub labeler_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsResponse {
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventCountResponse {
    #[serde(default)]
    pub results: Vec<EventCount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventCount {
    #[serde(default)]
    pub count: u64,
}

/// Distinct labelers across NDC product listings.
pub fn manufacturer_count(response: &NdcResponse) -> usize {
    response
        .results
        .iter()
        .map(|p| p.labeler_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Total adverse event reports across count buckets.
pub fn safety_report_total(response: &EventCountResponse) -> u64 {
    response.results.iter().map(|r| r.count).sum()
}

/// Counts gathered for one molecule. `None` means the lookup failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketCounts {
    pub manufacturers: Option<usize>,
    pub approvals: Option<usize>,
    pub safety_reports: Option<u64>,
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Build the agent result for gathered counts.
pub fn summarize(agent_name: &str, molecule: &str, counts: &MarketCounts) -> AgentResult {
    let mut raw_data = RawData::new();
    raw_data.insert("manufacturers".to_string(), json!(counts.manufacturers));
    raw_data.insert("approvals".to_string(), json!(counts.approvals));
    raw_data.insert("safety_reports".to_string(), json!(counts.safety_reports));

    let summary = format!(
        "openFDA data for {}: {} manufacturers, {} FDA approvals, {} adverse event reports.",
        molecule,
        or_na(counts.manufacturers),
        or_na(counts.approvals),
        or_na(counts.safety_reports)
    );

    AgentResult::new(agent_name, summary, raw_data)
}

/// Queries openFDA for manufacturer, approval and safety counts.
pub struct OpenFdaMarketAgent {
    name: String,
    client: Arc<SourceClient>,
}

impl OpenFdaMarketAgent {
    pub fn new(client: Arc<SourceClient>) -> Self {
        Self {
            name: default_agent_name::<Self>(),
            client,
        }
    }

    fn endpoint(&self, dataset: &str) -> String {
        format!("{}/{}.json", self.client.settings().open_fda_url, dataset)
    }

    async fn lookup<T: serde::de::DeserializeOwned>(
        &self,
        dataset: &str,
        query: &[(&str, String)],
    ) -> Option<T> {
        match self.client.get_json::<T>(&self.endpoint(dataset), query).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("openFDA {} lookup failed: {}", dataset, e);
                None
            }
        }
    }
}

#[async_trait]
impl Agent for OpenFdaMarketAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let Some(molecule) = usable_term(request.molecule_name.as_deref()) else {
            return Ok(AgentResult::new(
                &self.name,
                "No openFDA market data (missing molecule name).",
                skipped(
                    "missing molecule name",
                    &["manufacturers", "approvals", "safety_reports"],
                ),
            ));
        };

        let ndc_query = [
            ("search", format!("active_ingredient:{}", molecule)),
            ("limit", "100".to_string()),
        ];
        let approvals_query = [
            ("search", format!("products.active_ingredients.name:{}", molecule)),
            ("limit", "50".to_string()),
        ];
        let events_query = [
            ("search", format!("patient.drug.medicinalproduct:{}", molecule)),
            ("count", "patient.drug.medicinalproduct.exact".to_string()),
        ];

        let (ndc, approvals, events) = tokio::join!(
            self.lookup::<NdcResponse>("ndc", &ndc_query),
            self.lookup::<ApplicationsResponse>("drugsfda", &approvals_query),
            self.lookup::<EventCountResponse>("event", &events_query),
        );

        let counts = MarketCounts {
            manufacturers: ndc.as_ref().map(manufacturer_count),
            approvals: approvals.map(|a| a.results.len()),
            safety_reports: events.as_ref().map(safety_report_total),
        };

        Ok(summarize(&self.name, molecule, &counts))
    }
}
