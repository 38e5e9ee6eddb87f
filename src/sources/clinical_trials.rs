//! Recruiting studies from the ClinicalTrials.gov v2 API.

use super::{skipped, usable_term, SourceClient};
use crate::agent::{default_agent_name, Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest, RawData};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

const PAGE_SIZE: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct StudiesResponse {
    #[serde(default)]
    pub studies: Vec<Study>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    #[serde(default)]
    pub protocol_section: ProtocolSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSection {
    #[serde(default)]
    pub identification_module: IdentificationModule,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationModule {
    pub official_title: Option<String>,
    pub brief_title: Option<String>,
}

impl Study {
    /// Official title, falling back to the brief title.
    pub fn title(&self) -> &str {
        let ident = &self.protocol_section.identification_module;
        ident
            .official_title
            .as_deref()
            .or(ident.brief_title.as_deref())
            .unwrap_or("No Title")
    }
}

/// Looks up currently recruiting trials for the molecule and indication.
pub struct ClinicalTrialsRegistryAgent {
    name: String,
    client: Arc<SourceClient>,
}

impl ClinicalTrialsRegistryAgent {
    pub fn new(client: Arc<SourceClient>) -> Self {
        Self {
            name: default_agent_name::<Self>(),
            client,
        }
    }
}

/// Search term from molecule and indication, or `None` without a molecule.
pub fn search_term(request: &AnalysisRequest) -> Option<String> {
    let molecule = usable_term(request.molecule_name.as_deref())?;
    Some(match usable_term(request.target_indication.as_deref()) {
        Some(indication) => format!("{} {}", molecule, indication),
        None => molecule.to_string(),
    })
}

/// Build the agent result for a registry response.
pub fn summarize(agent_name: &str, term: &str, response: &StudiesResponse) -> AgentResult {
    let titles: Vec<&str> = response.studies.iter().map(Study::title).collect();

    let mut raw_data = RawData::new();
    raw_data.insert("search_term".to_string(), json!(term));
    raw_data.insert("recruiting_trials_count".to_string(), json!(titles.len()));
    raw_data.insert("trial_titles".to_string(), json!(titles));

    let summary = if titles.is_empty() {
        format!("No active trials found for {}.", term)
    } else {
        let listing: Vec<String> = titles.iter().map(|t| format!("- {}", t)).collect();
        format!(
            "Recruiting trials for {}:\n{}",
            term,
            listing.join("\n")
        )
    };

    AgentResult::new(agent_name, summary, raw_data)
}

/// Result for a registry lookup that did not complete.
pub fn lookup_failed(agent_name: &str, term: &str, err: &AgentError) -> AgentResult {
    let mut raw_data = RawData::new();
    raw_data.insert("search_term".to_string(), json!(term));
    raw_data.insert("recruiting_trials_count".to_string(), Value::Null);
    raw_data.insert("trial_titles".to_string(), json!([]));
    raw_data.insert("lookup_error".to_string(), json!(err.to_string()));

    AgentResult::new(
        agent_name,
        format!("Error fetching trials for {}: {}", term, err),
        raw_data,
    )
}

#[async_trait]
impl Agent for ClinicalTrialsRegistryAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let Some(term) = search_term(request) else {
            return Ok(AgentResult::new(
                &self.name,
                "No specific trials found (missing molecule name).",
                skipped("missing molecule name", &["recruiting_trials_count"]),
            ));
        };

        let query = [
            ("query.term", term.clone()),
            ("filter.overallStatus", "RECRUITING".to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
        ];
        match self
            .client
            .get_json::<StudiesResponse>(&self.client.settings().clinical_trials_url, &query)
            .await
        {
            Ok(response) => Ok(summarize(&self.name, &term, &response)),
            Err(e) => {
                warn!("ClinicalTrials.gov lookup failed: {}", e);
                Ok(lookup_failed(&self.name, &term, &e))
            }
        }
    }
}
