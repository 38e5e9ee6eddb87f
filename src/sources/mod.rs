//! Live registry agents.
//!
//! These agents query public registries (ClinicalTrials.gov, openFDA,
//! PubMed, Open Targets) for the requested molecule and indication. They are
//! opt-in and are registered after the simulated agents.
//!
//! A failed or skipped lookup never fails the agent. The affected fields are
//! recorded as `null` (or an empty list) and the summary says why.

pub mod clinical_trials;
pub mod open_fda;
pub mod pubmed;

use crate::agent::{AgentError, AgentRegistry};
use crate::models::RawData;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub use clinical_trials::ClinicalTrialsRegistryAgent;
pub use open_fda::OpenFdaMarketAgent;
pub use pubmed::PubMedLiteratureAgent;

/// Endpoints and limits for registry lookups.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub clinical_trials_url: String,
    pub open_fda_url: String,
    pub pubmed_url: String,
    pub open_targets_url: String,
    pub timeout: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::from(&crate::config::SourcesConfig::default())
    }
}

impl From<&crate::config::SourcesConfig> for SourceSettings {
    fn from(config: &crate::config::SourcesConfig) -> Self {
        Self {
            clinical_trials_url: config.clinical_trials_url.clone(),
            open_fda_url: config.open_fda_url.trim_end_matches('/').to_string(),
            pubmed_url: config.pubmed_url.clone(),
            open_targets_url: config.open_targets_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

/// HTTP client shared by the registry agents.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http_client: Client,
    settings: SourceSettings,
}

impl SourceClient {
    pub fn new(settings: SourceSettings) -> Result<Self, AgentError> {
        let http_client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("genopp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// GET `url` with query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AgentError> {
        debug!("GET {} {:?}", url, query);

        let response = self.http_client.get(url).query(query).send().await?;
        decode(url, response).await
    }

    /// POST a JSON body to `url` and decode the JSON response.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, AgentError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);

        let response = self.http_client.post(url).json(body).send().await?;
        decode(url, response).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, AgentError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AgentError::UnexpectedResponse(format!(
            "HTTP {} from {}: {}",
            status,
            url,
            body.chars().take(200).collect::<String>()
        )));
    }

    Ok(response.json::<T>().await?)
}

/// Append the three registry agents to `registry`, sharing one client.
pub fn register_sources(
    registry: &mut AgentRegistry,
    settings: SourceSettings,
) -> Result<(), AgentError> {
    let client = Arc::new(SourceClient::new(settings)?);

    registry
        .register(ClinicalTrialsRegistryAgent::new(client.clone()))
        .register(OpenFdaMarketAgent::new(client.clone()))
        .register(PubMedLiteratureAgent::new(client));

    info!("Live registry sources enabled");
    Ok(())
}

/// Raw data for a lookup that was not attempted: every field is `null`.
pub(crate) fn skipped(reason: &str, fields: &[&str]) -> RawData {
    let mut raw_data: RawData = fields
        .iter()
        .map(|f| (f.to_string(), Value::Null))
        .collect();
    raw_data.insert("skipped".to_string(), json!(reason));
    raw_data
}

/// Trim and drop empty or placeholder values.
pub(crate) fn usable_term(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

/// Settings pointing every source at a closed local port.
#[cfg(test)]
pub(crate) fn unreachable_settings() -> SourceSettings {
    SourceSettings {
        clinical_trials_url: "http://127.0.0.1:1/studies".to_string(),
        open_fda_url: "http://127.0.0.1:1/drug".to_string(),
        pubmed_url: "http://127.0.0.1:1/esearch.fcgi".to_string(),
        open_targets_url: "http://127.0.0.1:1/graphql".to_string(),
        timeout: Duration::from_secs(2),
    }
}
