//! Disease context for an indication: PubMed research intensity and
//! Open Targets gene associations.

use super::{skipped, usable_term, SourceClient};
use crate::agent::{default_agent_name, Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest, RawData};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const GENE_LIMIT: usize = 5;

const GENE_SEARCH_QUERY: &str = "query GeneSearch($queryString: String!, $size: Int!) { \
     search(queryString: $queryString, entityNames: [\"target\"], page: {index: 0, size: $size}) \
     { hits { id name } } }";

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub esearchresult: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResult {
    /// E-utilities returns the count as a string.
    pub count: Option<String>,
}

impl SearchResponse {
    pub fn publication_count(&self) -> Option<u64> {
        self.esearchresult
            .count
            .as_deref()
            .and_then(|c| c.trim().parse().ok())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneSearchResponse {
    #[serde(default)]
    pub data: Option<GeneSearchData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneSearchData {
    #[serde(default)]
    pub search: GeneSearchHits,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneSearchHits {
    #[serde(default)]
    pub hits: Vec<GeneHit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneHit {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl GeneSearchResponse {
    /// Target identifiers in ranking order.
    pub fn gene_ids(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|d| d.search.hits.iter().map(|h| h.id.clone()).collect())
            .unwrap_or_default()
    }
}

/// Counts PubMed publications and lists associated genes for the target
/// indication.
pub struct PubMedLiteratureAgent {
    name: String,
    client: Arc<SourceClient>,
}

impl PubMedLiteratureAgent {
    pub fn new(client: Arc<SourceClient>) -> Self {
        Self {
            name: default_agent_name::<Self>(),
            client,
        }
    }

    async fn publications(&self, indication: &str) -> Option<u64> {
        let query = [
            ("db", "pubmed".to_string()),
            ("term", indication.to_string()),
            ("retmode", "json".to_string()),
        ];

        match self
            .client
            .get_json::<SearchResponse>(&self.client.settings().pubmed_url, &query)
            .await
        {
            Ok(response) => {
                let count = response.publication_count();
                if count.is_none() {
                    warn!("PubMed esearch result for {} has no count", indication);
                }
                count
            }
            Err(e) => {
                warn!("PubMed lookup failed: {}", e);
                None
            }
        }
    }

    async fn related_genes(&self, indication: &str) -> Vec<String> {
        let body = json!({
            "query": GENE_SEARCH_QUERY,
            "variables": {"queryString": indication, "size": GENE_LIMIT},
        });

        match self
            .client
            .post_json::<_, GeneSearchResponse>(&self.client.settings().open_targets_url, &body)
            .await
        {
            Ok(response) => response.gene_ids(),
            Err(e) => {
                warn!("Open Targets lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Build the agent result for gathered disease context.
pub fn summarize(
    agent_name: &str,
    indication: &str,
    publications: Option<u64>,
    related_genes: &[String],
) -> AgentResult {
    let mut raw_data = RawData::new();
    raw_data.insert("publications".to_string(), json!(publications));
    raw_data.insert("related_genes".to_string(), json!(related_genes));

    let mut summary = match publications {
        Some(count) => format!(
            "PubMed lists {} publications for {}, indicating {} research intensity.",
            count,
            indication,
            research_intensity(count)
        ),
        None => format!("PubMed publication count for {} is N/A.", indication),
    };
    if !related_genes.is_empty() {
        summary.push_str(&format!(
            " Key associated genes: {}.",
            related_genes.join(", ")
        ));
    }

    AgentResult::new(agent_name, summary, raw_data)
}

#[async_trait]
impl Agent for PubMedLiteratureAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let Some(indication) = usable_term(request.target_indication.as_deref()) else {
            let mut raw_data = skipped("missing target indication", &["publications"]);
            raw_data.insert("related_genes".to_string(), json!([]));
            return Ok(AgentResult::new(
                &self.name,
                "No literature search performed (missing target indication).",
                raw_data,
            ));
        };

        let (publications, related_genes) = tokio::join!(
            self.publications(indication),
            self.related_genes(indication),
        );

        Ok(summarize(&self.name, indication, publications, &related_genes))
    }
}

/// Coarse label for a publication count.
pub fn research_intensity(count: u64) -> &'static str {
    match count {
        0..=999 => "low",
        1_000..=49_999 => "moderate",
        _ => "high",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::unreachable_settings;
    use serde_json::Value;

    #[test]
    fn test_publication_count_parses_string() {
        let response: SearchResponse = serde_json::from_value(json!({
            "header": {"type": "esearch"},
            "esearchresult": {"count": "48213", "retmax": "20", "idlist": []}
        }))
        .unwrap();
        assert_eq!(response.publication_count(), Some(48213));
    }

    #[test]
    fn test_publication_count_missing() {
        let response: SearchResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.publication_count(), None);
    }

    #[test]
    fn test_research_intensity() {
        assert_eq!(research_intensity(12), "low");
        assert_eq!(research_intensity(48_213), "moderate");
        assert_eq!(research_intensity(250_000), "high");
    }

    #[test]
    fn test_gene_ids_from_search_hits() {
        let response: GeneSearchResponse = serde_json::from_value(json!({
            "data": {"search": {"hits": [
                {"id": "ENSG00000254647", "name": "INS"},
                {"id": "ENSG00000171105", "name": "INSR"}
            ]}}
        }))
        .unwrap();
        assert_eq!(
            response.gene_ids(),
            vec!["ENSG00000254647", "ENSG00000171105"]
        );

        let errored: GeneSearchResponse =
            serde_json::from_value(json!({"errors": [{"message": "bad query"}]})).unwrap();
        assert!(errored.gene_ids().is_empty());
    }

    #[test]
    fn test_summarize_with_genes() {
        let genes = vec!["ENSG00000254647".to_string()];
        let result = summarize("PubMedLiteratureAgent", "diabetes", Some(48_213), &genes);

        assert_eq!(result.raw_data["publications"], json!(48_213));
        assert_eq!(result.raw_data["related_genes"], json!(["ENSG00000254647"]));
        assert_eq!(
            result.summary,
            "PubMed lists 48213 publications for diabetes, indicating moderate research \
             intensity. Key associated genes: ENSG00000254647."
        );
    }

    #[tokio::test]
    async fn test_failed_lookups_are_recorded_not_raised() {
        let client = Arc::new(SourceClient::new(unreachable_settings()).unwrap());
        let agent = PubMedLiteratureAgent::new(client);
        let request = AnalysisRequest::new("q").with_indication("diabetes");

        let result = agent.run(&request).await.unwrap();

        assert_eq!(result.raw_data["publications"], Value::Null);
        assert_eq!(result.raw_data["related_genes"], json!([]));
        assert_eq!(result.summary, "PubMed publication count for diabetes is N/A.");
    }

    #[tokio::test]
    async fn test_missing_indication_skips_lookup() {
        let client = Arc::new(SourceClient::new(unreachable_settings()).unwrap());
        let agent = PubMedLiteratureAgent::new(client);

        let result = agent.run(&AnalysisRequest::new("q")).await.unwrap();

        assert_eq!(result.raw_data["publications"], Value::Null);
        assert_eq!(result.raw_data["related_genes"], json!([]));
        assert_eq!(result.raw_data["skipped"], json!("missing target indication"));
    }
}
