//! Simulated domain agents.
//!
//! These agents return fixed heuristic signals for any request. They stand
//! in for real market, production, patent, demographic, competition and
//! knowledge sources and define the default agent set.

/// Declares a simulated agent struct with a stable, overridable name.
macro_rules! simulated_agent {
    ($(#[$meta:meta])* $agent:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $agent {
            name: String,
        }

        impl Default for $agent {
            fn default() -> Self {
                Self {
                    name: $crate::agent::default_agent_name::<Self>(),
                }
            }
        }

        impl $agent {
            /// Create the agent under a custom name.
            pub fn with_name(name: impl Into<String>) -> Self {
                Self { name: name.into() }
            }
        }
    };
}

pub mod knowledge;
pub mod landscape;
pub mod market;
pub mod patents;
pub mod production;

use crate::agent::AgentRegistry;
use crate::models::RawData;
use serde_json::Value;

pub use knowledge::{InternalKnowledgeAgent, WebIntelligenceAgent};
pub use landscape::{CompetitionAgent, DemographicAgent};
pub use market::{EXIMTrendAgent, IQVIAInsightsAgent};
pub use patents::{ClinicalTrialAgent, PatentLandscapeAgent};
pub use production::{ProcessDesignAgent, TechnoEconomicAgent};

/// Registry with the ten simulated agents in their canonical order.
pub fn default_registry() -> AgentRegistry {
    AgentRegistry::new()
        .with(IQVIAInsightsAgent::default())
        .with(EXIMTrendAgent::default())
        .with(ProcessDesignAgent::default())
        .with(TechnoEconomicAgent::default())
        .with(PatentLandscapeAgent::default())
        .with(ClinicalTrialAgent::default())
        .with(DemographicAgent::default())
        .with(CompetitionAgent::default())
        .with(WebIntelligenceAgent::default())
        .with(InternalKnowledgeAgent::default())
}

/// Build raw data from `(field, value)` pairs.
pub(crate) fn raw_data<const N: usize>(fields: [(&str, Value); N]) -> RawData {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisRequest;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry();
        assert_eq!(
            registry.names(),
            vec![
                "IQVIAInsightsAgent",
                "EXIMTrendAgent",
                "ProcessDesignAgent",
                "TechnoEconomicAgent",
                "PatentLandscapeAgent",
                "ClinicalTrialAgent",
                "DemographicAgent",
                "CompetitionAgent",
                "WebIntelligenceAgent",
                "InternalKnowledgeAgent",
            ]
        );
    }

    #[tokio::test]
    async fn test_every_agent_reports_under_its_name() {
        let registry = default_registry();
        let request = AnalysisRequest::new("Assess").with_molecule("Metformin");

        for agent in registry.agents() {
            let result = agent.run(&request).await.unwrap();
            assert_eq!(result.agent_name, agent.name());
            assert!(!result.summary.is_empty());
            assert!(!result.raw_data.is_empty());
        }
    }
}
