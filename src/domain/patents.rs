//! Patent and clinical trial agents.

use super::raw_data;
use crate::agent::{Agent, AgentError};
use crate::models::{AgentResult, AnalysisRequest};
use async_trait::async_trait;
use serde_json::json;

simulated_agent!(
    /// Freedom-to-operate estimate from the patent landscape.
    PatentLandscapeAgent
);

#[async_trait]
impl Agent for PatentLandscapeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("primary_patents_expired", json!(true)),
            // risk scores: higher = more risk
            ("secondary_patent_risk_score", json!(0.35)),
            ("litigation_risk_score", json!(0.25)),
            // higher = safer
            ("patent_overall_score", json!(0.72)),
        ]);

        let summary = "Patent landscape analysis indicates that core patents are largely expired \
                       with manageable secondary and litigation risks, suggesting reasonable \
                       freedom to operate.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

simulated_agent!(
    /// Ongoing trials and label expansion potential.
    ClinicalTrialAgent
);

#[async_trait]
impl Agent for ClinicalTrialAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _request: &AnalysisRequest) -> Result<AgentResult, AgentError> {
        let data = raw_data([
            ("ongoing_trials_count", json!(12)),
            ("indication_expansion_potential_score", json!(0.7)),
            ("safety_signal_risk_score", json!(0.2)),
            ("patents_and_trials_score", json!(0.68)),
        ]);

        let summary = "Clinical trial activity is healthy with multiple ongoing studies and \
                       limited safety concerns, supporting sustainable long-term demand for the \
                       molecule.";

        Ok(AgentResult::new(&self.name, summary, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_patent_flags_are_not_scores() {
        let result = PatentLandscapeAgent::default()
            .run(&AnalysisRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(result.raw_data["primary_patents_expired"], json!(true));
        assert_eq!(result.score_field("primary_patents_expired"), None);
        assert_eq!(result.score_field("patent_overall_score"), Some(0.72));
    }

    #[tokio::test]
    async fn test_clinical_trial_score() {
        let result = ClinicalTrialAgent::default()
            .run(&AnalysisRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(result.score_field("patents_and_trials_score"), Some(0.68));
        assert_eq!(result.score_field("ongoing_trials_count"), Some(12.0));
    }
}
