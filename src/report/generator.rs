//! Narrative report generation.
//!
//! This module turns the grading breakdown and every agent's summary into a
//! plain-text opportunity report. Generation is pure: the same inputs always
//! produce the same text.

use crate::models::{AgentResult, AnalysisRequest, AnalysisResponse, GradingBreakdown, ScoreGroup};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Title subject when the request names no molecule.
pub const FALLBACK_MOLECULE: &str = "Selected Molecule";

/// Conclusion band of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConclusionTier {
    HighlyAttractive,
    ModeratelyAttractive,
    LimitedAttractiveness,
}

impl ConclusionTier {
    /// Lower bound (inclusive) of the highly attractive tier.
    pub const HIGH_THRESHOLD: f64 = 0.75;
    /// Lower bound (inclusive) of the moderately attractive tier.
    pub const MODERATE_THRESHOLD: f64 = 0.55;

    pub fn from_score(overall: f64) -> Self {
        if overall >= Self::HIGH_THRESHOLD {
            ConclusionTier::HighlyAttractive
        } else if overall >= Self::MODERATE_THRESHOLD {
            ConclusionTier::ModeratelyAttractive
        } else {
            ConclusionTier::LimitedAttractiveness
        }
    }

    /// Conclusion paragraph for this tier.
    pub fn message(&self) -> &'static str {
        match self {
            ConclusionTier::HighlyAttractive => {
                "The molecule presents a highly attractive opportunity for generic manufacturing, \
                 with strong scores across most dimensions."
            }
            ConclusionTier::ModeratelyAttractive => {
                "The molecule presents a moderately attractive opportunity. \
                 It can be considered with further due diligence on weaker dimensions."
            }
            ConclusionTier::LimitedAttractiveness => {
                "The molecule currently appears to have limited attractiveness for generic \
                 manufacturing. Significant risks or constraints have been identified."
            }
        }
    }
}

impl fmt::Display for ConclusionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConclusionTier::HighlyAttractive => write!(f, "Highly attractive"),
            ConclusionTier::ModeratelyAttractive => write!(f, "Moderately attractive"),
            ConclusionTier::LimitedAttractiveness => write!(f, "Limited attractiveness"),
        }
    }
}

/// Generate the complete report.
pub fn generate_report(
    request: &AnalysisRequest,
    grading: &GradingBreakdown,
    results: &[AgentResult],
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.extend(generate_title(request));
    lines.extend(generate_executive_summary(grading));
    lines.extend(generate_agent_insights(results));
    lines.extend(generate_conclusion(grading.overall_score));

    lines.join("\n")
}

/// Format a 0-1 score on a 100 point scale.
pub fn format_score(score: f64) -> String {
    format!("{:.1} / 100", score * 100.0)
}

fn generate_title(request: &AnalysisRequest) -> Vec<String> {
    let title = format!(
        "Generic Opportunity Report for {}",
        request.molecule_or(FALLBACK_MOLECULE)
    );
    let underline = "=".repeat(title.chars().count());

    vec![title, underline, String::new()]
}

fn generate_executive_summary(grading: &GradingBreakdown) -> Vec<String> {
    let mut section = vec!["1. Executive Summary".to_string()];

    section.push(format!(
        "- Overall feasibility grade: {}",
        format_score(grading.overall_score)
    ));
    for group in ScoreGroup::ALL {
        section.push(format!(
            "- {}: {}",
            group.label(),
            format_score(grading.group(group))
        ));
    }
    section.push(String::new());

    section
}

fn generate_agent_insights(results: &[AgentResult]) -> Vec<String> {
    let mut section = vec!["2. Detailed Agent Insights".to_string()];

    for (idx, result) in results.iter().enumerate() {
        section.push(format!("{}. {}", idx + 1, result.agent_name));
        section.push("-".repeat(result.agent_name.chars().count() + 3));
        section.push(result.summary.clone());
        section.push(String::new());
    }

    section
}

fn generate_conclusion(overall: f64) -> Vec<String> {
    vec![
        "3. Conclusion".to_string(),
        ConclusionTier::from_score(overall).message().to_string(),
    ]
}

/// Generate a JSON document of the full response.
pub fn generate_json_report(response: &AnalysisResponse) -> Result<String> {
    serde_json::to_string_pretty(response).map_err(Into::into)
}

/// Write report output to a file.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawData, RunStatus};
    use chrono::Utc;

    fn create_test_grading(overall_score: f64) -> GradingBreakdown {
        GradingBreakdown {
            market_demand: 0.82,
            production_feasibility: 0.5,
            demographics: 0.5,
            patents_and_trials: 0.5,
            competition: 0.5,
            overall_score,
        }
    }

    fn create_test_results() -> Vec<AgentResult> {
        vec![
            AgentResult::new("IQVIAInsights", "Strong demand.", RawData::new()),
            AgentResult::new("WebIntelligenceAgent", "Positive sentiment.", RawData::new()),
        ]
    }

    #[test]
    fn test_generate_report_layout() {
        let request = AnalysisRequest::new("q").with_molecule("Metformin");
        let report = generate_report(&request, &create_test_grading(0.58), &create_test_results());

        let expected = "\
Generic Opportunity Report for Metformin
========================================

1. Executive Summary
- Overall feasibility grade: 58.0 / 100
- Market Demand: 82.0 / 100
- Production Feasibility: 50.0 / 100
- Demographic Fit: 50.0 / 100
- Patents & Trials: 50.0 / 100
- Competition Landscape: 50.0 / 100

2. Detailed Agent Insights
1. IQVIAInsights
----------------
Strong demand.

2. WebIntelligenceAgent
-----------------------
Positive sentiment.

3. Conclusion
The molecule presents a moderately attractive opportunity. It can be considered with further due diligence on weaker dimensions.";

        assert_eq!(report, expected);
    }

    #[test]
    fn test_title_fallback() {
        let report = generate_report(&AnalysisRequest::new("q"), &create_test_grading(0.5), &[]);
        assert!(report.starts_with("Generic Opportunity Report for Selected Molecule\n"));
        assert!(report.contains("2. Detailed Agent Insights\n3. Conclusion"));
    }

    #[test]
    fn test_conclusion_tier_boundaries() {
        assert_eq!(ConclusionTier::from_score(0.75), ConclusionTier::HighlyAttractive);
        assert_eq!(ConclusionTier::from_score(0.93), ConclusionTier::HighlyAttractive);
        assert_eq!(ConclusionTier::from_score(0.7499), ConclusionTier::ModeratelyAttractive);
        assert_eq!(ConclusionTier::from_score(0.55), ConclusionTier::ModeratelyAttractive);
        assert_eq!(ConclusionTier::from_score(0.549999), ConclusionTier::LimitedAttractiveness);
        assert_eq!(ConclusionTier::from_score(0.0), ConclusionTier::LimitedAttractiveness);
    }

    #[test]
    fn test_conclusion_text_per_tier() {
        let request = AnalysisRequest::new("q");
        let high = generate_report(&request, &create_test_grading(0.75), &[]);
        let limited = generate_report(&request, &create_test_grading(0.549999), &[]);

        assert!(high.ends_with(ConclusionTier::HighlyAttractive.message()));
        assert!(high.contains("highly attractive opportunity"));
        assert!(limited.contains("limited attractiveness"));
    }

    #[test]
    fn test_format_score_rounds_to_one_decimal() {
        assert_eq!(format_score(0.58), "58.0 / 100");
        assert_eq!(format_score(0.7234), "72.3 / 100");
        assert_eq!(format_score(1.0), "100.0 / 100");
    }

    #[test]
    fn test_report_is_deterministic() {
        let request = AnalysisRequest::new("q").with_molecule("Atorvastatin");
        let grading = create_test_grading(0.61);
        let results = create_test_results();

        assert_eq!(
            generate_report(&request, &grading, &results),
            generate_report(&request, &grading, &results)
        );
    }

    #[test]
    fn test_generate_json_report() {
        let response = AnalysisResponse {
            run_id: "run-42".to_string(),
            grading: create_test_grading(0.58),
            results: create_test_results(),
            report_content: "report".to_string(),
            status: RunStatus::Completed,
            generated_at: Utc::now(),
        };
        let json = generate_json_report(&response).unwrap();

        assert!(json.contains("\"run_id\": \"run-42\""));
        assert!(json.contains("\"overall_score\""));
        assert!(json.contains("\"status\": \"COMPLETED\""));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_report(&path, "content").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }
}
