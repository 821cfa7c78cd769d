//! Core data models for the strategy report
//!
//! Every field is required. Serde rejects a missing or null field, which is
//! exactly the validation the generated payload needs: a report is either
//! complete or it is a `MalformedPayload`.

use crate::error::GenerationError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

/// Severity of an identified risk, labelled in the report's language.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskImpact {
    #[serde(rename = "Alto")]
    High,
    #[serde(rename = "Medio")]
    Medium,
    #[serde(rename = "Bajo")]
    Low,
}

impl RiskImpact {
    pub const LABELS: [&'static str; 3] = ["Alto", "Medio", "Bajo"];

    pub fn label(&self) -> &'static str {
        match self {
            RiskImpact::High => "Alto",
            RiskImpact::Medium => "Medio",
            RiskImpact::Low => "Bajo",
        }
    }
}

impl fmt::Display for RiskImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

//
// ================= Report =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyReport {
    pub company_name: String,
    pub executive_summary: String,
    pub business_alignment: BusinessAlignment,
    pub data_infrastructure: DataInfrastructure,
    pub talent_capabilities: TalentCapabilities,
    pub ethics_governance: EthicsGovernance,
    pub projected_growth: Vec<ChartPoint>,
}

//
// ================= Business Alignment =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAlignment {
    pub challenges: Vec<String>,
    pub goals: Vec<String>,
    pub kpis: Vec<Kpi>,
    pub high_impact_use_cases: Vec<UseCase>,
    pub roadmap: Vec<RoadmapPhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpi {
    pub name: String,
    pub current: String,
    pub target: String,
    pub metric: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UseCase {
    pub title: String,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoadmapPhase {
    pub phase: String,
    pub duration: String,
    pub focus: String,
    pub actions: Vec<String>,
}

//
// ================= Data & Infrastructure =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataInfrastructure {
    pub culture_plan: Vec<String>,
    pub infrastructure: Vec<InfrastructureComponent>,
    pub quality_measures: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureComponent {
    pub component: String,
    pub purpose: String,
}

//
// ================= Talent =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TalentCapabilities {
    pub roles_needed: Vec<String>,
    pub partnerships: Vec<String>,
    pub training_program: Vec<TrainingModule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingModule {
    pub module: String,
    pub audience: String,
}

//
// ================= Ethics & Governance =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EthicsGovernance {
    pub principles: Vec<String>,
    pub risks: Vec<RiskItem>,
    pub governance_process: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskItem {
    pub risk: String,
    pub impact: RiskImpact,
    pub mitigation: String,
}

//
// ================= Projection =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub month: String,
    pub revenue_baseline: f64,
    #[serde(rename = "revenueGenAI")]
    pub revenue_gen_ai: f64,
}

//
// ================= Parsing =================
//

/// Parse the model's raw text into a validated report.
///
/// Tolerates surrounding whitespace and a Markdown code fence. Blank text is
/// `EmptyResponse`; any syntax or shape error is `MalformedPayload`.
pub fn parse_report(raw: &str) -> Result<StrategyReport> {
    let cleaned = strip_code_fence(raw);

    if cleaned.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let report = serde_json::from_str::<StrategyReport>(cleaned)?;
    Ok(report)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            // info string, in any case: json, JSON, Json
            let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            rest.trim_end().trim_end_matches("```").trim()
        }
        None => trimmed,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{full_report_json, full_report_text};
    use super::*;

    fn assert_malformed(raw: &str) {
        match parse_report(raw) {
            Err(GenerationError::MalformedPayload(_)) => {}
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_full_report() {
        let report = parse_report(&full_report_text("ElectroMax")).unwrap();

        assert_eq!(report.company_name, "ElectroMax");
        assert_eq!(report.business_alignment.kpis[0].target, "2.5%");
        assert_eq!(report.ethics_governance.risks[0].impact, RiskImpact::High);
        assert_eq!(report.ethics_governance.risks[1].impact, RiskImpact::Medium);
        assert_eq!(report.projected_growth[1].revenue_gen_ai, 108.0);
    }

    #[test]
    fn test_parse_preserves_wire_shape() {
        let original = full_report_json("ElectroMax");
        let report = parse_report(&original.to_string()).unwrap();

        let back = serde_json::to_value(&report).unwrap();
        assert_eq!(back["companyName"], original["companyName"]);
        assert_eq!(back["ethicsGovernance"], original["ethicsGovernance"]);
        assert_eq!(
            back["projectedGrowth"][1]["revenueGenAI"],
            original["projectedGrowth"][1]["revenueGenAI"]
        );
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let fenced = format!("```json\n{}\n```\n", full_report_text("Fenced"));
        let report = parse_report(&fenced).unwrap();
        assert_eq!(report.company_name, "Fenced");
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        for tag in ["JSON", "Json", ""] {
            let fenced = format!("```{}\n{}\n```", tag, full_report_text("Upper"));
            let report = parse_report(&fenced).unwrap();
            assert_eq!(report.company_name, "Upper");
        }
        assert!(matches!(
            parse_report("```JSON\n```"),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_empty_payload() {
        for raw in ["", "   \n\t", "```json\n```"] {
            assert!(matches!(parse_report(raw), Err(GenerationError::EmptyResponse)));
        }
    }

    #[test]
    fn test_invalid_syntax_is_malformed() {
        assert_malformed("not json at all");
        assert_malformed("{\"companyName\": ");
    }

    #[test]
    fn test_company_name_only_is_malformed() {
        assert_malformed(r#"{"companyName": "X"}"#);
    }

    #[test]
    fn test_missing_nested_fields_are_malformed() {
        let cases: &[&[&str]] = &[
            &["executiveSummary"],
            &["businessAlignment", "roadmap"],
            &["dataInfrastructure", "qualityMeasures"],
            &["talentCapabilities", "trainingProgram"],
            &["ethicsGovernance", "governanceProcess"],
            &["projectedGrowth"],
        ];

        for path in cases {
            let mut value = full_report_json("X");
            let (last, parents) = path.split_last().unwrap();
            let mut target = &mut value;
            for key in parents {
                target = target.get_mut(*key).unwrap();
            }
            target.as_object_mut().unwrap().remove(*last);

            assert_malformed(&value.to_string());
        }
    }

    #[test]
    fn test_null_sequence_is_malformed() {
        let mut value = full_report_json("X");
        value["businessAlignment"]["goals"] = serde_json::Value::Null;
        assert_malformed(&value.to_string());
    }

    #[test]
    fn test_empty_sequences_are_valid() {
        let mut value = full_report_json("X");
        value["businessAlignment"]["kpis"] = serde_json::json!([]);
        value["projectedGrowth"] = serde_json::json!([]);

        let report = parse_report(&value.to_string()).unwrap();
        assert!(report.business_alignment.kpis.is_empty());
        assert!(report.projected_growth.is_empty());
    }

    #[test]
    fn test_unknown_risk_impact_is_malformed() {
        let mut value = full_report_json("X");
        value["ethicsGovernance"]["risks"][0]["impact"] = serde_json::json!("Crítico");
        assert_malformed(&value.to_string());

        value["ethicsGovernance"]["risks"][0]["impact"] = serde_json::json!("High");
        assert_malformed(&value.to_string());
    }

    #[test]
    fn test_non_numeric_revenue_is_malformed() {
        let mut value = full_report_json("X");
        value["projectedGrowth"][0]["revenueBaseline"] = serde_json::json!("cien");
        assert_malformed(&value.to_string());
    }

    #[test]
    fn test_risk_impact_display() {
        assert_eq!(RiskImpact::Low.to_string(), "Bajo");
        assert_eq!(RiskImpact::LABELS, ["Alto", "Medio", "Bajo"]);
    }
}
