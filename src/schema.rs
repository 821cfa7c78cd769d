//! Output schema declared to the model
//!
//! Mirrors `StrategyReport` field for field using the provider's schema
//! dialect. Every object lists all of its properties as required.

use crate::models::RiskImpact;
use lazy_static::lazy_static;
use serde_json::{json, Value};

lazy_static! {
    static ref RESPONSE_SCHEMA: Value = build_response_schema();
}

/// Schema sent with every generation request
pub fn response_schema() -> &'static Value {
    &RESPONSE_SCHEMA
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn number() -> Value {
    json!({ "type": "NUMBER" })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

/// Object schema whose properties are all required
fn object(properties: &[(&str, Value)]) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let props: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": props,
        "required": required,
    })
}

fn build_response_schema() -> Value {
    let kpi = object(&[
        ("name", string()),
        ("current", string()),
        ("target", string()),
        ("metric", string()),
    ]);

    let use_case = object(&[
        ("title", string()),
        ("description", string()),
        ("impact", string()),
    ]);

    let roadmap_phase = object(&[
        ("phase", string()),
        ("duration", string()),
        ("focus", string()),
        ("actions", array_of(string())),
    ]);

    let risk = object(&[
        ("risk", string()),
        (
            "impact",
            json!({ "type": "STRING", "enum": RiskImpact::LABELS }),
        ),
        ("mitigation", string()),
    ]);

    let chart_point = object(&[
        ("month", string()),
        ("revenueBaseline", number()),
        ("revenueGenAI", number()),
    ]);

    object(&[
        (
            "companyName",
            json!({ "type": "STRING", "description": "Nombre ficticio o real de la empresa" }),
        ),
        ("executiveSummary", string()),
        (
            "businessAlignment",
            object(&[
                ("challenges", array_of(string())),
                ("goals", array_of(string())),
                ("kpis", array_of(kpi)),
                ("highImpactUseCases", array_of(use_case)),
                ("roadmap", array_of(roadmap_phase)),
            ]),
        ),
        (
            "dataInfrastructure",
            object(&[
                ("culturePlan", array_of(string())),
                (
                    "infrastructure",
                    array_of(object(&[("component", string()), ("purpose", string())])),
                ),
                ("qualityMeasures", array_of(string())),
            ]),
        ),
        (
            "talentCapabilities",
            object(&[
                ("rolesNeeded", array_of(string())),
                ("partnerships", array_of(string())),
                (
                    "trainingProgram",
                    array_of(object(&[("module", string()), ("audience", string())])),
                ),
            ]),
        ),
        (
            "ethicsGovernance",
            object(&[
                ("principles", array_of(string())),
                ("risks", array_of(risk)),
                ("governanceProcess", string()),
            ]),
        ),
        ("projectedGrowth", array_of(chart_point)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::full_report_json;

    /// Every OBJECT node must require exactly the properties it declares
    fn assert_all_required(node: &Value, path: &str) {
        match node["type"].as_str() {
            Some("OBJECT") => {
                let props = node["properties"].as_object().unwrap();
                let mut required: Vec<&str> = node["required"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v.as_str().unwrap())
                    .collect();
                let mut declared: Vec<&str> = props.keys().map(String::as_str).collect();
                required.sort_unstable();
                declared.sort_unstable();
                assert_eq!(required, declared, "at {}", path);

                for (name, child) in props {
                    assert_all_required(child, &format!("{}.{}", path, name));
                }
            }
            Some("ARRAY") => assert_all_required(&node["items"], &format!("{}[]", path)),
            Some(_) => {}
            None => panic!("missing type at {}", path),
        }
    }

    /// The schema and a valid payload must name the same keys at every level
    fn assert_same_shape(schema: &Value, payload: &Value, path: &str) {
        match schema["type"].as_str() {
            Some("OBJECT") => {
                let props = schema["properties"].as_object().unwrap();
                let fields = payload.as_object().unwrap();
                let mut expected: Vec<&String> = props.keys().collect();
                let mut actual: Vec<&String> = fields.keys().collect();
                expected.sort();
                actual.sort();
                assert_eq!(expected, actual, "at {}", path);

                for (name, child) in props {
                    assert_same_shape(child, &payload[name], &format!("{}.{}", path, name));
                }
            }
            Some("ARRAY") => {
                for item in payload.as_array().unwrap() {
                    assert_same_shape(&schema["items"], item, &format!("{}[]", path));
                }
            }
            _ => {}
        }
    }

    #[test]
    fn test_every_field_required() {
        assert_all_required(response_schema(), "$");
    }

    #[test]
    fn test_schema_matches_report_shape() {
        assert_same_shape(response_schema(), &full_report_json("X"), "$");
    }

    #[test]
    fn test_risk_impact_enum() {
        let impact = &response_schema()["properties"]["ethicsGovernance"]["properties"]["risks"]
            ["items"]["properties"]["impact"];
        assert_eq!(impact["enum"], json!(["Alto", "Medio", "Bajo"]));
    }

    #[test]
    fn test_numeric_projection_fields() {
        let point = &response_schema()["properties"]["projectedGrowth"]["items"]["properties"];
        assert_eq!(point["revenueBaseline"]["type"], "NUMBER");
        assert_eq!(point["revenueGenAI"]["type"], "NUMBER");
    }
}
