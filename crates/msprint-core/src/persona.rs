use crate::types::PersonaType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static description of a reviewing persona. Reference data only: nothing in
/// the rollup reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDef {
    pub id: PersonaType,
    pub name: String,
    #[serde(default)]
    pub expertise: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub metrics_priority: Vec<String>,
}

/// Persona-specific notes attached to a micro-sprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technical_debt: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_recommendations: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadlines_status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documentation_gaps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks_identified: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks_mitigated: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in persona table every new card starts with.
pub fn builtin_personas() -> BTreeMap<PersonaType, PersonaDef> {
    let mut personas = BTreeMap::new();
    personas.insert(
        PersonaType::SoftwareEngineer,
        PersonaDef {
            id: PersonaType::SoftwareEngineer,
            name: "Software Engineer".to_string(),
            expertise: "Architecture, performance, code quality".to_string(),
            tone: "Technical, metrics-driven".to_string(),
            focus_areas: strings(&[
                "Performance",
                "Scalability",
                "Code quality",
                "Technical debt",
            ]),
            metrics_priority: strings(&["Execution time", "Test coverage", "Complexity"]),
        },
    );
    personas.insert(
        PersonaType::Lawyer,
        PersonaDef {
            id: PersonaType::Lawyer,
            name: "Legal Specialist".to_string(),
            expertise: "Case management and compliance".to_string(),
            tone: "Formal, deadline-driven".to_string(),
            focus_areas: strings(&[
                "Deadlines",
                "Legal documentation",
                "Compliance",
                "Risk management",
            ]),
            metrics_priority: strings(&[
                "Compliance",
                "Response time",
                "Complete documentation",
            ]),
        },
    );
    personas
}
