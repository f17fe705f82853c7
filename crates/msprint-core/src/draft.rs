//! Hydrate a loose project outline into a full card.
//!
//! An outline is what a person (or an external generator) writes before any
//! ids, dates or derived numbers exist: names, weights, estimates. Every field
//! is optional. Hydration assigns deterministic ids, lays sprints out back to
//! back from a start date, and routes the result through the rollup.

use crate::card::{MemoryCard, MicroSprint, Sprint, Task};
use crate::error::{CardError, Result};
use crate::lenient;
use crate::persona::PersonaAnalysis;
use crate::rollup::rollup;
use crate::types::{PersonaType, ProjectType, Status};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled project";
pub const DRAFT_OWNER: &str = "draft";
pub const DEFAULT_DURATION_DAYS: u32 = 7;
pub const DEFAULT_TASK_HOURS: f64 = 1.0;
pub const DEFAULT_TASK_DESCRIPTION: &str = "New task";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftTask {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftMicroSprint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight_in_sprint: Option<f64>,
    /// Free-form persona notes; stored under the card's active persona.
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub tasks: Vec<DraftTask>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftSprint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub planned_duration_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub micro_sprints: Vec<DraftMicroSprint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftProject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub sprints: Vec<DraftSprint>,
}

impl DraftProject {
    /// YAML is a superset of JSON, so one parser covers both.
    pub fn parse(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn hydrate_micro_sprint(
    draft: &DraftMicroSprint,
    id: String,
    index: usize,
    sibling_count: usize,
    first_sprint: bool,
    persona: PersonaType,
) -> MicroSprint {
    let name = non_empty(&draft.name).unwrap_or_else(|| format!("Micro Sprint {}", index + 1));
    let weight = positive(draft.weight_in_sprint)
        .unwrap_or(1.0 / sibling_count.max(1) as f64);

    let mut ms = MicroSprint::new(id.clone(), name, weight);
    ms.description = non_empty(&draft.description).unwrap_or_default();
    if first_sprint && index == 0 {
        ms.status = Status::InProgress;
    }
    if let Some(text) = non_empty(&draft.analysis) {
        let analysis = match persona {
            PersonaType::SoftwareEngineer => PersonaAnalysis {
                technical_notes: Some(text),
                ..Default::default()
            },
            PersonaType::Lawyer => PersonaAnalysis {
                compliance_notes: Some(text),
                ..Default::default()
            },
        };
        ms.persona_analysis.insert(persona, analysis);
    }
    ms.tasks = draft
        .tasks
        .iter()
        .enumerate()
        .map(|(k, t)| {
            Task::new(
                format!("{id}_task_{}", k + 1),
                non_empty(&t.description).unwrap_or_else(|| DEFAULT_TASK_DESCRIPTION.to_string()),
                positive(t.estimated_hours).unwrap_or(DEFAULT_TASK_HOURS),
            )
        })
        .collect();
    ms
}

/// Build a rolled-up card from an outline. Sprint `n + 1` starts the day
/// after sprint `n`'s planned end. Fails with `InvalidDuration` when a sprint
/// would end past the last representable date.
pub fn hydrate(
    draft: &DraftProject,
    project_type: ProjectType,
    persona: PersonaType,
    start: NaiveDate,
) -> Result<MemoryCard> {
    let mut card = MemoryCard::new(
        non_empty(&draft.name).unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        project_type,
        non_empty(&draft.description).unwrap_or_default(),
        DRAFT_OWNER,
    );
    card.project.active_persona = persona;

    let mut next_start = start;
    for (n, ds) in draft.sprints.iter().enumerate() {
        let sprint_id = format!("sprint_{}", n + 1);
        let duration = ds
            .planned_duration_days
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DURATION_DAYS);
        let name = non_empty(&ds.name).unwrap_or_else(|| format!("Sprint {}", n + 1));
        let planned_end = Sprint::planned_end(next_start, duration)?;

        let mut sprint = Sprint::new(sprint_id.clone(), name, next_start, duration);
        sprint.description = non_empty(&ds.description).unwrap_or_default();
        if n == 0 {
            sprint.status = Status::InProgress;
        }
        sprint.micro_sprints = ds
            .micro_sprints
            .iter()
            .enumerate()
            .map(|(m, dm)| {
                hydrate_micro_sprint(
                    dm,
                    format!("{sprint_id}_ms_{}", m + 1),
                    m,
                    ds.micro_sprints.len(),
                    n == 0,
                    persona,
                )
            })
            .collect();

        card.sprints.push(sprint);
        // Only needed when another sprint follows.
        if n + 1 < draft.sprints.len() {
            next_start = planned_end
                .checked_add_days(Days::new(1))
                .ok_or(CardError::InvalidDuration(duration))?;
        }
    }

    tracing::debug!(
        project = %card.project.name,
        sprints = card.sprints.len(),
        "draft hydrated"
    );
    Ok(rollup(&card))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: &str = r#"
name: Contract Review
description: Review the supplier contracts
sprints:
  - name: Intake
    planned_duration_days: 5
    micro_sprints:
      - name: Collect documents
        weight_in_sprint: 0.7
        analysis: Several contracts are scanned images.
        tasks:
          - description: Request originals
            estimated_hours: 2
          - description: Index files
      - name: Triage
        tasks:
          - {}
  - micro_sprints:
      - name: Draft opinions
      - name: Review opinions
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hydrated() -> MemoryCard {
        let draft = DraftProject::parse(OUTLINE).unwrap();
        hydrate(&draft, ProjectType::LegalCase, PersonaType::Lawyer, date(2026, 3, 2)).unwrap()
    }

    #[test]
    fn ids_are_positional() {
        let card = hydrated();
        assert_eq!(card.sprints[0].id, "sprint_1");
        assert_eq!(card.sprints[0].micro_sprints[1].id, "sprint_1_ms_2");
        assert_eq!(
            card.sprints[0].micro_sprints[0].tasks[1].id,
            "sprint_1_ms_1_task_2"
        );
    }

    #[test]
    fn sprints_are_laid_out_back_to_back() {
        let card = hydrated();
        assert_eq!(card.sprints[0].start_date, Some(date(2026, 3, 2)));
        assert_eq!(card.sprints[0].planned_end_date, Some(date(2026, 3, 7)));
        assert_eq!(card.sprints[1].start_date, Some(date(2026, 3, 8)));
        assert_eq!(card.sprints[1].planned_duration_days, 7);
        assert_eq!(card.sprints[1].planned_end_date, Some(date(2026, 3, 15)));
    }

    #[test]
    fn defaults_fill_gaps() {
        let card = hydrated();
        assert_eq!(card.project.owner, "draft");
        assert_eq!(card.sprints[1].name, "Sprint 2");
        let triage = &card.sprints[0].micro_sprints[1];
        assert_eq!(triage.weight_in_sprint, 0.5);
        assert_eq!(triage.tasks[0].description, "New task");
        assert_eq!(triage.tasks[0].estimated_hours, 1.0);
        assert_eq!(card.sprints[1].micro_sprints[0].weight_in_sprint, 0.5);
    }

    #[test]
    fn first_sprint_and_micro_sprint_start_in_progress() {
        let card = hydrated();
        assert_eq!(card.sprints[0].status, Status::InProgress);
        assert_eq!(card.sprints[0].micro_sprints[0].status, Status::InProgress);
        assert_eq!(card.sprints[0].micro_sprints[1].status, Status::Pending);
        assert_eq!(card.sprints[1].status, Status::Pending);
        assert_eq!(card.project.current_sprint.as_deref(), Some("sprint_1"));
    }

    #[test]
    fn analysis_lands_under_active_persona() {
        let card = hydrated();
        let ms = &card.sprints[0].micro_sprints[0];
        let analysis = ms.persona_analysis.get(&PersonaType::Lawyer).unwrap();
        assert!(analysis.compliance_notes.as_deref().unwrap().contains("scanned"));
        assert!(analysis.technical_notes.is_none());
    }

    #[test]
    fn hydrated_card_is_rolled_up() {
        let card = hydrated();
        let ms = &card.sprints[0].micro_sprints[0];
        assert_eq!(ms.estimated_hours, 3.0);
        assert_eq!(card.sprints[0].sprint_summary.total_tasks, 3);
        assert_eq!(
            card.performance_analytics.macro_analysis.sprints_pending,
            1
        );
        assert_eq!(rollup(&card), card);
    }

    #[test]
    fn empty_outline() {
        let draft = DraftProject::parse("{}").unwrap();
        let card = hydrate(
            &draft,
            ProjectType::Mixed,
            PersonaType::SoftwareEngineer,
            date(2026, 1, 1),
        )
        .unwrap();
        assert_eq!(card.project.name, DEFAULT_PROJECT_NAME);
        assert!(card.sprints.is_empty());
    }

    #[test]
    fn json_outline_parses() {
        let draft = DraftProject::parse(r#"{"name": "J", "sprints": [{"name": "S"}]}"#).unwrap();
        assert_eq!(draft.sprints.len(), 1);
        assert!(draft.sprints[0].micro_sprints.is_empty());
    }

    #[test]
    fn oversized_duration_is_an_error() {
        let draft = DraftProject::parse("sprints:\n  - planned_duration_days: 4000000000\n").unwrap();
        let result = hydrate(
            &draft,
            ProjectType::Mixed,
            PersonaType::SoftwareEngineer,
            date(2026, 1, 1),
        );
        assert!(matches!(result, Err(CardError::InvalidDuration(4_000_000_000))));
    }

    #[test]
    fn late_start_overflowing_calendar_is_an_error() {
        let draft = DraftProject::parse("sprints:\n  - name: Only\n").unwrap();
        let result = hydrate(
            &draft,
            ProjectType::Mixed,
            PersonaType::SoftwareEngineer,
            NaiveDate::MAX,
        );
        assert!(matches!(result, Err(CardError::InvalidDuration(7))));
    }
}
