use crate::error::{CardError, Result};
use crate::lenient;
use crate::paths;
use crate::persona::{builtin_personas, PersonaAnalysis, PersonaDef};
use crate::rollup;
use crate::types::{PersonaType, ProjectType, Status};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const APP_VERSION: &str = "1.0.0";
pub const FILE_FORMAT_VERSION: &str = "1.0";
pub const COMPATIBILITY: &[&str] = &["ai_studio", "antigravity", "standalone"];

/// `{prefix}_{unix_millis}_{5 lowercase alphanumerics}`
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{millis}_{}", &suffix[..5])
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient::number")]
    pub estimated_hours: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub actual_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: Status::Pending,
            estimated_hours,
            actual_hours: 0.0,
            started_at: None,
            completed_at: None,
            notes: None,
            blockers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// MicroSprint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    ScopeChange,
    TechnicalDecision,
    BlockerResolution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroSprint {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: Status,
    /// Share of the parent sprint's completion, nominally in `[0, 1]`.
    #[serde(default, deserialize_with = "lenient::number")]
    pub weight_in_sprint: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub estimated_hours: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub actual_hours: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub completion_percentage: f64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub persona_analysis: BTreeMap<PersonaType, PersonaAnalysis>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub custom_annotations: Vec<Annotation>,
}

impl MicroSprint {
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight_in_sprint: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            status: Status::Pending,
            weight_in_sprint,
            start_date: None,
            planned_end_date: None,
            actual_end_date: None,
            estimated_hours: 0.0,
            actual_hours: 0.0,
            completion_percentage: 0.0,
            tasks: Vec::new(),
            persona_analysis: BTreeMap::new(),
            custom_annotations: Vec::new(),
        }
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_completed()).count()
    }

    pub fn blocked_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.status, Status::Blocked))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Sprint
// ---------------------------------------------------------------------------

/// Fully engine-derived aggregate of a sprint's micro-sprints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SprintSummary {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_micro_sprints: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub completed_micro_sprints: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_tasks: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub completed_tasks: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_estimated_hours: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_actual_hours: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub efficiency_ratio: f64,
    /// Completed task count.
    #[serde(default, deserialize_with = "lenient::count")]
    pub velocity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: Status,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub planned_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub planned_duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub completion_percentage: f64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub micro_sprints: Vec<MicroSprint>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub sprint_summary: SprintSummary,
}

impl Sprint {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start: NaiveDate, duration_days: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            status: Status::Pending,
            start_date: Some(start),
            planned_end_date: start.checked_add_days(Days::new(duration_days as u64)),
            actual_end_date: None,
            planned_duration_days: duration_days,
            actual_duration_days: None,
            completion_percentage: 0.0,
            micro_sprints: Vec::new(),
            sprint_summary: SprintSummary::default(),
        }
    }

    /// `start + duration_days`, or `InvalidDuration` when that falls outside
    /// the representable calendar.
    pub fn planned_end(start: NaiveDate, duration_days: u32) -> Result<NaiveDate> {
        start
            .checked_add_days(Days::new(duration_days as u64))
            .ok_or(CardError::InvalidDuration(duration_days))
    }

    pub fn blocked_tasks(&self) -> usize {
        self.micro_sprints.iter().map(MicroSprint::blocked_tasks).sum()
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub project_type: ProjectType,
    #[serde(default)]
    pub owner: String,
    pub created_at: DateTime<Utc>,
    /// Engine-derived: first in-progress sprint, else first pending sprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sprint: Option<String>,
    #[serde(default)]
    pub active_persona: PersonaType,
}

// ---------------------------------------------------------------------------
// PerformanceAnalytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroAnalysis {
    #[serde(default, deserialize_with = "lenient::number")]
    pub overall_project_completion: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub sprints_completed: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub sprints_in_progress: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub sprints_pending: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub average_sprint_efficiency: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub average_velocity: f64,
    /// Caller-supplied; the engine has no estimator for it yet.
    #[serde(default)]
    pub estimated_completion_date: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_hours_invested: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_hours_estimated_remaining: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentSprintSnapshot {
    pub sprint_id: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub completion: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub current_velocity: u32,
    /// Placeholder, always 0.
    #[serde(default, deserialize_with = "lenient::number")]
    pub estimated_remaining_days: f64,
    /// Placeholder, always 0.
    #[serde(default, deserialize_with = "lenient::count")]
    pub at_risk_tasks: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub blocked_tasks: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sprint: Option<CurrentSprintSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalytics {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub macro_analysis: MacroAnalysis,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub micro_analysis: MicroAnalysis,
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub decision: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub alternatives_considered: Vec<String>,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub decided_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_sprint_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

// ---------------------------------------------------------------------------
// MemoryCard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub app_version: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub file_format_version: String,
    #[serde(default)]
    pub compatibility: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryCard {
    pub app_metadata: AppMetadata,
    pub project: Project,
    #[serde(default = "builtin_personas", deserialize_with = "personas_or_builtin")]
    pub personas: BTreeMap<PersonaType, PersonaDef>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub sprints: Vec<Sprint>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub performance_analytics: PerformanceAnalytics,
    #[serde(default, deserialize_with = "lenient::list")]
    pub decisions_log: Vec<DecisionLogEntry>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub export_history: Vec<ExportRecord>,
}

fn personas_or_builtin<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<PersonaType, PersonaDef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(builtin_personas))
}

impl MemoryCard {
    pub fn new(
        name: impl Into<String>,
        project_type: ProjectType,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            app_metadata: AppMetadata {
                app_version: APP_VERSION.to_string(),
                created_at: now,
                last_modified: now,
                file_format_version: FILE_FORMAT_VERSION.to_string(),
                compatibility: COMPATIBILITY.iter().map(|s| s.to_string()).collect(),
            },
            project: Project {
                id: generate_id("proj"),
                name: name.into(),
                description: description.into(),
                project_type,
                owner: owner.into(),
                created_at: now,
                current_sprint: None,
                active_persona: PersonaType::SoftwareEngineer,
            },
            personas: builtin_personas(),
            sprints: Vec::new(),
            performance_analytics: PerformanceAnalytics::default(),
            decisions_log: Vec::new(),
            export_history: Vec::new(),
        }
    }

    /// Stamp `last_modified`. Done by the editing surface, not the rollup,
    /// so that the rollup stays a pure function of its input.
    pub fn touch(&mut self) {
        self.app_metadata.last_modified = Utc::now();
    }

    pub fn active_persona(&self) -> Option<&PersonaDef> {
        self.personas.get(&self.project.active_persona)
    }

    pub fn current_sprint(&self) -> Option<&Sprint> {
        let id = self.project.current_sprint.as_deref()?;
        self.sprints.iter().find(|s| s.id == id)
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Parse without rolling up. Derived fields are whatever the file says,
    /// so only use this to compare against a repaired card.
    pub fn from_json_unrolled(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Parse a card and repair every derived field before handing it out.
    pub fn from_json(data: &str) -> Result<Self> {
        let raw = Self::from_json_unrolled(data)?;
        let card = rollup::rollup(&raw);
        tracing::debug!(
            project = %card.project.name,
            sprints = card.sprints.len(),
            completion = card.performance_analytics.macro_analysis.overall_project_completion,
            "card parsed and rolled up"
        );
        Ok(card)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn create(root: &Path, card: &MemoryCard) -> Result<()> {
        let path = paths::card_path(root);
        if path.exists() {
            return Err(CardError::CardExists(path.display().to_string()));
        }
        card.save(root)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::card_path(root);
        if !path.exists() {
            return Err(CardError::NotInitialized);
        }
        Self::import(&path)
    }

    /// Read a card from an arbitrary file (e.g. one exported elsewhere).
    pub fn import(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn load_unrolled(root: &Path) -> Result<Self> {
        let path = paths::card_path(root);
        if !path.exists() {
            return Err(CardError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        Self::from_json_unrolled(&data)
    }

    /// Write the card verbatim to `dir` under its dated export name and
    /// return the written path.
    pub fn export(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
        let path = dir.join(paths::export_file_name(&self.project.name, date));
        let data = self.to_json()?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        tracing::info!(path = %path.display(), "card exported");
        Ok(path)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::card_path(root);
        let data = self.to_json()?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        tracing::info!(path = %path.display(), "card saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
