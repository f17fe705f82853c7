//! Structural edits on a card.
//!
//! Each function applies one mutation to a `&mut MemoryCard` and leaves every
//! derived field stale. Callers follow each edit with
//! [`rollup`](crate::rollup::rollup) and [`MemoryCard::touch`] before holding
//! on to or persisting the result.
//!
//! Micro-sprints and tasks are addressed by their own id; ids are unique
//! across the whole card.

use crate::card::{generate_id, DecisionLogEntry, ExportRecord, MemoryCard, MicroSprint, Sprint, Task};
use crate::error::{CardError, Result};
use crate::types::{PersonaType, Status};
use chrono::{NaiveDate, Utc};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn require_name(kind: &'static str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CardError::EmptyName(kind));
    }
    Ok(trimmed.to_string())
}

pub fn validate_weight(weight: f64) -> Result<f64> {
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(CardError::InvalidWeight(weight));
    }
    Ok(weight)
}

pub fn validate_hours(hours: f64) -> Result<f64> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(CardError::InvalidHours(hours));
    }
    Ok(hours)
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_sprint_mut<'a>(card: &'a mut MemoryCard, sprint_id: &str) -> Result<&'a mut Sprint> {
    card.sprints
        .iter_mut()
        .find(|s| s.id == sprint_id)
        .ok_or_else(|| CardError::SprintNotFound(sprint_id.to_string()))
}

pub fn find_micro_sprint_mut<'a>(
    card: &'a mut MemoryCard,
    micro_id: &str,
) -> Result<&'a mut MicroSprint> {
    card.sprints
        .iter_mut()
        .flat_map(|s| s.micro_sprints.iter_mut())
        .find(|ms| ms.id == micro_id)
        .ok_or_else(|| CardError::MicroSprintNotFound(micro_id.to_string()))
}

pub fn find_task_mut<'a>(card: &'a mut MemoryCard, task_id: &str) -> Result<&'a mut Task> {
    card.sprints
        .iter_mut()
        .flat_map(|s| s.micro_sprints.iter_mut())
        .flat_map(|ms| ms.tasks.iter_mut())
        .find(|t| t.id == task_id)
        .ok_or_else(|| CardError::TaskNotFound(task_id.to_string()))
}

/// Where a task lives, for display.
#[derive(Debug, Clone, Copy)]
pub struct TaskLocation<'a> {
    pub sprint: &'a Sprint,
    pub micro_sprint: &'a MicroSprint,
    pub task: &'a Task,
}

pub fn locate_task<'a>(card: &'a MemoryCard, task_id: &str) -> Option<TaskLocation<'a>> {
    card.sprints.iter().find_map(|sprint| {
        sprint.micro_sprints.iter().find_map(|micro_sprint| {
            micro_sprint
                .tasks
                .iter()
                .find(|t| t.id == task_id)
                .map(|task| TaskLocation {
                    sprint,
                    micro_sprint,
                    task,
                })
        })
    })
}

pub fn find_micro_sprint<'a>(
    card: &'a MemoryCard,
    micro_id: &str,
) -> Option<(&'a Sprint, &'a MicroSprint)> {
    card.sprints.iter().find_map(|sprint| {
        sprint
            .micro_sprints
            .iter()
            .find(|ms| ms.id == micro_id)
            .map(|ms| (sprint, ms))
    })
}

// ---------------------------------------------------------------------------
// Sprints
// ---------------------------------------------------------------------------

pub fn add_sprint(
    card: &mut MemoryCard,
    name: &str,
    start: NaiveDate,
    duration_days: u32,
) -> Result<String> {
    let name = require_name("sprint", name)?;
    Sprint::planned_end(start, duration_days)?;
    let id = generate_id("sprint");
    card.sprints
        .push(Sprint::new(id.clone(), name, start, duration_days));
    Ok(id)
}

/// Explicit caller transition (start, finish, block, reopen). Finishing
/// records the actual end date and duration.
pub fn set_sprint_status(card: &mut MemoryCard, sprint_id: &str, status: Status) -> Result<()> {
    let sprint = find_sprint_mut(card, sprint_id)?;
    sprint.status = status;
    match status {
        Status::Completed => {
            let today = Utc::now().date_naive();
            sprint.actual_end_date = Some(today);
            sprint.actual_duration_days = sprint
                .start_date
                .map(|start| (today - start).num_days().max(0) as u32);
        }
        _ => {
            sprint.actual_end_date = None;
            sprint.actual_duration_days = None;
        }
    }
    Ok(())
}

pub fn remove_sprint(card: &mut MemoryCard, sprint_id: &str) -> Result<Sprint> {
    let pos = card
        .sprints
        .iter()
        .position(|s| s.id == sprint_id)
        .ok_or_else(|| CardError::SprintNotFound(sprint_id.to_string()))?;
    Ok(card.sprints.remove(pos))
}

// ---------------------------------------------------------------------------
// Micro-sprints
// ---------------------------------------------------------------------------

pub fn add_micro_sprint(
    card: &mut MemoryCard,
    sprint_id: &str,
    name: &str,
    weight: f64,
) -> Result<String> {
    let name = require_name("micro-sprint", name)?;
    let weight = validate_weight(weight)?;
    let sprint = find_sprint_mut(card, sprint_id)?;
    let id = generate_id("ms");
    sprint
        .micro_sprints
        .push(MicroSprint::new(id.clone(), name, weight));
    Ok(id)
}

pub fn set_micro_sprint_status(card: &mut MemoryCard, micro_id: &str, status: Status) -> Result<()> {
    find_micro_sprint_mut(card, micro_id)?.status = status;
    Ok(())
}

pub fn set_weight(card: &mut MemoryCard, micro_id: &str, weight: f64) -> Result<()> {
    let weight = validate_weight(weight)?;
    find_micro_sprint_mut(card, micro_id)?.weight_in_sprint = weight;
    Ok(())
}

pub fn remove_micro_sprint(card: &mut MemoryCard, micro_id: &str) -> Result<MicroSprint> {
    for sprint in &mut card.sprints {
        if let Some(pos) = sprint.micro_sprints.iter().position(|ms| ms.id == micro_id) {
            return Ok(sprint.micro_sprints.remove(pos));
        }
    }
    Err(CardError::MicroSprintNotFound(micro_id.to_string()))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub fn add_task(
    card: &mut MemoryCard,
    micro_id: &str,
    description: &str,
    estimated_hours: f64,
) -> Result<String> {
    let description = require_name("task", description)?;
    let estimated_hours = validate_hours(estimated_hours)?;
    let ms = find_micro_sprint_mut(card, micro_id)?;
    let id = generate_id("task");
    ms.tasks
        .push(Task::new(id.clone(), description, estimated_hours));
    Ok(id)
}

fn apply_status(task: &mut Task, status: Status) {
    let now = Utc::now();
    match status {
        Status::Completed => {
            // No time tracking yet: assume the estimate was spent.
            if task.actual_hours == 0.0 {
                task.actual_hours = task.estimated_hours;
            }
            task.completed_at = Some(now);
        }
        Status::InProgress => {
            task.started_at.get_or_insert(now);
            task.completed_at = None;
        }
        Status::Pending | Status::Blocked => {
            task.completed_at = None;
        }
    }
    task.status = status;
}

/// Completed goes back to pending; anything else becomes completed.
pub fn toggle_task(card: &mut MemoryCard, task_id: &str) -> Result<Status> {
    let task = find_task_mut(card, task_id)?;
    let next = if task.status.is_completed() {
        Status::Pending
    } else {
        Status::Completed
    };
    apply_status(task, next);
    Ok(next)
}

pub fn set_task_status(card: &mut MemoryCard, task_id: &str, status: Status) -> Result<()> {
    apply_status(find_task_mut(card, task_id)?, status);
    Ok(())
}

pub fn block_task(card: &mut MemoryCard, task_id: &str, reason: &str) -> Result<()> {
    let task = find_task_mut(card, task_id)?;
    apply_status(task, Status::Blocked);
    let reason = reason.trim();
    if !reason.is_empty() {
        task.blockers.push(reason.to_string());
    }
    Ok(())
}

pub fn log_hours(card: &mut MemoryCard, task_id: &str, hours: f64) -> Result<()> {
    let hours = validate_hours(hours)?;
    find_task_mut(card, task_id)?.actual_hours = hours;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub description: Option<String>,
    pub estimated_hours: Option<f64>,
    pub notes: Option<String>,
}

pub fn edit_task(card: &mut MemoryCard, task_id: &str, edit: TaskEdit) -> Result<()> {
    let description = edit
        .description
        .as_deref()
        .map(|d| require_name("task", d))
        .transpose()?;
    let estimate = edit.estimated_hours.map(validate_hours).transpose()?;

    let task = find_task_mut(card, task_id)?;
    if let Some(d) = description {
        task.description = d;
    }
    if let Some(e) = estimate {
        task.estimated_hours = e;
    }
    if let Some(n) = edit.notes {
        task.notes = if n.trim().is_empty() { None } else { Some(n) };
    }
    Ok(())
}

pub fn remove_task(card: &mut MemoryCard, task_id: &str) -> Result<Task> {
    for ms in card.sprints.iter_mut().flat_map(|s| s.micro_sprints.iter_mut()) {
        if let Some(pos) = ms.tasks.iter().position(|t| t.id == task_id) {
            return Ok(ms.tasks.remove(pos));
        }
    }
    Err(CardError::TaskNotFound(task_id.to_string()))
}

// ---------------------------------------------------------------------------
// Project context
// ---------------------------------------------------------------------------

pub fn set_persona(card: &mut MemoryCard, persona: PersonaType) {
    card.project.active_persona = persona;
}

pub fn toggle_persona(card: &mut MemoryCard) -> PersonaType {
    let next = card.project.active_persona.toggled();
    card.project.active_persona = next;
    next
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DecisionInput {
    pub decision: String,
    pub rationale: String,
    pub alternatives_considered: Vec<String>,
    pub impact: String,
    pub decided_by: String,
    pub sprint_context: Option<String>,
    pub micro_sprint_context: Option<String>,
}

/// Append to the decision log. Context ids, when given, must exist.
pub fn record_decision(card: &mut MemoryCard, input: DecisionInput) -> Result<String> {
    let decision = require_name("decision", &input.decision)?;
    if let Some(sprint_id) = input.sprint_context.as_deref() {
        find_sprint_mut(card, sprint_id)?;
    }
    if let Some(micro_id) = input.micro_sprint_context.as_deref() {
        find_micro_sprint_mut(card, micro_id)?;
    }
    let id = generate_id("dec");
    card.decisions_log.push(DecisionLogEntry {
        id: id.clone(),
        timestamp: Utc::now(),
        decision,
        rationale: input.rationale,
        alternatives_considered: input.alternatives_considered,
        impact: input.impact,
        decided_by: input.decided_by,
        sprint_context: input.sprint_context,
        micro_sprint_context: input.micro_sprint_context,
    });
    Ok(id)
}

pub fn record_export(card: &mut MemoryCard, path: impl Into<String>) {
    card.export_history.push(ExportRecord {
        timestamp: Utc::now(),
        path: path.into(),
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
