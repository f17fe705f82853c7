//! Completion and analytics rollup.
//!
//! Recomputes every derived field of a [`MemoryCard`] bottom-up from task
//! data: task → micro-sprint → sprint → project analytics. Tasks are the only
//! authoritative layer; everything above them is overwritten on every call.
//!
//! All functions here are pure. They borrow their input, return a new value,
//! never fail, and never store a non-finite number. Running a rollup on its
//! own output yields the same card.

use crate::card::{
    CurrentSprintSnapshot, MacroAnalysis, MemoryCard, MicroAnalysis, MicroSprint,
    PerformanceAnalytics, Sprint, SprintSummary, Task,
};
use crate::lenient::finite_or_zero;
use crate::types::Status;

/// Weighted completion at or above this counts as done. Absorbs drift from
/// multiplying percentages by fractional weights.
pub const COMPLETION_TOLERANCE: f64 = 99.9;

// ---------------------------------------------------------------------------
// Numeric guards
// ---------------------------------------------------------------------------

fn clamp_percentage(value: f64) -> f64 {
    finite_or_zero(value).clamp(0.0, 100.0)
}

/// Hours contributed by a single task: negative or non-finite counts as 0.
fn task_hours(value: f64) -> f64 {
    let v = finite_or_zero(value);
    if v > 0.0 {
        v
    } else {
        0.0
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        finite_or_zero(numerator / denominator)
    } else {
        0.0
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    finite_or_zero((value * factor).round() / factor)
}

fn sum_hours(tasks: &[Task], field: impl Fn(&Task) -> f64) -> f64 {
    tasks.iter().map(|t| task_hours(field(t))).sum()
}

// ---------------------------------------------------------------------------
// Task → MicroSprint
// ---------------------------------------------------------------------------

pub fn rollup_micro_sprint(ms: &MicroSprint) -> MicroSprint {
    let total = ms.tasks.len();
    let completed = ms.completed_tasks();

    let completion = if total == 0 {
        if ms.status.is_completed() {
            100.0
        } else {
            0.0
        }
    } else {
        100.0 * completed as f64 / total as f64
    };

    // With no completed tasks the caller's status stands, so a manually
    // blocked micro-sprint stays blocked.
    let status = if total == 0 || completed == 0 {
        ms.status
    } else if completed == total {
        Status::Completed
    } else {
        Status::InProgress
    };

    MicroSprint {
        status,
        completion_percentage: clamp_percentage(completion),
        estimated_hours: sum_hours(&ms.tasks, |t| t.estimated_hours),
        actual_hours: sum_hours(&ms.tasks, |t| t.actual_hours),
        ..ms.clone()
    }
}

// ---------------------------------------------------------------------------
// MicroSprint → Sprint
// ---------------------------------------------------------------------------

fn summarize(micro_sprints: &[MicroSprint]) -> SprintSummary {
    let total_estimated_hours: f64 = micro_sprints.iter().map(|ms| ms.estimated_hours).sum();
    let total_actual_hours: f64 = micro_sprints.iter().map(|ms| ms.actual_hours).sum();
    let total_tasks: usize = micro_sprints.iter().map(|ms| ms.tasks.len()).sum();
    let completed_tasks: usize = micro_sprints.iter().map(MicroSprint::completed_tasks).sum();
    let completed_micro_sprints = micro_sprints
        .iter()
        .filter(|ms| ms.completion_percentage >= 100.0)
        .count();

    SprintSummary {
        total_micro_sprints: micro_sprints.len() as u32,
        completed_micro_sprints: completed_micro_sprints as u32,
        total_tasks: total_tasks as u32,
        completed_tasks: completed_tasks as u32,
        total_estimated_hours,
        total_actual_hours,
        efficiency_ratio: ratio(total_actual_hours, total_estimated_hours),
        velocity: completed_tasks as u32,
    }
}

/// `pending` and `completed` are caller-controlled milestones and never move.
/// A started sprint tracks its progress.
fn sprint_status(current: Status, completion: f64) -> Status {
    match current {
        Status::InProgress | Status::Blocked => {
            if completion >= COMPLETION_TOLERANCE {
                Status::Completed
            } else if completion > 0.0 {
                Status::InProgress
            } else {
                current
            }
        }
        Status::Pending | Status::Completed => current,
    }
}

pub fn rollup_sprint(sprint: &Sprint) -> Sprint {
    let micro_sprints: Vec<MicroSprint> =
        sprint.micro_sprints.iter().map(rollup_micro_sprint).collect();

    // Weights are caller input and are deliberately not renormalized.
    let weighted: f64 = micro_sprints
        .iter()
        .map(|ms| ms.completion_percentage * finite_or_zero(ms.weight_in_sprint))
        .sum();
    let completion = clamp_percentage(weighted);

    Sprint {
        id: sprint.id.clone(),
        name: sprint.name.clone(),
        description: sprint.description.clone(),
        status: sprint_status(sprint.status, completion),
        start_date: sprint.start_date,
        planned_end_date: sprint.planned_end_date,
        actual_end_date: sprint.actual_end_date,
        planned_duration_days: sprint.planned_duration_days,
        actual_duration_days: sprint.actual_duration_days,
        completion_percentage: completion,
        sprint_summary: summarize(&micro_sprints),
        micro_sprints,
    }
}

// ---------------------------------------------------------------------------
// Sprint → Project analytics
// ---------------------------------------------------------------------------

/// First in-progress sprint, falling back to the first pending one.
pub fn select_current_sprint(sprints: &[Sprint]) -> Option<&Sprint> {
    sprints
        .iter()
        .find(|s| s.status == Status::InProgress)
        .or_else(|| sprints.iter().find(|s| s.status == Status::Pending))
}

fn count_status(sprints: &[Sprint], status: Status) -> u32 {
    sprints.iter().filter(|s| s.status == status).count() as u32
}

/// Each sprint is worth an equal share. Completed sprints count in full and
/// only the first in-progress sprint contributes its partial completion.
fn overall_completion(sprints: &[Sprint]) -> f64 {
    if sprints.is_empty() {
        return 0.0;
    }
    let share = 100.0 / sprints.len() as f64;
    let completed = count_status(sprints, Status::Completed) as f64 * share;
    let active = sprints
        .iter()
        .find(|s| s.status == Status::InProgress)
        .map(|s| clamp_percentage(s.completion_percentage) / 100.0 * share)
        .unwrap_or(0.0);
    clamp_percentage(round_to(completed + active, 1))
}

fn macro_analysis(sprints: &[Sprint], previous: &MacroAnalysis) -> MacroAnalysis {
    let total_actual: f64 = sprints
        .iter()
        .map(|s| finite_or_zero(s.sprint_summary.total_actual_hours))
        .sum();
    let total_estimated: f64 = sprints
        .iter()
        .map(|s| finite_or_zero(s.sprint_summary.total_estimated_hours))
        .sum();

    let sprints_with_tasks = sprints
        .iter()
        .filter(|s| s.sprint_summary.total_tasks > 0)
        .count();
    let velocity_sum: u32 = sprints.iter().map(|s| s.sprint_summary.velocity).sum();
    let average_velocity = ratio(velocity_sum as f64, sprints_with_tasks as f64);

    MacroAnalysis {
        overall_project_completion: overall_completion(sprints),
        sprints_completed: count_status(sprints, Status::Completed),
        sprints_in_progress: count_status(sprints, Status::InProgress),
        sprints_pending: count_status(sprints, Status::Pending),
        average_sprint_efficiency: round_to(ratio(total_actual, total_estimated), 2),
        average_velocity: round_to(average_velocity, 1),
        estimated_completion_date: previous.estimated_completion_date.clone(),
        total_hours_invested: total_actual,
        total_hours_estimated_remaining: (total_estimated - total_actual).max(0.0),
    }
}

fn snapshot(sprint: &Sprint) -> CurrentSprintSnapshot {
    CurrentSprintSnapshot {
        sprint_id: sprint.id.clone(),
        completion: clamp_percentage(sprint.completion_percentage),
        current_velocity: sprint.sprint_summary.velocity,
        // No estimator yet; callers must not read meaning into these.
        estimated_remaining_days: 0.0,
        at_risk_tasks: 0,
        blocked_tasks: sprint.blocked_tasks() as u32,
    }
}

/// Recompute project analytics in place on an owned card whose sprints are
/// already rolled up.
fn apply_project_rollup(card: &mut MemoryCard) {
    let current = select_current_sprint(&card.sprints);
    card.project.current_sprint = current.map(|s| s.id.clone());
    card.performance_analytics = PerformanceAnalytics {
        macro_analysis: macro_analysis(
            &card.sprints,
            &card.performance_analytics.macro_analysis,
        ),
        micro_analysis: MicroAnalysis {
            current_sprint: current.map(snapshot),
        },
    };
}

/// Project-level pass only. Assumes every sprint has already been through
/// [`rollup_sprint`].
pub fn rollup_project(card: &MemoryCard) -> MemoryCard {
    let mut out = card.clone();
    apply_project_rollup(&mut out);
    out
}

/// Full bottom-up rollup of a card.
pub fn rollup(card: &MemoryCard) -> MemoryCard {
    let mut out = MemoryCard {
        app_metadata: card.app_metadata.clone(),
        project: card.project.clone(),
        personas: card.personas.clone(),
        sprints: card.sprints.iter().map(rollup_sprint).collect(),
        performance_analytics: card.performance_analytics.clone(),
        decisions_log: card.decisions_log.clone(),
        export_history: card.export_history.clone(),
    };
    apply_project_rollup(&mut out);

    let analysis = &out.performance_analytics.macro_analysis;
    tracing::debug!(
        sprints = out.sprints.len(),
        completion = analysis.overall_project_completion,
        current_sprint = out.project.current_sprint.as_deref().unwrap_or("-"),
        "rollup complete"
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
