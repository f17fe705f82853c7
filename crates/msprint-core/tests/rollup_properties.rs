//! Property-based tests for the rollup engine.
//!
//! Verifies, over arbitrary card hierarchies:
//! - rollup is idempotent and never mutates its input
//! - every completion percentage stays within [0, 100]
//! - micro-sprint hours equal the sum of their tasks
//! - efficiency and velocity figures are always finite

use proptest::prelude::*;

use msprint_core::card::{MemoryCard, MicroSprint, Sprint, Task};
use msprint_core::rollup::{rollup, rollup_micro_sprint, rollup_sprint};
use msprint_core::types::{ProjectType, Status};

// =============================================================================
// Proptest strategies
// =============================================================================

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Pending),
        Just(Status::InProgress),
        Just(Status::Blocked),
        Just(Status::Completed),
    ]
}

/// Hours are either exactly zero or a positive amount, so zero-estimate
/// paths get exercised regularly.
fn arb_hours() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.25f64..80.0]
}

fn arb_task() -> impl Strategy<Value = Task> {
    (arb_status(), arb_hours(), arb_hours()).prop_map(|(status, est, actual)| {
        let mut t = Task::new("t", "task", est);
        t.status = status;
        t.actual_hours = actual;
        t
    })
}

fn arb_micro_sprint() -> impl Strategy<Value = MicroSprint> {
    (
        arb_status(),
        0.0f64..=1.0,
        prop::collection::vec(arb_task(), 0..6),
        0.0f64..500.0,
    )
        .prop_map(|(status, weight, tasks, stale)| {
            let mut ms = MicroSprint::new("ms", "micro", weight);
            ms.status = status;
            // Garbage in the derived fields must be overwritten.
            ms.completion_percentage = stale;
            ms.estimated_hours = stale;
            ms.tasks = tasks;
            ms
        })
}

fn arb_sprint() -> impl Strategy<Value = Sprint> {
    (
        arb_status(),
        prop::collection::vec(arb_micro_sprint(), 0..4),
    )
        .prop_map(|(status, micro_sprints)| {
            let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
            let mut s = Sprint::new("s", "sprint", start, 7);
            s.status = status;
            s.micro_sprints = micro_sprints;
            s
        })
}

fn arb_card() -> impl Strategy<Value = MemoryCard> {
    prop::collection::vec(arb_sprint(), 0..5).prop_map(|sprints| {
        let mut card = MemoryCard::new("prop", ProjectType::Mixed, "", "proptest");
        card.sprints = sprints
            .into_iter()
            .enumerate()
            .map(|(i, mut s)| {
                s.id = format!("sprint_{i}");
                s
            })
            .collect();
        card
    })
}

fn in_bounds(pct: f64) -> bool {
    pct.is_finite() && (0.0..=100.0).contains(&pct)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn rollup_is_idempotent(card in arb_card()) {
        let once = rollup(&card);
        let twice = rollup(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn rollup_leaves_input_untouched(card in arb_card()) {
        let before = card.clone();
        let _ = rollup(&card);
        prop_assert_eq!(card, before);
    }

    #[test]
    fn completion_always_in_bounds(card in arb_card()) {
        let out = rollup(&card);
        for sprint in &out.sprints {
            prop_assert!(in_bounds(sprint.completion_percentage));
            for ms in &sprint.micro_sprints {
                prop_assert!(in_bounds(ms.completion_percentage));
            }
        }
        let analytics = &out.performance_analytics;
        prop_assert!(in_bounds(analytics.macro_analysis.overall_project_completion));
        if let Some(snap) = &analytics.micro_analysis.current_sprint {
            prop_assert!(in_bounds(snap.completion));
        }
    }

    #[test]
    fn micro_sprint_hours_are_conserved(ms in arb_micro_sprint()) {
        let out = rollup_micro_sprint(&ms);
        let est: f64 = ms.tasks.iter().map(|t| t.estimated_hours).sum();
        let actual: f64 = ms.tasks.iter().map(|t| t.actual_hours).sum();
        prop_assert_eq!(out.estimated_hours, est);
        prop_assert_eq!(out.actual_hours, actual);
        prop_assert!(out.estimated_hours >= 0.0);
        prop_assert!(out.actual_hours >= 0.0);
    }

    #[test]
    fn micro_sprint_completion_matches_task_ratio(ms in arb_micro_sprint()) {
        let out = rollup_micro_sprint(&ms);
        if ms.tasks.is_empty() {
            let expected = if ms.status == Status::Completed { 100.0 } else { 0.0 };
            prop_assert_eq!(out.completion_percentage, expected);
            prop_assert_eq!(out.status, ms.status);
        } else {
            let done = ms.tasks.iter().filter(|t| t.status == Status::Completed).count();
            let expected = 100.0 * done as f64 / ms.tasks.len() as f64;
            prop_assert_eq!(out.completion_percentage, expected);
            if done == 0 {
                prop_assert_eq!(out.status, ms.status);
            }
        }
    }

    #[test]
    fn sprint_terminal_states_hold(sprint in arb_sprint()) {
        let out = rollup_sprint(&sprint);
        if matches!(sprint.status, Status::Pending | Status::Completed) {
            prop_assert_eq!(out.status, sprint.status);
        }
        prop_assert!(out.sprint_summary.efficiency_ratio.is_finite());
        prop_assert!(out.sprint_summary.completed_tasks <= out.sprint_summary.total_tasks);
    }

    #[test]
    fn project_figures_are_finite(card in arb_card()) {
        let analysis = rollup(&card).performance_analytics.macro_analysis;
        prop_assert!(analysis.average_sprint_efficiency.is_finite());
        prop_assert!(analysis.average_velocity.is_finite());
        prop_assert!(analysis.total_hours_invested.is_finite());
        prop_assert!(analysis.total_hours_estimated_remaining >= 0.0);
    }

    #[test]
    fn zero_estimates_give_zero_efficiency(card in arb_card()) {
        let mut card = card;
        for task in card
            .sprints
            .iter_mut()
            .flat_map(|s| s.micro_sprints.iter_mut())
            .flat_map(|ms| ms.tasks.iter_mut())
        {
            task.estimated_hours = 0.0;
        }
        let out = rollup(&card);
        prop_assert_eq!(out.performance_analytics.macro_analysis.average_sprint_efficiency, 0.0);
        for sprint in &out.sprints {
            prop_assert_eq!(sprint.sprint_summary.efficiency_ratio, 0.0);
        }
    }

    #[test]
    fn current_sprint_points_at_active_or_pending(card in arb_card()) {
        let out = rollup(&card);
        let has_active = out.sprints.iter().any(|s| s.status == Status::InProgress);
        let has_pending = out.sprints.iter().any(|s| s.status == Status::Pending);
        match out.current_sprint() {
            Some(current) if has_active => prop_assert_eq!(current.status, Status::InProgress),
            Some(current) => prop_assert_eq!(current.status, Status::Pending),
            None => prop_assert!(!has_active && !has_pending),
        }
    }
}
