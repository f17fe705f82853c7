use super::load_card;
use crate::output::{bar, hours, pct, print_json};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;
    let analytics = &card.performance_analytics;
    let macro_a = &analytics.macro_analysis;

    if json {
        print_json(&serde_json::json!({
            "project": card.project,
            "active_persona": card.active_persona().map(|p| p.name.clone()),
            "macro_analysis": macro_a,
            "current_sprint": analytics.micro_analysis.current_sprint,
            "last_modified": card.app_metadata.last_modified,
        }))?;
        return Ok(());
    }

    println!(
        "Project: {}   Type: {}   Owner: {}",
        card.project.name,
        card.project.project_type.label(),
        card.project.owner
    );
    if let Some(persona) = card.active_persona() {
        println!("Persona: {}", persona.name);
    }
    println!();

    println!(
        "COMPLETION  {} {}",
        bar(macro_a.overall_project_completion, 20),
        pct(macro_a.overall_project_completion)
    );
    println!(
        "SPRINTS     Completed: {} | In Progress: {} | Pending: {} | Total: {}",
        macro_a.sprints_completed,
        macro_a.sprints_in_progress,
        macro_a.sprints_pending,
        card.sprints.len()
    );
    println!(
        "HOURS       Invested: {} | Remaining: {} | Avg efficiency: {:.2} | Avg velocity: {:.1}",
        hours(macro_a.total_hours_invested),
        hours(macro_a.total_hours_estimated_remaining),
        macro_a.average_sprint_efficiency,
        macro_a.average_velocity
    );
    if !macro_a.estimated_completion_date.is_empty() {
        println!("ETA         {}", macro_a.estimated_completion_date);
    }
    println!();

    match (card.current_sprint(), &analytics.micro_analysis.current_sprint) {
        (Some(sprint), Some(snap)) => {
            println!("CURRENT SPRINT  {} [{}] ({})", sprint.name, sprint.id, sprint.status);
            println!(
                "  {} {}   velocity: {}   blocked tasks: {}",
                bar(snap.completion, 20),
                pct(snap.completion),
                snap.current_velocity,
                snap.blocked_tasks
            );
            if let Some(end) = sprint.planned_end_date {
                println!("  planned end: {end}");
            }
        }
        _ => println!("CURRENT SPRINT  none"),
    }

    Ok(())
}
