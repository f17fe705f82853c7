use super::load_card;
use crate::output::{hours, pct, print_json};
use msprint_core::types::Status;
use std::path::Path;

fn check(status: Status) -> &'static str {
    match status {
        Status::Completed => "[x]",
        Status::InProgress => "[~]",
        Status::Blocked => "[!]",
        Status::Pending => "[ ]",
    }
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;

    if json {
        return print_json(&card);
    }

    println!("{} ({})", card.project.name, card.project.project_type.label());
    if !card.project.description.is_empty() {
        println!("{}", card.project.description);
    }
    if card.sprints.is_empty() {
        println!("\nNo sprints yet. Add one with `msprint sprint add <name>`.");
        return Ok(());
    }

    let current = card.project.current_sprint.as_deref();
    for sprint in &card.sprints {
        let marker = if Some(sprint.id.as_str()) == current { " *" } else { "" };
        println!();
        println!(
            "{} {} [{}] {}{}",
            check(sprint.status),
            sprint.name,
            sprint.id,
            pct(sprint.completion_percentage),
            marker
        );
        let summary = &sprint.sprint_summary;
        println!(
            "    tasks {}/{}  est {}  actual {}  efficiency {:.2}",
            summary.completed_tasks,
            summary.total_tasks,
            hours(summary.total_estimated_hours),
            hours(summary.total_actual_hours),
            summary.efficiency_ratio
        );
        for ms in &sprint.micro_sprints {
            println!(
                "    {} {} [{}] w={:.2} {}",
                check(ms.status),
                ms.name,
                ms.id,
                ms.weight_in_sprint,
                pct(ms.completion_percentage)
            );
            for task in &ms.tasks {
                println!(
                    "        {} {} [{}] {}/{}",
                    check(task.status),
                    task.description,
                    task.id,
                    hours(task.actual_hours),
                    hours(task.estimated_hours)
                );
                for blocker in &task.blockers {
                    println!("            blocked: {blocker}");
                }
            }
        }
    }
    Ok(())
}
