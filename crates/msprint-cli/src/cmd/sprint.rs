use super::{load_card, load_config, mutate, today};
use crate::output::{pct, print_json, print_table};
use chrono::NaiveDate;
use clap::Subcommand;
use msprint_core::{edit, types::Status};
use std::path::Path;

#[derive(Subcommand)]
pub enum SprintSubcommand {
    /// Add a pending sprint
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        /// Planned duration in days (default: config defaults.sprint_duration_days)
        #[arg(long)]
        days: Option<u32>,
        /// Start date, YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// List sprints with completion and summary figures
    List,
    /// Mark a sprint in progress
    Start { sprint_id: String },
    /// Mark a sprint completed and record its actual end date
    Finish { sprint_id: String },
    /// Mark a sprint blocked
    Block { sprint_id: String },
    /// Put a sprint back to pending
    Reopen { sprint_id: String },
    /// Remove a sprint with all its micro-sprints and tasks
    Remove { sprint_id: String },
}

pub fn run(root: &Path, subcmd: SprintSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SprintSubcommand::Add { name, days, start } => add(root, &name.join(" "), days, start, json),
        SprintSubcommand::List => list(root, json),
        SprintSubcommand::Start { sprint_id } => transition(root, &sprint_id, Status::InProgress, json),
        SprintSubcommand::Finish { sprint_id } => transition(root, &sprint_id, Status::Completed, json),
        SprintSubcommand::Block { sprint_id } => transition(root, &sprint_id, Status::Blocked, json),
        SprintSubcommand::Reopen { sprint_id } => transition(root, &sprint_id, Status::Pending, json),
        SprintSubcommand::Remove { sprint_id } => remove(root, &sprint_id, json),
    }
}

fn add(
    root: &Path,
    name: &str,
    days: Option<u32>,
    start: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let days = days.unwrap_or(cfg.defaults.sprint_duration_days);
    let start = start.unwrap_or_else(today);
    let (card, id) = mutate(root, |card| edit::add_sprint(card, name, start, days))?;

    let end = card
        .sprints
        .iter()
        .find(|s| s.id == id)
        .and_then(|s| s.planned_end_date);
    if json {
        print_json(&serde_json::json!({
            "sprint_id": id,
            "name": name.trim(),
            "start_date": start,
            "planned_end_date": end,
            "current_sprint": card.project.current_sprint,
        }))?;
    } else {
        println!("Added sprint [{id}]: {}", name.trim());
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;

    if json {
        let items: Vec<serde_json::Value> = card
            .sprints
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "name": s.name,
                    "status": s.status,
                    "completion_percentage": s.completion_percentage,
                    "start_date": s.start_date,
                    "planned_end_date": s.planned_end_date,
                    "sprint_summary": s.sprint_summary,
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if card.sprints.is_empty() {
        println!("No sprints.");
        return Ok(());
    }

    let current = card.project.current_sprint.as_deref();
    let rows: Vec<Vec<String>> = card
        .sprints
        .iter()
        .map(|s| {
            let id = if Some(s.id.as_str()) == current {
                format!("{} *", s.id)
            } else {
                s.id.clone()
            };
            vec![
                id,
                s.name.clone(),
                s.status.to_string(),
                pct(s.completion_percentage),
                format!(
                    "{}/{}",
                    s.sprint_summary.completed_tasks, s.sprint_summary.total_tasks
                ),
                s.planned_end_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "STATUS", "DONE", "TASKS", "ENDS"], rows);
    Ok(())
}

fn transition(root: &Path, sprint_id: &str, status: Status, json: bool) -> anyhow::Result<()> {
    let (card, ()) = mutate(root, |card| edit::set_sprint_status(card, sprint_id, status))?;
    // The rollup may move an explicit in_progress/blocked straight on.
    let effective = card
        .sprints
        .iter()
        .find(|s| s.id == sprint_id)
        .map(|s| s.status)
        .unwrap_or(status);

    if json {
        print_json(&serde_json::json!({
            "sprint_id": sprint_id,
            "status": effective,
            "current_sprint": card.project.current_sprint,
        }))?;
    } else {
        println!("Sprint [{sprint_id}] is now {effective}");
    }
    Ok(())
}

fn remove(root: &Path, sprint_id: &str, json: bool) -> anyhow::Result<()> {
    let (_, removed) = mutate(root, |card| edit::remove_sprint(card, sprint_id))?;

    if json {
        print_json(&serde_json::json!({ "sprint_id": sprint_id, "removed": true }))?;
    } else {
        println!("Removed sprint [{sprint_id}]: {}", removed.name);
    }
    Ok(())
}
