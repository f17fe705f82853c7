use super::{load_card, load_config, mutate};
use crate::output::{hours, pct, print_json, print_table};
use clap::Subcommand;
use msprint_core::{edit, types::Status};
use std::path::Path;

#[derive(Subcommand)]
pub enum MicroSubcommand {
    /// Add a micro-sprint to a sprint
    Add {
        sprint_id: String,
        #[arg(required = true)]
        name: Vec<String>,
        /// Share of the sprint's completion, 0..=1 (default: config defaults.micro_sprint_weight)
        #[arg(long)]
        weight: Option<f64>,
    },
    /// List micro-sprints, optionally for one sprint
    List {
        #[arg(long)]
        sprint: Option<String>,
    },
    /// Set a micro-sprint's status (pending, in_progress, blocked, completed)
    Status { micro_id: String, status: String },
    /// Change a micro-sprint's weight in its sprint
    Weight { micro_id: String, weight: f64 },
    /// Remove a micro-sprint and its tasks
    Remove { micro_id: String },
}

pub fn run(root: &Path, subcmd: MicroSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MicroSubcommand::Add {
            sprint_id,
            name,
            weight,
        } => add(root, &sprint_id, &name.join(" "), weight, json),
        MicroSubcommand::List { sprint } => list(root, sprint.as_deref(), json),
        MicroSubcommand::Status { micro_id, status } => set_status(root, &micro_id, &status, json),
        MicroSubcommand::Weight { micro_id, weight } => set_weight(root, &micro_id, weight, json),
        MicroSubcommand::Remove { micro_id } => remove(root, &micro_id, json),
    }
}

fn add(
    root: &Path,
    sprint_id: &str,
    name: &str,
    weight: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let weight = weight.unwrap_or(cfg.defaults.micro_sprint_weight);
    let (card, id) = mutate(root, |card| {
        edit::add_micro_sprint(card, sprint_id, name, weight)
    })?;

    let weight_total: f64 = card
        .sprints
        .iter()
        .find(|s| s.id == sprint_id)
        .map(|s| s.micro_sprints.iter().map(|ms| ms.weight_in_sprint).sum())
        .unwrap_or(0.0);
    if weight_total > 1.0 + 1e-9 {
        tracing::warn!(sprint = sprint_id, weight_total, "micro-sprint weights exceed 1.0");
    }

    if json {
        print_json(&serde_json::json!({
            "sprint_id": sprint_id,
            "micro_sprint_id": id,
            "name": name.trim(),
            "weight_in_sprint": weight,
            "sprint_weight_total": weight_total,
        }))?;
    } else {
        println!("Added micro-sprint [{id}] to [{sprint_id}]: {} (w={weight:.2})", name.trim());
        if weight_total > 1.0 + 1e-9 {
            println!("note: weights in [{sprint_id}] now sum to {weight_total:.2}; completion is capped at 100%");
        }
    }
    Ok(())
}

fn list(root: &Path, sprint: Option<&str>, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;
    if let Some(id) = sprint {
        if !card.sprints.iter().any(|s| s.id == id) {
            return Err(msprint_core::CardError::SprintNotFound(id.to_string()).into());
        }
    }
    let selected: Vec<_> = card
        .sprints
        .iter()
        .filter(|s| sprint.map_or(true, |id| s.id == id))
        .flat_map(|s| s.micro_sprints.iter().map(move |ms| (s, ms)))
        .collect();

    if json {
        let items: Vec<serde_json::Value> = selected
            .iter()
            .map(|(s, ms)| {
                serde_json::json!({
                    "sprint_id": s.id,
                    "id": ms.id,
                    "name": ms.name,
                    "status": ms.status,
                    "weight_in_sprint": ms.weight_in_sprint,
                    "completion_percentage": ms.completion_percentage,
                    "estimated_hours": ms.estimated_hours,
                    "actual_hours": ms.actual_hours,
                    "task_count": ms.tasks.len(),
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if selected.is_empty() {
        println!("No micro-sprints.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = selected
        .iter()
        .map(|(s, ms)| {
            vec![
                ms.id.clone(),
                s.id.clone(),
                ms.name.clone(),
                ms.status.to_string(),
                format!("{:.2}", ms.weight_in_sprint),
                pct(ms.completion_percentage),
                format!("{}/{}", ms.completed_tasks(), ms.tasks.len()),
                hours(ms.estimated_hours),
            ]
        })
        .collect();
    print_table(
        &["ID", "SPRINT", "NAME", "STATUS", "WEIGHT", "DONE", "TASKS", "EST"],
        rows,
    );
    Ok(())
}

fn set_status(root: &Path, micro_id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let status: Status = status.parse()?;
    let (card, ()) = mutate(root, |card| {
        edit::set_micro_sprint_status(card, micro_id, status)
    })?;
    let effective = edit::find_micro_sprint(&card, micro_id)
        .map(|(_, ms)| ms.status)
        .unwrap_or(status);

    if json {
        print_json(&serde_json::json!({ "micro_sprint_id": micro_id, "status": effective }))?;
    } else {
        println!("Micro-sprint [{micro_id}] is now {effective}");
    }
    Ok(())
}

fn set_weight(root: &Path, micro_id: &str, weight: f64, json: bool) -> anyhow::Result<()> {
    let (card, ()) = mutate(root, |card| edit::set_weight(card, micro_id, weight))?;
    let sprint_completion = edit::find_micro_sprint(&card, micro_id)
        .map(|(s, _)| s.completion_percentage)
        .unwrap_or(0.0);

    if json {
        print_json(&serde_json::json!({
            "micro_sprint_id": micro_id,
            "weight_in_sprint": weight,
            "sprint_completion": sprint_completion,
        }))?;
    } else {
        println!(
            "Micro-sprint [{micro_id}] weight set to {weight:.2}; sprint now {}",
            pct(sprint_completion)
        );
    }
    Ok(())
}

fn remove(root: &Path, micro_id: &str, json: bool) -> anyhow::Result<()> {
    let (_, removed) = mutate(root, |card| edit::remove_micro_sprint(card, micro_id))?;

    if json {
        print_json(&serde_json::json!({ "micro_sprint_id": micro_id, "removed": true }))?;
    } else {
        println!(
            "Removed micro-sprint [{micro_id}]: {} ({} tasks)",
            removed.name,
            removed.tasks.len()
        );
    }
    Ok(())
}
