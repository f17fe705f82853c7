use super::{load_card, load_config, mutate};
use crate::output::{hours, print_json, print_table};
use clap::Subcommand;
use msprint_core::{
    edit::{self, TaskEdit},
    types::Status,
    MemoryCard,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task to a micro-sprint
    Add {
        micro_id: String,
        #[arg(required = true)]
        description: Vec<String>,
        /// Estimated hours (default: config defaults.task_estimate_hours)
        #[arg(long)]
        hours: Option<f64>,
    },
    /// List tasks, optionally for one micro-sprint
    List {
        #[arg(long)]
        micro: Option<String>,
    },
    /// Flip a task between completed and pending
    Toggle { task_id: String },
    /// Set a task's status (pending, in_progress, blocked, completed)
    Status { task_id: String, status: String },
    /// Mark a task as blocked
    Block {
        task_id: String,
        #[arg(required = true)]
        reason: Vec<String>,
    },
    /// Record actual hours spent
    Hours { task_id: String, hours: f64 },
    /// Edit task fields
    Edit {
        task_id: String,
        #[arg(long)]
        description: Option<String>,
        /// Update the estimate
        #[arg(long)]
        hours: Option<f64>,
        /// Replace notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a task
    Remove { task_id: String },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            micro_id,
            description,
            hours,
        } => add(root, &micro_id, &description.join(" "), hours, json),
        TaskSubcommand::List { micro } => list(root, micro.as_deref(), json),
        TaskSubcommand::Toggle { task_id } => toggle(root, &task_id, json),
        TaskSubcommand::Status { task_id, status } => set_status(root, &task_id, &status, json),
        TaskSubcommand::Block { task_id, reason } => block(root, &task_id, &reason.join(" "), json),
        TaskSubcommand::Hours { task_id, hours } => log_hours(root, &task_id, hours, json),
        TaskSubcommand::Edit {
            task_id,
            description,
            hours,
            notes,
        } => edit_fields(
            root,
            &task_id,
            TaskEdit {
                description,
                estimated_hours: hours,
                notes,
            },
            json,
        ),
        TaskSubcommand::Remove { task_id } => remove(root, &task_id, json),
    }
}

/// Completion of the micro-sprint and sprint holding `task_id`, after rollup.
fn parent_progress(card: &MemoryCard, task_id: &str) -> serde_json::Value {
    match edit::locate_task(card, task_id) {
        Some(loc) => serde_json::json!({
            "sprint_id": loc.sprint.id,
            "sprint_completion": loc.sprint.completion_percentage,
            "micro_sprint_id": loc.micro_sprint.id,
            "micro_sprint_completion": loc.micro_sprint.completion_percentage,
        }),
        None => serde_json::Value::Null,
    }
}

fn add(
    root: &Path,
    micro_id: &str,
    description: &str,
    hours: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = load_config(root)?;
    let estimate = hours.unwrap_or(cfg.defaults.task_estimate_hours);
    let (card, id) = mutate(root, |card| edit::add_task(card, micro_id, description, estimate))?;

    if json {
        print_json(&serde_json::json!({
            "task_id": id,
            "description": description.trim(),
            "estimated_hours": estimate,
            "parent": parent_progress(&card, &id),
        }))?;
    } else {
        println!("Added task [{id}]: {}", description.trim());
    }
    Ok(())
}

fn list(root: &Path, micro: Option<&str>, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;
    if let Some(id) = micro {
        if edit::find_micro_sprint(&card, id).is_none() {
            return Err(msprint_core::CardError::MicroSprintNotFound(id.to_string()).into());
        }
    }
    let tasks: Vec<_> = card
        .sprints
        .iter()
        .flat_map(|s| s.micro_sprints.iter())
        .filter(|ms| micro.map_or(true, |id| ms.id == id))
        .flat_map(|ms| ms.tasks.iter().map(move |t| (ms, t)))
        .collect();

    if json {
        let items = tasks
            .iter()
            .map(|(ms, t)| {
                let mut v = serde_json::to_value(t)?;
                if let Some(obj) = v.as_object_mut() {
                    obj.insert("micro_sprint_id".into(), ms.id.clone().into());
                }
                Ok(v)
            })
            .collect::<serde_json::Result<Vec<_>>>()?;
        print_json(&items)?;
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|(ms, t)| {
            vec![
                t.id.clone(),
                ms.id.clone(),
                t.status.to_string(),
                hours(t.estimated_hours),
                hours(t.actual_hours),
                t.description.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "MICRO", "STATUS", "EST", "ACTUAL", "DESCRIPTION"], rows);
    Ok(())
}

fn toggle(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let (card, status) = mutate(root, |card| edit::toggle_task(card, task_id))?;

    if json {
        print_json(&serde_json::json!({
            "task_id": task_id,
            "status": status,
            "parent": parent_progress(&card, task_id),
        }))?;
    } else {
        let verb = if status.is_completed() { "Completed" } else { "Reopened" };
        println!("{verb} task [{task_id}]");
    }
    Ok(())
}

fn set_status(root: &Path, task_id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let status: Status = status.parse()?;
    let (card, ()) = mutate(root, |card| edit::set_task_status(card, task_id, status))?;

    if json {
        print_json(&serde_json::json!({
            "task_id": task_id,
            "status": status,
            "parent": parent_progress(&card, task_id),
        }))?;
    } else {
        println!("Task [{task_id}] is now {status}");
    }
    Ok(())
}

fn block(root: &Path, task_id: &str, reason: &str, json: bool) -> anyhow::Result<()> {
    mutate(root, |card| edit::block_task(card, task_id, reason))?;

    if json {
        print_json(&serde_json::json!({
            "task_id": task_id,
            "status": "blocked",
            "reason": reason,
        }))?;
    } else {
        println!("Blocked task [{task_id}]: {reason}");
    }
    Ok(())
}

fn log_hours(root: &Path, task_id: &str, hours_spent: f64, json: bool) -> anyhow::Result<()> {
    mutate(root, |card| edit::log_hours(card, task_id, hours_spent))?;

    if json {
        print_json(&serde_json::json!({ "task_id": task_id, "actual_hours": hours_spent }))?;
    } else {
        println!("Task [{task_id}] actual hours: {}", hours(hours_spent));
    }
    Ok(())
}

fn edit_fields(root: &Path, task_id: &str, fields: TaskEdit, json: bool) -> anyhow::Result<()> {
    mutate(root, |card| edit::edit_task(card, task_id, fields))?;

    if json {
        print_json(&serde_json::json!({ "task_id": task_id, "updated": true }))?;
    } else {
        println!("Updated task [{task_id}]");
    }
    Ok(())
}

fn remove(root: &Path, task_id: &str, json: bool) -> anyhow::Result<()> {
    let (_, removed) = mutate(root, |card| edit::remove_task(card, task_id))?;

    if json {
        print_json(&serde_json::json!({ "task_id": task_id, "removed": true }))?;
    } else {
        println!("Removed task [{task_id}]: {}", removed.description);
    }
    Ok(())
}
