use super::{commit, today};
use crate::output::print_json;
use anyhow::Context;
use chrono::NaiveDate;
use msprint_core::{
    config::Config,
    draft::{hydrate, DraftProject},
    paths,
    types::{PersonaType, ProjectType},
    CardError,
};
use std::path::Path;

pub fn run(
    root: &Path,
    outline: &Path,
    project_type: &str,
    persona: &str,
    start: Option<NaiveDate>,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let project_type: ProjectType = project_type.parse()?;
    let persona: PersonaType = persona.parse()?;
    let draft = DraftProject::load(outline)
        .with_context(|| format!("failed to read outline {}", outline.display()))?;

    let target = paths::card_path(root);
    if target.exists() && !force {
        return Err(CardError::CardExists(target.display().to_string()))
            .context("pass --force to replace it");
    }

    let card = hydrate(&draft, project_type, persona, start.unwrap_or_else(today))
        .context("failed to build card from outline")?;
    Config::init(root).context("failed to write config.yaml")?;
    let card = commit(root, &card)?;

    let task_count: usize = card
        .sprints
        .iter()
        .flat_map(|s| s.micro_sprints.iter())
        .map(|ms| ms.tasks.len())
        .sum();
    if json {
        print_json(&serde_json::json!({
            "project": card.project.name,
            "sprints": card.sprints.len(),
            "tasks": task_count,
            "current_sprint": card.project.current_sprint,
        }))?;
    } else {
        println!(
            "Drafted '{}': {} sprints, {} tasks",
            card.project.name,
            card.sprints.len(),
            task_count
        );
        if let Some(sprint) = card.current_sprint() {
            println!("Current sprint: {} [{}]", sprint.name, sprint.id);
        }
    }
    Ok(())
}
