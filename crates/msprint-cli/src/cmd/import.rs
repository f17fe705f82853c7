use crate::output::{pct, print_json};
use anyhow::Context;
use msprint_core::{config::Config, paths, CardError, MemoryCard};
use std::path::Path;

pub fn run(root: &Path, file: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    let card = MemoryCard::import(file)
        .with_context(|| format!("failed to import {}", file.display()))?;

    let target = paths::card_path(root);
    if target.exists() && !force {
        return Err(CardError::CardExists(target.display().to_string()))
            .context("pass --force to replace it");
    }

    Config::init(root).context("failed to write config.yaml")?;
    let card = super::commit(root, &card)?;
    tracing::info!(source = %file.display(), "card imported");

    let completion = card
        .performance_analytics
        .macro_analysis
        .overall_project_completion;
    if json {
        print_json(&serde_json::json!({
            "project": card.project.name,
            "sprints": card.sprints.len(),
            "overall_project_completion": completion,
        }))?;
    } else {
        println!(
            "Imported '{}' ({} sprints, {} complete)",
            card.project.name,
            card.sprints.len(),
            pct(completion)
        );
    }
    Ok(())
}
