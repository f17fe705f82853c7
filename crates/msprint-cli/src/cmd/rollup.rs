use super::commit;
use crate::output::{pct, print_json};
use anyhow::Context;
use msprint_core::{paths, MemoryCard};
use serde_json::Value;
use std::path::Path;

/// Repairs a hand-edited card in place. `load` already rolls up, so the
/// stale comparison has to start from the raw file. A card whose derived
/// fields are right can still need rewriting when the lenient reader coerced
/// something (a numeric string, an unknown status); that shows up as a
/// difference between the file's JSON tree and the serialized card.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let raw = MemoryCard::load_unrolled(root).context("failed to load card")?;
    let path = paths::card_path(root);
    let on_disk: Value = serde_json::from_str(
        &std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
    )?;

    let rolled = msprint_core::rollup(&raw);
    let stale = rolled != raw;
    let normalized = serde_json::to_value(&rolled)? != on_disk;
    let changed = stale || normalized;

    let card = if changed {
        tracing::info!(stale, normalized, "saving repaired card");
        commit(root, &rolled)?
    } else {
        rolled
    };
    let completion = card
        .performance_analytics
        .macro_analysis
        .overall_project_completion;

    if json {
        print_json(&serde_json::json!({
            "changed": changed,
            "stale": stale,
            "normalized": normalized,
            "overall_project_completion": completion,
            "current_sprint": card.project.current_sprint,
        }))?;
    } else if changed {
        println!("Repaired card. Overall completion: {}", pct(completion));
    } else {
        println!("Card already consistent. Overall completion: {}", pct(completion));
    }
    Ok(())
}
