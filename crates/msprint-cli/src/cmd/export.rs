use super::{load_card, load_config, mutate, today};
use crate::output::print_json;
use anyhow::Context;
use msprint_core::edit;
use std::path::Path;

pub fn run(root: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => load_config(root)?.export.resolve_dir(root),
    };

    // The exported file is the card as it stands; the export record is only
    // appended to the card kept in the project.
    let card = load_card(root)?;
    let path = card
        .export(&dir, today())
        .with_context(|| format!("failed to export to {}", dir.display()))?;
    let written = path.display().to_string();
    mutate(root, |card| {
        edit::record_export(card, written.clone());
        Ok(())
    })?;

    if json {
        print_json(&serde_json::json!({ "path": written }))?;
    } else {
        println!("Exported to {written}");
    }
    Ok(())
}
