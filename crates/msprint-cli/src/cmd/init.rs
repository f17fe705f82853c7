use super::load_config;
use crate::output::print_json;
use anyhow::Context;
use msprint_core::{
    config::Config,
    paths,
    types::{PersonaType, ProjectType},
    CardError, MemoryCard,
};
use std::path::Path;

pub struct InitArgs {
    pub name: Option<String>,
    pub project_type: String,
    pub description: String,
    pub owner: Option<String>,
    pub persona: Option<String>,
}

fn default_owner(cfg: &Config) -> String {
    cfg.defaults
        .owner
        .clone()
        .filter(|o| !o.trim().is_empty())
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn run(root: &Path, args: InitArgs, json: bool) -> anyhow::Result<()> {
    let project_type: ProjectType = args.project_type.parse()?;
    let persona: Option<PersonaType> = args.persona.as_deref().map(str::parse).transpose()?;
    let name = args
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string());

    if !json {
        println!("Initializing msprint in: {}", root.display());
    }

    let config_created = Config::init(root).context("failed to write config.yaml")?;
    let cfg = load_config(root)?;
    let owner = args.owner.unwrap_or_else(|| default_owner(&cfg));

    let mut card = MemoryCard::new(&name, project_type, args.description, owner);
    if let Some(p) = persona {
        card.project.active_persona = p;
    }
    let card = msprint_core::rollup(&card);

    let card_created = match MemoryCard::create(root, &card) {
        Ok(()) => true,
        Err(CardError::CardExists(_)) => false,
        Err(e) => return Err(e).context("failed to write card.json"),
    };
    if card_created {
        tracing::info!(project = %name, "card created");
    }

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": config_created,
            "card_created": card_created,
            "project": name,
        }))?;
        return Ok(());
    }

    let mark = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", mark(config_created), paths::CONFIG_FILE);
    println!("  {} {}", mark(card_created), paths::CARD_FILE);
    if card_created {
        println!("\nProject '{name}' ({}) ready.", project_type.label());
    }
    Ok(())
}
