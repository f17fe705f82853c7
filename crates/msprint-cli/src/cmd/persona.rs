use super::{load_card, mutate};
use crate::output::print_json;
use clap::Subcommand;
use msprint_core::{edit, types::PersonaType};
use std::path::Path;

#[derive(Subcommand)]
pub enum PersonaSubcommand {
    /// Show the active persona and its focus
    Show,
    /// Switch to a persona (software_engineer or lawyer)
    Set { persona: String },
    /// Switch to the other persona
    Toggle,
}

pub fn run(root: &Path, subcmd: PersonaSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PersonaSubcommand::Show => show(root, json),
        PersonaSubcommand::Set { persona } => {
            let persona: PersonaType = persona.parse()?;
            mutate(root, |card| {
                edit::set_persona(card, persona);
                Ok(())
            })?;
            report(persona, json)
        }
        PersonaSubcommand::Toggle => {
            let (_, persona) = mutate(root, |card| Ok(edit::toggle_persona(card)))?;
            report(persona, json)
        }
    }
}

fn report(persona: PersonaType, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "active_persona": persona }))?;
    } else {
        println!("Active persona: {persona}");
    }
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;
    let active = card.project.active_persona;

    if json {
        print_json(&serde_json::json!({
            "active_persona": active,
            "definition": card.active_persona(),
        }))?;
        return Ok(());
    }

    match card.active_persona() {
        Some(def) => {
            println!("{} ({active})", def.name);
            if !def.expertise.is_empty() {
                println!("  expertise: {}", def.expertise);
            }
            if !def.tone.is_empty() {
                println!("  tone:      {}", def.tone);
            }
            if !def.focus_areas.is_empty() {
                println!("  focus:     {}", def.focus_areas.join(", "));
            }
            if !def.metrics_priority.is_empty() {
                println!("  metrics:   {}", def.metrics_priority.join(", "));
            }
        }
        None => println!("{active} (no definition in this card)"),
    }
    Ok(())
}
