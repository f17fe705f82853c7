use super::{load_card, mutate};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use msprint_core::edit::{self, DecisionInput};
use std::path::Path;

#[derive(Subcommand)]
pub enum DecisionSubcommand {
    /// Record a decision
    Add {
        #[arg(required = true)]
        decision: Vec<String>,
        #[arg(long, default_value = "")]
        rationale: String,
        /// Alternative considered (repeatable)
        #[arg(long = "alternative")]
        alternatives: Vec<String>,
        #[arg(long, default_value = "")]
        impact: String,
        /// Who decided (default: the project owner)
        #[arg(long = "by")]
        decided_by: Option<String>,
        /// Sprint the decision belongs to
        #[arg(long)]
        sprint: Option<String>,
        /// Micro-sprint the decision belongs to
        #[arg(long)]
        micro: Option<String>,
    },
    /// List recorded decisions, oldest first
    List,
}

pub fn run(root: &Path, subcmd: DecisionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DecisionSubcommand::Add {
            decision,
            rationale,
            alternatives,
            impact,
            decided_by,
            sprint,
            micro,
        } => {
            let input = DecisionInput {
                decision: decision.join(" "),
                rationale,
                alternatives_considered: alternatives,
                impact,
                decided_by: decided_by.unwrap_or_default(),
                sprint_context: sprint,
                micro_sprint_context: micro,
            };
            add(root, input, json)
        }
        DecisionSubcommand::List => list(root, json),
    }
}

fn add(root: &Path, mut input: DecisionInput, json: bool) -> anyhow::Result<()> {
    let (_, id) = mutate(root, |card| {
        if input.decided_by.trim().is_empty() {
            input.decided_by = card.project.owner.clone();
        }
        edit::record_decision(card, input)
    })?;

    if json {
        print_json(&serde_json::json!({ "decision_id": id }))?;
    } else {
        println!("Recorded decision [{id}]");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let card = load_card(root)?;

    if json {
        print_json(&card.decisions_log)?;
        return Ok(());
    }

    if card.decisions_log.is_empty() {
        println!("No decisions recorded.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = card
        .decisions_log
        .iter()
        .map(|d| {
            vec![
                d.timestamp.format("%Y-%m-%d").to_string(),
                d.decided_by.clone(),
                d.sprint_context.clone().unwrap_or_else(|| "-".to_string()),
                d.decision.clone(),
            ]
        })
        .collect();
    print_table(&["DATE", "BY", "SPRINT", "DECISION"], rows);
    Ok(())
}
