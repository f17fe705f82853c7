use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use msprint_core::config::{Config, WarnLevel};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective config
    Show,

    /// Set one config value
    Set {
        /// sprint_duration_days, micro_sprint_weight, task_estimate_hours, owner or export_dir
        key: String,
        /// New value; an empty string clears owner / export_dir
        value: String,
    },

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Set { key, value } => set(root, &key, &value, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        print_json(&config)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn set(root: &Path, key: &str, value: &str, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    let defaults = &mut config.defaults;
    match key {
        "sprint_duration_days" => {
            defaults.sprint_duration_days = value
                .parse()
                .with_context(|| format!("'{value}' is not a whole number of days"))?;
        }
        "micro_sprint_weight" => {
            defaults.micro_sprint_weight = value
                .parse()
                .with_context(|| format!("'{value}' is not a number"))?;
        }
        "task_estimate_hours" => {
            defaults.task_estimate_hours = value
                .parse()
                .with_context(|| format!("'{value}' is not a number"))?;
        }
        "owner" => defaults.owner = optional(value),
        "export_dir" => config.export.dir = optional(value).map(PathBuf::from),
        other => anyhow::bail!(
            "unknown config key '{other}': expected sprint_duration_days, micro_sprint_weight, \
             task_estimate_hours, owner or export_dir"
        ),
    }

    let errors: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|w| w.level == WarnLevel::Error)
        .map(|w| w.message)
        .collect();
    if !errors.is_empty() {
        anyhow::bail!("refusing to save invalid config: {}", errors.join("; "));
    }
    config.save(root).context("failed to write config.yaml")?;

    if json {
        print_json(&serde_json::json!({ "key": key, "value": value, "updated": true }))?;
    } else {
        println!("Set {key} = {value}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
