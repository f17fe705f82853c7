pub mod config;
pub mod decision;
pub mod draft;
pub mod export;
pub mod import;
pub mod init;
pub mod micro;
pub mod persona;
pub mod rollup;
pub mod show;
pub mod sprint;
pub mod status;
pub mod task;

use anyhow::Context;
use msprint_core::{config::Config, CardError, MemoryCard};
use std::path::Path;

pub fn load_card(root: &Path) -> anyhow::Result<MemoryCard> {
    MemoryCard::load(root).context("failed to load card")
}

/// Config is optional for everything except `config` itself: a card imported
/// into a bare directory still works with built-in defaults.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    match Config::load(root) {
        Ok(cfg) => Ok(cfg),
        Err(CardError::NotInitialized) => Ok(Config::default()),
        Err(e) => Err(e).context("failed to load config.yaml"),
    }
}

/// Load the card, apply one edit, roll up, stamp and save.
pub fn mutate<T>(
    root: &Path,
    edit: impl FnOnce(&mut MemoryCard) -> msprint_core::Result<T>,
) -> anyhow::Result<(MemoryCard, T)> {
    let mut card = load_card(root)?;
    let out = edit(&mut card)?;
    let card = commit(root, &card)?;
    Ok((card, out))
}

pub fn commit(root: &Path, card: &MemoryCard) -> anyhow::Result<MemoryCard> {
    let mut card = msprint_core::rollup(card);
    card.touch();
    card.save(root).context("failed to save card")?;
    Ok(card)
}

pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
