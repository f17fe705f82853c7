use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MSPRINT_DIR: &str = ".msprint";
pub const CONFIG_FILE: &str = ".msprint/config.yaml";
pub const CARD_FILE: &str = ".msprint/card.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn msprint_dir(root: &Path) -> PathBuf {
    root.join(MSPRINT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn card_path(root: &Path) -> PathBuf {
    root.join(CARD_FILE)
}

// ---------------------------------------------------------------------------
// Export file naming
// ---------------------------------------------------------------------------

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// `project_{name}_{YYYY-MM-DD}.json`, with whitespace runs in the name
/// collapsed to `_`, path separators dropped, and the result lowercased.
pub fn export_file_name(project_name: &str, date: NaiveDate) -> String {
    let cleaned: String = project_name
        .trim()
        .chars()
        .filter(|c| *c != '/' && *c != '\\')
        .collect();
    let slug = whitespace_re().replace_all(&cleaned, "_").to_lowercase();
    format!("project_{slug}_{}.json", date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.msprint/config.yaml")
        );
        assert_eq!(card_path(root), PathBuf::from("/tmp/proj/.msprint/card.json"));
        assert_eq!(msprint_dir(root), PathBuf::from("/tmp/proj/.msprint"));
    }

    #[test]
    fn export_name_collapses_whitespace() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(
            export_file_name("JurisdicLaw   Migration Plan", date),
            "project_jurisdiclaw_migration_plan_2026-10-15.json"
        );
    }

    #[test]
    fn export_name_drops_path_separators() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(
            export_file_name("../etc/Passwd", date),
            "project_..etcpasswd_2026-01-02.json"
        );
    }
}
