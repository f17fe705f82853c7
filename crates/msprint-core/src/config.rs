use crate::error::{CardError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// DefaultsConfig
// ---------------------------------------------------------------------------

/// Values the editing commands fall back to when a flag is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_sprint_duration")]
    pub sprint_duration_days: u32,
    #[serde(default = "default_micro_weight")]
    pub micro_sprint_weight: f64,
    #[serde(default = "default_task_estimate")]
    pub task_estimate_hours: f64,
    #[serde(default)]
    pub owner: Option<String>,
}

fn default_sprint_duration() -> u32 {
    7
}

fn default_micro_weight() -> f64 {
    0.5
}

fn default_task_estimate() -> f64 {
    1.0
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            sprint_duration_days: default_sprint_duration(),
            micro_sprint_weight: default_micro_weight(),
            task_estimate_hours: default_task_estimate(),
            owner: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exports land in; relative paths resolve against the root.
    /// `None` means the project root itself.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl ExportConfig {
    pub fn resolve_dir(&self, root: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: DefaultsConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CardError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one is already present.
    pub fn init(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Config::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let d = &self.defaults;

        if !d.micro_sprint_weight.is_finite() || !(0.0..=1.0).contains(&d.micro_sprint_weight) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "defaults.micro_sprint_weight={} must be between 0 and 1",
                    d.micro_sprint_weight
                ),
            });
        }

        if !d.task_estimate_hours.is_finite() || d.task_estimate_hours < 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "defaults.task_estimate_hours={} must be a non-negative number",
                    d.task_estimate_hours
                ),
            });
        } else if d.task_estimate_hours > 16.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "defaults.task_estimate_hours={} (>16h is unusually large for one task)",
                    d.task_estimate_hours
                ),
            });
        }

        if d.sprint_duration_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "defaults.sprint_duration_days must be at least 1".to_string(),
            });
        } else if d.sprint_duration_days > 31 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "defaults.sprint_duration_days={} (>31 is unusual)",
                    d.sprint_duration_days
                ),
            });
        }

        if let Some(owner) = &d.owner {
            if owner.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "defaults.owner is set but empty".to_string(),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
