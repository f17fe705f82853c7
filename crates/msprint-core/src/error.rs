use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("not initialized: run 'msprint init'")]
    NotInitialized,

    #[error("card already exists at {0}")]
    CardExists(String),

    #[error("sprint not found: {0}")]
    SprintNotFound(String),

    #[error("micro-sprint not found: {0}")]
    MicroSprintNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid project type '{0}': expected software_development, legal_case or mixed")]
    InvalidProjectType(String),

    #[error("invalid persona '{0}': expected software_engineer or lawyer")]
    InvalidPersona(String),

    #[error("invalid weight {0}: must be between 0 and 1")]
    InvalidWeight(f64),

    #[error("invalid hours {0}: must be a non-negative number")]
    InvalidHours(f64),

    #[error("invalid duration of {0} days: sprint end date is out of range")]
    InvalidDuration(u32),

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CardError>;
