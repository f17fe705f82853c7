use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Shared lifecycle for tasks, micro-sprints and sprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Blocked,
    Completed,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[
            Status::Pending,
            Status::InProgress,
            Status::Blocked,
            Status::Completed,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Blocked => "blocked",
            Status::Completed => "completed",
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, Status::Completed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "in_progress" | "in-progress" => Ok(Status::InProgress),
            "blocked" => Ok(Status::Blocked),
            "completed" | "done" => Ok(Status::Completed),
            _ => Err(crate::error::CardError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    SoftwareDevelopment,
    LegalCase,
    Mixed,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::SoftwareDevelopment => "software_development",
            ProjectType::LegalCase => "legal_case",
            ProjectType::Mixed => "mixed",
        }
    }

    /// Label used in human-readable output.
    pub fn label(self) -> &'static str {
        match self {
            ProjectType::SoftwareDevelopment => "Software development",
            ProjectType::LegalCase => "Legal case",
            ProjectType::Mixed => "Mixed / hybrid",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectType {
    type Err = crate::error::CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "software_development" | "software" => Ok(ProjectType::SoftwareDevelopment),
            "legal_case" | "legal" => Ok(ProjectType::LegalCase),
            "mixed" => Ok(ProjectType::Mixed),
            _ => Err(crate::error::CardError::InvalidProjectType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PersonaType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaType {
    #[default]
    SoftwareEngineer,
    Lawyer,
}

impl PersonaType {
    pub fn as_str(self) -> &'static str {
        match self {
            PersonaType::SoftwareEngineer => "software_engineer",
            PersonaType::Lawyer => "lawyer",
        }
    }

    /// The other persona. There are only two, so toggling is a swap.
    pub fn toggled(self) -> PersonaType {
        match self {
            PersonaType::SoftwareEngineer => PersonaType::Lawyer,
            PersonaType::Lawyer => PersonaType::SoftwareEngineer,
        }
    }
}

impl fmt::Display for PersonaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PersonaType {
    type Err = crate::error::CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "software_engineer" | "engineer" => Ok(PersonaType::SoftwareEngineer),
            "lawyer" => Ok(PersonaType::Lawyer),
            _ => Err(crate::error::CardError::InvalidPersona(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
