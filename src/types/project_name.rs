// ABOUTME: Normalized compose project name.
// ABOUTME: Lower-cases and strips underscores the way the launcher prefixes resources.

use super::id::NetworkId;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_PROJECT_NAME: &str = "stevedore";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectNameError {
    #[error("project name cannot be empty")]
    Empty,

    #[error("invalid character in project name: '{0}'")]
    InvalidChar(char),
}

/// Namespace the launcher applies to every container, network and volume of
/// one project.
///
/// Docker Compose lower-cases the name and drops underscores before prefixing
/// runtime names, so the same normalization is applied here up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(value: &str) -> Result<Self, ProjectNameError> {
        let normalized: String = value
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        if normalized.is_empty() {
            return Err(ProjectNameError::Empty);
        }

        if let Some(c) = normalized
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(ProjectNameError::InvalidChar(c));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the implicit network the launcher creates for this project.
    pub fn default_network(&self) -> NetworkId {
        NetworkId::new(format!("{}_default", self.0))
    }
}

impl Default for ProjectName {
    fn default() -> Self {
        Self(DEFAULT_PROJECT_NAME.to_string())
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
