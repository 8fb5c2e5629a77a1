// ABOUTME: Configuration-level error types for stevedore.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::types::ProjectNameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid project name: {0}")]
    ProjectName(#[from] ProjectNameError),

    #[error(
        "service name '{short}' is contained in service name '{long}', containers cannot be mapped unambiguously"
    )]
    AmbiguousServiceNames { short: String, long: String },

    #[error("cannot parse DOCKER_HOST '{0}'")]
    DockerHost(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("docker API error: {0}")]
    DockerApi(#[from] bollard::errors::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
