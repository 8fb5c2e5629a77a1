// ABOUTME: Inspection error types with SNAFU pattern.
// ABOUTME: Unifies CLI and API backend failures for programmatic handling.

use snafu::Snafu;

use super::command::CommandError;
use crate::types::ContainerId;

/// Failure to inspect a container or read its inspection data.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum InspectError {
    #[snafu(display("error inspecting container {id}: {source}"))]
    Command { id: ContainerId, source: CommandError },

    #[snafu(display("cannot decode inspection of container {id}: {source}"))]
    Decode {
        id: ContainerId,
        source: serde_json::Error,
    },

    #[snafu(display("docker API error inspecting container {id}: {source}"))]
    Api {
        id: ContainerId,
        source: bollard::errors::Error,
    },

    #[snafu(display("container {id} not found"))]
    NotFound { id: ContainerId },

    #[snafu(display("container {id} does not publish port {port}/{protocol}"))]
    PortNotPublished {
        id: ContainerId,
        port: u16,
        protocol: String,
    },

    #[snafu(display("container {id} has unparsable host port '{value}'"))]
    InvalidPort { id: ContainerId, value: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectErrorKind {
    /// The inspection backend could not be reached or failed.
    Backend,
    /// The backend answered with data we could not read.
    Decode,
    /// No such container.
    NotFound,
    /// The requested port lookup failed.
    Port,
}

impl InspectError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> InspectErrorKind {
        match self {
            InspectError::Command { .. } | InspectError::Api { .. } => InspectErrorKind::Backend,
            InspectError::Decode { .. } => InspectErrorKind::Decode,
            InspectError::NotFound { .. } => InspectErrorKind::NotFound,
            InspectError::PortNotPublished { .. } | InspectError::InvalidPort { .. } => {
                InspectErrorKind::Port
            }
        }
    }

    /// The container the failure concerns.
    pub fn container_id(&self) -> &ContainerId {
        match self {
            InspectError::Command { id, .. }
            | InspectError::Decode { id, .. }
            | InspectError::Api { id, .. }
            | InspectError::NotFound { id }
            | InspectError::PortNotPublished { id, .. }
            | InspectError::InvalidPort { id, .. } => id,
        }
    }
}
