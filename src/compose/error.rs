// ABOUTME: Orchestrator error type with the operation that failed as context.
// ABOUTME: Each launcher step maps to its own variant for programmatic handling.

use super::cleanup::CleanupError;
use crate::retry::RetryError;
use crate::runtime::{CommandError, InspectError};
use crate::types::NetworkId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Config(#[from] crate::error::Error),

    #[error("error writing compose file {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error pulling images: {0}")]
    Pull(#[source] CommandError),

    #[error("error killing stale containers: {0}")]
    Kill(#[source] CommandError),

    #[error("error removing stale containers: {0}")]
    Remove(#[source] CommandError),

    #[error("error bringing containers up: {0}")]
    Up(#[source] CommandError),

    #[error("error stopping containers: {0}")]
    Stop(#[source] CommandError),

    #[error("error downing containers: {0}")]
    Down(#[source] CommandError),

    #[error("error pruning volumes: {0}")]
    PruneVolumes(#[source] RetryError<CommandError>),

    #[error("error removing network {network}: {source}")]
    RemoveNetwork {
        network: NetworkId,
        #[source]
        source: RetryError<CommandError>,
    },

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error("could not map container '{name}' to a known service")]
    UnmappedContainer { name: String },

    /// `file` is the rendered configuration, left on disk for manual teardown.
    #[error("error starting containers: {source}")]
    Start {
        file: PathBuf,
        #[source]
        source: Box<RetryError<ComposeError>>,
    },

    #[error("no container {0} found")]
    NotFound(String),

    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeErrorKind {
    /// The configuration or project name was rejected.
    Config,
    /// The rendered file could not be written.
    Io,
    /// A launcher or runtime command failed.
    Command,
    /// Container inspection failed.
    Inspect,
    /// A container could not be attributed to a service.
    Mapping,
    /// Start gave up after exhausting its attempts.
    Start,
    /// A retry wait was interrupted by cancellation.
    Cancelled,
    /// No container is known under the requested key.
    NotFound,
    /// One or more teardown steps failed.
    Cleanup,
}

impl ComposeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ComposeErrorKind {
        match self {
            ComposeError::Config(_) => ComposeErrorKind::Config,
            ComposeError::WriteFile { .. } => ComposeErrorKind::Io,
            ComposeError::Pull(_)
            | ComposeError::Kill(_)
            | ComposeError::Remove(_)
            | ComposeError::Up(_)
            | ComposeError::Stop(_)
            | ComposeError::Down(_) => ComposeErrorKind::Command,
            ComposeError::PruneVolumes(e) | ComposeError::RemoveNetwork { source: e, .. } => {
                if e.is_cancelled() {
                    ComposeErrorKind::Cancelled
                } else {
                    ComposeErrorKind::Command
                }
            }
            ComposeError::Inspect(_) => ComposeErrorKind::Inspect,
            ComposeError::UnmappedContainer { .. } => ComposeErrorKind::Mapping,
            ComposeError::Start { source, .. } => {
                if source.is_cancelled() {
                    ComposeErrorKind::Cancelled
                } else {
                    ComposeErrorKind::Start
                }
            }
            ComposeError::NotFound(_) => ComposeErrorKind::NotFound,
            ComposeError::Cleanup(_) => ComposeErrorKind::Cleanup,
        }
    }
}
