// ABOUTME: Inspection trait and the container facts the orchestrator relies on.
// ABOUTME: Includes published-port lookup used by callers to dial services.

use super::error::{InspectError, InvalidPortSnafu, PortNotPublishedSnafu};
use crate::types::ContainerId;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// Returns runtime facts about a running container.
#[async_trait]
pub trait Inspector: Send + Sync {
    async fn inspect(&self, id: &ContainerId) -> Result<ContainerInfo, InspectError>;
}

/// Container lifecycle state as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerState {
    pub running: bool,
    /// Runtime status string, e.g. "running" or "exited".
    pub status: String,
}

/// A host address a container port is published on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortBinding {
    pub host_ip: String,
    pub host_port: String,
}

/// Inspection result for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub id: ContainerId,
    /// Name as reported by the runtime, with its leading '/'.
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    /// Published ports keyed by "<port>/<protocol>", e.g. "6379/tcp".
    pub ports: HashMap<String, Vec<PortBinding>>,
}

impl ContainerInfo {
    /// The name without the runtime's leading '/'.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }

    /// Host port that container `port`/`protocol` is published on.
    ///
    /// When the port has several bindings the first one wins.
    pub fn first_public_port(&self, port: u16, protocol: &str) -> Result<u16, InspectError> {
        let key = format!("{}/{}", port, protocol);
        let binding = self
            .ports
            .get(&key)
            .and_then(|bindings| bindings.first())
            .ok_or_else(|| {
                PortNotPublishedSnafu {
                    id: self.id.clone(),
                    port,
                    protocol,
                }
                .build()
            })?;

        binding.host_port.parse().map_err(|_| {
            InvalidPortSnafu {
                id: self.id.clone(),
                value: binding.host_port.as_str(),
            }
            .build()
        })
    }

    /// Like [`ContainerInfo::first_public_port`], but panics on error.
    pub fn must_first_public_port(&self, port: u16, protocol: &str) -> u16 {
        match self.first_public_port(port, protocol) {
            Ok(port) => port,
            Err(e) => panic!("{}", e),
        }
    }
}
