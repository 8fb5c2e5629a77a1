// ABOUTME: Inspector backed by the Docker Engine API via bollard.
// ABOUTME: Avoids a process spawn per inspection when a socket is reachable.

use super::error::{ApiSnafu, InspectError};
use super::inspect::{ContainerInfo, ContainerState, Inspector, PortBinding};
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::ContainerStateStatusEnum;
use bollard::query_parameters::InspectContainerOptions;
use snafu::IntoError;
use std::collections::HashMap;

/// Inspects containers through the Docker-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct BollardInspector {
    client: Docker,
}

impl BollardInspector {
    pub fn new(client: Docker) -> Self {
        Self { client }
    }

    /// Connect using `DOCKER_HOST` or the platform's default socket.
    pub fn connect() -> Result<Self, bollard::errors::Error> {
        Ok(Self::new(Docker::connect_with_local_defaults()?))
    }
}

fn status_name(status: ContainerStateStatusEnum) -> &'static str {
    match status {
        ContainerStateStatusEnum::CREATED => "created",
        ContainerStateStatusEnum::RUNNING => "running",
        ContainerStateStatusEnum::PAUSED => "paused",
        ContainerStateStatusEnum::RESTARTING => "restarting",
        ContainerStateStatusEnum::REMOVING => "removing",
        ContainerStateStatusEnum::EXITED => "exited",
        ContainerStateStatusEnum::DEAD => "dead",
        _ => "",
    }
}

#[async_trait]
impl Inspector for BollardInspector {
    async fn inspect(&self, id: &ContainerId) -> Result<ContainerInfo, InspectError> {
        let details = match self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
        {
            Ok(details) => details,
            Err(bollard::errors::Error::DockerResponseServerError { status_code, .. })
                if status_code == 404 =>
            {
                return Err(InspectError::NotFound { id: id.clone() });
            }
            Err(source) => return Err(ApiSnafu { id: id.clone() }.into_error(source)),
        };

        let state = details
            .state
            .as_ref()
            .map(|s| ContainerState {
                running: s.running.unwrap_or(false),
                status: s.status.map(status_name).unwrap_or_default().to_string(),
            })
            .unwrap_or_default();

        let mut ports = HashMap::new();
        if let Some(port_map) = details.network_settings.and_then(|n| n.ports) {
            for (key, bindings) in port_map {
                let bindings = bindings
                    .unwrap_or_default()
                    .into_iter()
                    .map(|b| PortBinding {
                        host_ip: b.host_ip.unwrap_or_default(),
                        host_port: b.host_port.unwrap_or_default(),
                    })
                    .collect();
                ports.insert(key, bindings);
            }
        }

        Ok(ContainerInfo {
            id: details
                .id
                .map(ContainerId::new)
                .unwrap_or_else(|| id.clone()),
            name: details.name.unwrap_or_default(),
            image: details
                .config
                .and_then(|c| c.image)
                .unwrap_or_default(),
            state,
            ports,
        })
    }
}
