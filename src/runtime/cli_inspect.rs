// ABOUTME: Inspector backed by the runtime CLI's `inspect` subcommand.
// ABOUTME: Decodes the JSON array the CLI prints into ContainerInfo.

use super::command::CommandRunner;
use super::error::{CommandSnafu, DecodeSnafu, InspectError, NotFoundSnafu};
use super::inspect::{ContainerInfo, ContainerState, Inspector, PortBinding};
use crate::types::ContainerId;
use async_trait::async_trait;
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawContainer {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    config: Option<RawConfig>,
    #[serde(default)]
    state: Option<RawState>,
    #[serde(default)]
    network_settings: Option<RawNetworkSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawConfig {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawState {
    #[serde(default)]
    running: bool,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNetworkSettings {
    #[serde(default)]
    ports: Option<HashMap<String, Option<Vec<RawBinding>>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBinding {
    #[serde(default)]
    host_ip: String,
    #[serde(default)]
    host_port: String,
}

impl From<RawContainer> for ContainerInfo {
    fn from(raw: RawContainer) -> Self {
        let ports = raw
            .network_settings
            .and_then(|n| n.ports)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, bindings)| {
                let bindings = bindings
                    .unwrap_or_default()
                    .into_iter()
                    .map(|b| PortBinding {
                        host_ip: b.host_ip,
                        host_port: b.host_port,
                    })
                    .collect();
                (key, bindings)
            })
            .collect();

        ContainerInfo {
            id: ContainerId::new(raw.id),
            name: raw.name,
            image: raw.config.and_then(|c| c.image).unwrap_or_default(),
            state: raw
                .state
                .map(|s| ContainerState {
                    running: s.running,
                    status: s.status,
                })
                .unwrap_or_default(),
            ports,
        }
    }
}

/// Decode `<runtime> inspect` output for container `id`.
pub fn parse_inspect_output(id: &ContainerId, output: &str) -> Result<ContainerInfo, InspectError> {
    let raw: Vec<RawContainer> =
        serde_json::from_str(output).context(DecodeSnafu { id: id.clone() })?;
    raw.into_iter()
        .next()
        .map(ContainerInfo::from)
        .ok_or_else(|| NotFoundSnafu { id: id.clone() }.build())
}

/// Inspects containers by shelling out to the runtime CLI.
pub struct CliInspector {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl CliInspector {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

#[async_trait]
impl Inspector for CliInspector {
    async fn inspect(&self, id: &ContainerId) -> Result<ContainerInfo, InspectError> {
        let args = vec!["inspect".to_string(), id.as_str().to_string()];
        let output = self
            .runner
            .run(&self.program, &args)
            .await
            .context(CommandSnafu { id: id.clone() })?;
        parse_inspect_output(id, &output)
    }
}
