// ABOUTME: Declarative compose file schema and stevedore settings.
// ABOUTME: Handles YAML parsing, network stripping, and service-name validation.

mod deserialize;
mod healthcheck;
mod network;
mod service;
mod settings;
mod volume;

pub use healthcheck::HealthCheck;
pub use network::Network;
pub use service::Service;
pub use settings::{LAUNCHER_ENV, RUNTIME_ENV, Settings};
pub use volume::{Volume, VolumeSpec};

use crate::error::{Error, Result};
use deserialize::string_or_number;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// A compose file: the unit the launcher brings up and tears down.
///
/// Services are keyed by their logical name. A `BTreeMap` keeps rendering and
/// container-to-service matching deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeConfig {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, Option<Network>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ComposeConfig {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, name: impl Into<String>, service: Service) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Copy of this configuration with every network declaration removed,
    /// both at project level and on each service. The launcher then attaches
    /// all services to the project's implicit default network.
    pub fn without_networks(&self) -> Self {
        let mut stripped = self.clone();
        stripped.networks.clear();
        for service in stripped.services.values_mut() {
            service.networks.clear();
        }
        stripped
    }

    /// Containers are matched to services by substring, so no service name
    /// may contain another one.
    pub fn validate_service_names(&self) -> Result<()> {
        for short in self.services.keys() {
            if let Some(long) = self
                .services
                .keys()
                .find(|long| *long != short && long.contains(short.as_str()))
            {
                return Err(Error::AmbiguousServiceNames {
                    short: short.clone(),
                    long: long.clone(),
                });
            }
        }
        Ok(())
    }
}
