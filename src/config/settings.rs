// ABOUTME: Tool and timing settings for launcher invocations.
// ABOUTME: Loadable from YAML with humantime durations, overridable from the environment.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const LAUNCHER_ENV: &str = "STEVEDORE_LAUNCHER";
pub const RUNTIME_ENV: &str = "STEVEDORE_RUNTIME";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Compose binary that understands the rendered file.
    #[serde(default = "default_launcher")]
    pub launcher: String,

    /// Container runtime binary used for inspect and prune.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Attempts at bringing the project up.
    #[serde(default = "default_start_retries")]
    pub start_retries: u32,

    /// First delay between start attempts; doubles after every failure.
    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub start_retry_delay: Duration,

    /// Attempts at volume prune and network removal during teardown.
    #[serde(default = "default_cleanup_retries")]
    pub cleanup_retries: u32,

    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub cleanup_retry_delay: Duration,
}

fn default_launcher() -> String {
    "docker-compose".to_string()
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_start_retries() -> u32 {
    3
}

fn default_cleanup_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(2)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            launcher: default_launcher(),
            runtime: default_runtime(),
            start_retries: default_start_retries(),
            start_retry_delay: default_retry_delay(),
            cleanup_retries: default_cleanup_retries(),
            cleanup_retry_delay: default_retry_delay(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults with `STEVEDORE_LAUNCHER` / `STEVEDORE_RUNTIME` applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(launcher) = non_empty_var(LAUNCHER_ENV) {
            self.launcher = launcher;
        }
        if let Some(runtime) = non_empty_var(RUNTIME_ENV) {
            self.runtime = runtime;
        }
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
