// ABOUTME: Argument construction for the compose launcher and container runtime CLIs.
// ABOUTME: Every compose invocation is scoped to one rendered file and project.

use super::command::{CommandError, CommandRunner};
use crate::types::{NetworkId, ProjectName};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Invokes `docker-compose` (or a compatible launcher) for one project.
#[derive(Clone)]
pub struct Launcher {
    runner: Arc<dyn CommandRunner>,
    program: String,
    runtime: String,
    file: PathBuf,
    project: ProjectName,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("program", &self.program)
            .field("runtime", &self.runtime)
            .field("file", &self.file)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl Launcher {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        runtime: impl Into<String>,
        file: impl Into<PathBuf>,
        project: ProjectName,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            runtime: runtime.into(),
            file: file.into(),
            project,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Prefix shared by every compose call: `-f <file> -p <project>`.
    pub fn base_args(&self) -> Vec<String> {
        vec![
            "-f".to_string(),
            self.file.display().to_string(),
            "-p".to_string(),
            self.project.as_str().to_string(),
        ]
    }

    async fn compose(&self, extra: &[&str]) -> Result<String, CommandError> {
        let mut args = self.base_args();
        args.extend(extra.iter().map(|a| a.to_string()));
        self.runner.run(&self.program, &args).await
    }

    pub async fn pull(&self) -> Result<String, CommandError> {
        self.compose(&["pull"]).await
    }

    pub async fn kill(&self) -> Result<String, CommandError> {
        self.compose(&["kill"]).await
    }

    pub async fn remove(&self) -> Result<String, CommandError> {
        self.compose(&["rm", "--force", "-v"]).await
    }

    /// Verbose output is required: container ids are scraped from it.
    pub async fn up(&self) -> Result<String, CommandError> {
        self.compose(&["--verbose", "up", "-d"]).await
    }

    pub async fn stop(&self) -> Result<String, CommandError> {
        self.compose(&["stop"]).await
    }

    pub async fn down(&self) -> Result<String, CommandError> {
        self.compose(&["down", "-v", "--remove-orphans"]).await
    }

    /// Run the container runtime CLI directly, outside the project scope.
    pub async fn runtime(&self, args: &[&str]) -> Result<String, CommandError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(&self.runtime, &args).await
    }

    pub async fn prune_volumes(&self) -> Result<String, CommandError> {
        self.runtime(&["volume", "prune", "-f"]).await
    }

    pub async fn remove_network(&self, network: &NetworkId) -> Result<String, CommandError> {
        self.runtime(&["network", "rm", network.as_str()]).await
    }

    /// Command a user can run to follow the logs of `services`.
    pub fn tail_logs_hint<'a>(&self, services: impl IntoIterator<Item = &'a str>) -> String {
        let mut hint = format!(
            "{} -p {} -f {} logs -f",
            self.program,
            self.project,
            self.file.display()
        );
        for service in services {
            hint.push(' ');
            hint.push_str(service);
        }
        hint
    }
}
