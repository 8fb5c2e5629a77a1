// ABOUTME: Lifecycle of one compose project: render, start, resolve, probe, tear down.
// ABOUTME: All launcher and runtime traffic goes through injectable collaborators.

use super::cleanup::CleanupError;
use super::error::ComposeError;
use super::identity::IdentityResolver;
use super::options::Options;
use crate::config::{ComposeConfig, Settings};
use crate::retry::{self, RetryError, RetryPolicy};
use crate::runtime::{CliInspector, ContainerInfo, Inspector, Launcher, ProcessRunner};
use crate::types::{ContainerId, ProjectName};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, info, warn};

/// Where the effective configuration was written.
#[derive(Debug)]
enum RenderedFile {
    Provided(PathBuf),
    /// Deleted when the project is cleaned up, unless kept around.
    Temporary(NamedTempFile),
}

impl RenderedFile {
    fn write(yaml: &str, path: Option<&Path>) -> Result<Self, ComposeError> {
        match path {
            Some(path) => {
                std::fs::write(path, yaml).map_err(|source| ComposeError::WriteFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(RenderedFile::Provided(path.to_path_buf()))
            }
            None => {
                let temp_dir = std::env::temp_dir();
                let write_error = |source| ComposeError::WriteFile {
                    path: temp_dir.clone(),
                    source,
                };
                let mut file = tempfile::Builder::new()
                    .prefix("docker-compose-")
                    .suffix(".yaml")
                    .tempfile()
                    .map_err(write_error)?;
                std::io::Write::write_all(&mut file, yaml.as_bytes()).map_err(write_error)?;
                Ok(RenderedFile::Temporary(file))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            RenderedFile::Provided(path) => path,
            RenderedFile::Temporary(file) => file.path(),
        }
    }

    /// Stop a temporary file from being deleted.
    fn keep(self) -> Result<PathBuf, ComposeError> {
        match self {
            RenderedFile::Provided(path) => Ok(path),
            RenderedFile::Temporary(file) => {
                let path = file.path().to_path_buf();
                file.keep()
                    .map(|(_, path)| path)
                    .map_err(|e| ComposeError::WriteFile {
                        path,
                        source: e.error,
                    })
            }
        }
    }
}

/// A running compose project.
///
/// Obtained from [`Compose::start`]. Containers are keyed by the service name
/// they were started for. Call [`Compose::cleanup`] when done; dropping the
/// value without it leaves the containers running.
pub struct Compose {
    project: ProjectName,
    config: ComposeConfig,
    file: RenderedFile,
    launcher: Launcher,
    inspector: Arc<dyn Inspector>,
    resolver: IdentityResolver,
    ids: Vec<ContainerId>,
    containers: BTreeMap<String, ContainerInfo>,
    keep_around: bool,
    prevent_stop: bool,
    settings: Settings,
    span: Span,
    cancel: CancellationToken,
}

impl fmt::Debug for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compose")
            .field("project", &self.project)
            .field("file", &self.file.path())
            .field("ids", &self.ids)
            .field("services", &self.containers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Compose {
    /// Render the configuration, bring the project up and map its containers.
    ///
    /// `up` is retried `start_retries` times with a doubling delay. An attempt
    /// fails when the launcher fails, an inspection fails, or a container
    /// cannot be attributed to a service. When every attempt fails, a
    /// temporary rendered file is kept and its path returned in the error.
    pub async fn start(options: Options) -> Result<Self, ComposeError> {
        let span = options
            .span
            .clone()
            .unwrap_or_else(|| tracing::info_span!("compose", project = %options.project));
        Self::start_in(options, span.clone()).instrument(span).await
    }

    async fn start_in(options: Options, span: Span) -> Result<Self, ComposeError> {
        info!("initializing");

        let config = options.compose.without_networks();
        if options.validate_service_names {
            config.validate_service_names()?;
        }
        let yaml = config.to_yaml()?;
        let file = RenderedFile::write(&yaml, options.output_file.as_deref())?;
        info!("wrote compose configuration to {}", file.path().display());

        let settings = options.settings;
        let start_retries = options.start_retries.unwrap_or(settings.start_retries);
        let runner = options
            .runner
            .unwrap_or_else(|| Arc::new(ProcessRunner));
        let inspector = options.inspector.unwrap_or_else(|| {
            Arc::new(CliInspector::new(runner.clone(), settings.runtime.clone()))
        });
        let launcher = Launcher::new(
            runner,
            settings.launcher.clone(),
            settings.runtime.clone(),
            file.path(),
            options.project.clone(),
        );

        if options.force_pull {
            info!("pulling images");
            launcher.pull().await.map_err(ComposeError::Pull)?;
        }

        if options.rm_first {
            warn!("rm_first is slow and wasteful, avoid it");
            info!("killing and removing stale containers");
            launcher.kill().await.map_err(ComposeError::Kill)?;
            launcher.remove().await.map_err(ComposeError::Remove)?;
        }

        let mut compose = Compose {
            project: options.project,
            config,
            file,
            launcher,
            inspector,
            resolver: IdentityResolver::new(),
            ids: Vec::new(),
            containers: BTreeMap::new(),
            keep_around: options.keep_around,
            prevent_stop: options.prevent_stop,
            settings,
            span,
            cancel: options.cancel,
        };

        let converged = retry::retry_operation(
            start_retries,
            compose.settings.start_retry_delay,
            &compose.cancel,
            || compose.converge(),
        )
        .await;
        let (ids, containers) = match converged {
            Ok(converged) => converged,
            Err(source) => {
                let path = compose.file.path().to_path_buf();
                let file = compose.file.keep().unwrap_or_else(|e| {
                    warn!("{}", e);
                    path
                });
                warn!(
                    "start failed, compose file kept at {} for manual teardown",
                    file.display()
                );
                return Err(ComposeError::Start {
                    file,
                    source: Box::new(source),
                });
            }
        };
        compose.ids = ids;
        compose.containers = containers;

        info!("done initializing");
        info!(
            "tail logs via: {}",
            compose
                .launcher
                .tail_logs_hint(compose.containers.keys().map(String::as_str))
        );
        Ok(compose)
    }

    /// Like [`Compose::start`], but panics on error.
    pub async fn must_start(options: Options) -> Self {
        match Self::start(options).await {
            Ok(compose) => compose,
            Err(e) => panic!("{}", e),
        }
    }

    /// One start attempt: `up`, scrape the ids it reports, then map them.
    async fn converge(
        &self,
    ) -> Result<(Vec<ContainerId>, BTreeMap<String, ContainerInfo>), ComposeError> {
        let output = self.launcher.up().await.map_err(ComposeError::Up)?;
        info!("containers started");

        let ids = self.resolver.container_ids(&output);
        let containers = self
            .resolve(&ids)
            .await
            .inspect_err(|e| warn!("retrying after: {}", e))?;
        Ok((ids, containers))
    }

    /// Inspect each id and key it by the service its name contains.
    async fn resolve(
        &self,
        ids: &[ContainerId],
    ) -> Result<BTreeMap<String, ContainerInfo>, ComposeError> {
        let mut containers = BTreeMap::new();
        for id in ids {
            let info = self.inspector.inspect(id).await?;
            let service = self
                .resolver
                .service_for(info.short_name(), self.config.service_names())
                .ok_or_else(|| ComposeError::UnmappedContainer {
                    name: info.short_name().to_string(),
                })?;
            containers.insert(service.to_string(), info);
        }
        Ok(containers)
    }

    /// Re-inspect every known container.
    ///
    /// The mapping is only replaced when every container resolves.
    pub async fn refresh(&mut self) -> Result<(), ComposeError> {
        let containers = self
            .resolve(&self.ids)
            .instrument(self.span.clone())
            .await?;
        self.containers = containers;
        Ok(())
    }

    /// Fresh inspection data for the container of service `key`.
    pub async fn get_container(&mut self, key: &str) -> Result<&ContainerInfo, ComposeError> {
        self.refresh().await?;
        self.containers
            .get(key)
            .ok_or_else(|| ComposeError::NotFound(key.to_string()))
    }

    /// Call `probe` until it succeeds or `policy` gives up.
    ///
    /// Waits between attempts are cut short if the project's cancellation
    /// token fires.
    pub async fn connect<P, T, E, F, Fut>(&self, policy: P, probe: F) -> Result<T, RetryError<E>>
    where
        P: RetryPolicy,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        retry::connect(policy, &self.cancel, probe)
            .instrument(self.span.clone())
            .await
    }

    /// Stop and remove the project.
    ///
    /// Every step runs even when an earlier one failed; the returned error
    /// lists all failures. With `keep_around` only the stop runs and the
    /// rendered file is left on disk.
    pub async fn cleanup(self) -> Result<(), ComposeError> {
        let span = self.span.clone();
        self.cleanup_in().instrument(span).await
    }

    async fn cleanup_in(self) -> Result<(), ComposeError> {
        let mut failures = CleanupError::default();

        if !self.prevent_stop {
            failures.check(self.launcher.stop().await.map_err(ComposeError::Stop));
        }

        if self.keep_around {
            match self.file.keep() {
                Ok(path) => info!("keeping containers and {}", path.display()),
                Err(e) => failures.record(e),
            }
            return Ok(failures.into_result()?);
        }

        info!("removing stale containers, images, volumes, and networks");
        failures.check(self.launcher.kill().await.map_err(ComposeError::Kill));
        failures.check(self.launcher.down().await.map_err(ComposeError::Down));
        failures.check(
            retry::retry_operation(
                self.settings.cleanup_retries,
                self.settings.cleanup_retry_delay,
                &self.cancel,
                || self.launcher.prune_volumes(),
            )
            .await
            .map_err(ComposeError::PruneVolumes),
        );

        Ok(failures.into_result()?)
    }

    /// Like [`Compose::cleanup`], but panics on error.
    pub async fn must_cleanup(self) {
        if let Err(e) = self.cleanup().await {
            panic!("{}", e);
        }
    }

    /// Remove the project's default network.
    ///
    /// `down` normally takes care of this; use it after a `keep_around`
    /// session or a crashed run.
    pub async fn remove_default_network(&self) -> Result<(), ComposeError> {
        let network = self.project.default_network();
        let result = retry::retry_operation(
            self.settings.cleanup_retries,
            self.settings.cleanup_retry_delay,
            &self.cancel,
            || self.launcher.remove_network(&network),
        )
        .instrument(self.span.clone())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(source) => Err(ComposeError::RemoveNetwork { network, source }),
        }
    }

    /// Containers keyed by service name.
    pub fn containers(&self) -> &BTreeMap<String, ContainerInfo> {
        &self.containers
    }

    /// Cached inspection data for service `key`, without refreshing.
    pub fn container(&self, key: &str) -> Option<&ContainerInfo> {
        self.containers.get(key)
    }

    /// Ids scraped from the last successful `up`.
    pub fn container_ids(&self) -> &[ContainerId] {
        &self.ids
    }

    pub fn project_name(&self) -> &ProjectName {
        &self.project
    }

    /// Path of the rendered configuration handed to the launcher.
    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    /// The effective configuration, with networks stripped.
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Token that cuts retry waits short.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Replace the token that cuts retry waits short.
    ///
    /// Teardown after a cancelled session needs a fresh token, otherwise
    /// the volume prune gives up after its first failure.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
