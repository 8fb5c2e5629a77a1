// ABOUTME: Builder for how a compose project is started and torn down.
// ABOUTME: Also the injection point for the span, cancellation, and collaborators.

use crate::config::{ComposeConfig, Settings};
use crate::runtime::{CommandRunner, Inspector};
use crate::types::ProjectName;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Options for [`Compose::start`](super::Compose::start).
#[derive(Clone)]
pub struct Options {
    pub(crate) compose: ComposeConfig,
    pub(crate) project: ProjectName,
    pub(crate) force_pull: bool,
    pub(crate) rm_first: bool,
    pub(crate) keep_around: bool,
    pub(crate) prevent_stop: bool,
    pub(crate) output_file: Option<PathBuf>,
    pub(crate) validate_service_names: bool,
    pub(crate) start_retries: Option<u32>,
    pub(crate) settings: Settings,
    pub(crate) span: Option<Span>,
    pub(crate) cancel: CancellationToken,
    pub(crate) runner: Option<Arc<dyn CommandRunner>>,
    pub(crate) inspector: Option<Arc<dyn Inspector>>,
}

impl Options {
    pub fn new(compose: ComposeConfig) -> Self {
        Self {
            compose,
            project: ProjectName::default(),
            force_pull: false,
            rm_first: false,
            keep_around: false,
            prevent_stop: false,
            output_file: None,
            validate_service_names: true,
            start_retries: None,
            settings: Settings::from_env(),
            span: None,
            cancel: CancellationToken::new(),
            runner: None,
            inspector: None,
        }
    }

    pub fn project_name(mut self, project: ProjectName) -> Self {
        self.project = project;
        self
    }

    /// Pull newer images before starting.
    pub fn force_pull(mut self, force_pull: bool) -> Self {
        self.force_pull = force_pull;
        self
    }

    /// Kill and remove stale project containers before starting. Slow.
    pub fn rm_first(mut self, rm_first: bool) -> Self {
        self.rm_first = rm_first;
        self
    }

    /// Leave containers, volumes and the rendered file behind on cleanup.
    pub fn keep_around(mut self, keep_around: bool) -> Self {
        self.keep_around = keep_around;
        self
    }

    /// Do not stop containers on cleanup.
    pub fn prevent_stop(mut self, prevent_stop: bool) -> Self {
        self.prevent_stop = prevent_stop;
        self
    }

    /// How many times `up` is attempted before giving up.
    ///
    /// Takes precedence over `Settings::start_retries` regardless of order.
    pub fn start_retries(mut self, retries: u32) -> Self {
        self.start_retries = Some(retries);
        self
    }

    /// Render the configuration to `path` instead of a temporary file.
    pub fn write_to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Reject configurations whose service names contain one another.
    pub fn validate_service_names(mut self, validate: bool) -> Self {
        self.validate_service_names = validate;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Span every lifecycle event of this project is recorded under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Token that aborts waits between retry attempts.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn inspector(mut self, inspector: Arc<dyn Inspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }
}
