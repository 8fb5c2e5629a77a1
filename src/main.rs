// ABOUTME: Entry point for the stevedore CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use output::{Output, OutputMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stevedore::compose::{Compose, ComposeError, Options};
use stevedore::config::{ComposeConfig, Settings};
use stevedore::error::Error;
use stevedore::runtime::BollardInspector;
use stevedore::types::ProjectName;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ComposeError> {
    match cli.command {
        Commands::Up {
            file,
            project,
            force_pull,
            rm_first,
            retries,
            keep_around,
            prevent_stop,
            output_file,
            settings,
            docker_api,
            quiet,
            json,
        } => {
            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };
            let settings = match settings {
                Some(path) => Settings::load(&path)?.with_env_overrides(),
                None => Settings::from_env(),
            };

            let mut options = Options::new(ComposeConfig::load(&file)?)
                .project_name(ProjectName::new(&project).map_err(Error::from)?)
                .settings(settings)
                .force_pull(force_pull)
                .rm_first(rm_first)
                .keep_around(keep_around)
                .prevent_stop(prevent_stop);
            if let Some(retries) = retries {
                options = options.start_retries(retries);
            }
            if let Some(path) = output_file {
                options = options.write_to_file(path);
            }
            if docker_api {
                let inspector = BollardInspector::connect().map_err(Error::from)?;
                options = options.inspector(Arc::new(inspector));
            }

            up(options, Output::new(mode)).await
        }
        Commands::Render { file } => render(&file),
        Commands::Host => {
            println!("{}", stevedore::infer_docker_host()?);
            Ok(())
        }
    }
}

/// Start the project and keep it up until Ctrl-C.
///
/// Ctrl-C during start skips the remaining retry waits. Teardown runs with
/// its own token so the volume prune keeps its retries; a second Ctrl-C
/// cuts those short.
async fn up(options: Options, mut output: Output) -> Result<(), ComposeError> {
    let shutdown = CancellationToken::new();
    let teardown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        let teardown = teardown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                teardown.cancel();
            }
        }
    });

    output.start_timer();
    output.progress("Starting project...");
    let compose = match Compose::start(options.cancellation(shutdown.clone())).await {
        Ok(compose) => compose,
        Err(e) => {
            output.error(&e.to_string());
            if let ComposeError::Start { file, .. } = &e {
                output.error(&format!("Compose file kept at {}", file.display()));
            }
            return Err(e);
        }
    };

    output.containers(compose.containers());
    output.success(&format!(
        "Project {} is up, press Ctrl-C to tear it down",
        compose.project_name()
    ));

    shutdown.cancelled().await;

    output.progress("Tearing down...");
    let file: PathBuf = compose.file_path().to_path_buf();
    compose.with_cancellation(teardown).cleanup().await?;
    output.success(&format!("Cleaned up project rendered to {}", file.display()));
    Ok(())
}

fn render(file: &Path) -> Result<(), ComposeError> {
    let config = ComposeConfig::load(file)?.without_networks();
    print!("{}", config.to_yaml()?);
    Ok(())
}
