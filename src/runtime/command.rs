// ABOUTME: External command execution with combined stdout/stderr capture.
// ABOUTME: Failures carry the diagnostic lines scraped from the launcher's output.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Line prefixes the compose launcher uses for meaningful errors.
const DIAGNOSTIC_PREFIXES: [&str; 2] = ["ERROR:", "compose.cli.errors"];

/// Errors from running an external program.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed reading output of {command}: {source}")]
    Read {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("failed running {command}: {}: {}", exit_status(.exit_code), .details.join(": "))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        /// Diagnostic lines, or the whole output when none were found.
        details: Vec<String>,
        output: String,
    },
}

impl CommandError {
    /// Build a [`CommandError::Failed`], scraping `output` for diagnostics.
    pub fn failed(
        command: impl Into<String>,
        exit_code: Option<i32>,
        output: impl Into<String>,
    ) -> Self {
        let output = output.into();
        let mut details = diagnostic_lines(&output);
        if details.is_empty() {
            details.push(output.clone());
        }
        CommandError::Failed {
            command: command.into(),
            exit_code,
            details,
            output,
        }
    }

    /// Combined output of the failed program, if it ran at all.
    pub fn output(&self) -> Option<&str> {
        match self {
            CommandError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Lines of `output` that start with a known diagnostic prefix.
pub fn diagnostic_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| DIAGNOSTIC_PREFIXES.iter().any(|p| line.starts_with(p)))
        .map(str::to_string)
        .collect()
}

/// Runs an external program and returns its combined output.
///
/// The orchestrator only talks to the outside world through this trait, so
/// tests can substitute a scripted implementation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Runs programs as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

fn push_line(combined: &mut String, command: &str, line: &[u8]) {
    let line = String::from_utf8_lossy(line);
    tracing::trace!(command, "{}", line.trim_end_matches('\r'));
    combined.push_str(&line);
    combined.push('\n');
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let command_line = format!("{} {}", program, args.join(" "));
        tracing::debug!("running {}", command_line);

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let stdout = child.stdout.take().expect("stdout is piped");
        let stderr = child.stderr.take().expect("stderr is piped");
        let mut out_lines = BufReader::new(stdout).split(b'\n');
        let mut err_lines = BufReader::new(stderr).split(b'\n');

        let read_error = |source| CommandError::Read {
            command: command_line.clone(),
            source,
        };

        let mut combined = String::new();
        let (mut out_done, mut err_done) = (false, false);
        while !(out_done && err_done) {
            tokio::select! {
                segment = out_lines.next_segment(), if !out_done => {
                    match segment.map_err(read_error)? {
                        Some(line) => push_line(&mut combined, &command_line, &line),
                        None => out_done = true,
                    }
                }
                segment = err_lines.next_segment(), if !err_done => {
                    match segment.map_err(read_error)? {
                        Some(line) => push_line(&mut combined, &command_line, &line),
                        None => err_done = true,
                    }
                }
            }
        }

        let status = child.wait().await.map_err(read_error)?;
        if status.success() {
            Ok(combined)
        } else {
            Err(CommandError::failed(command_line, status.code(), combined))
        }
    }
}
