// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use stevedore::runtime::ContainerInfo;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print the service to container mapping.
    pub fn containers(&self, containers: &BTreeMap<String, ContainerInfo>) {
        match self.mode {
            OutputMode::Normal => {
                let width = containers.keys().map(String::len).max().unwrap_or(0).max(7);
                println!("{:<width$}  {:<12}  {:<10}  NAME", "SERVICE", "CONTAINER", "STATUS");
                for (service, info) in containers {
                    let id: String = info.id.as_str().chars().take(12).collect();
                    println!(
                        "{:<width$}  {:<12}  {:<10}  {}",
                        service,
                        id,
                        info.state.status,
                        info.short_name()
                    );
                }
            }
            OutputMode::Quiet => {
                for (service, info) in containers {
                    println!("{service} {}", info.id);
                }
            }
            OutputMode::Json => {
                for (service, info) in containers {
                    let row = ContainerRow {
                        event: "container",
                        service,
                        container: info,
                    };
                    if let Ok(json) = serde_json::to_string(&row) {
                        println!("{json}");
                    }
                }
            }
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct ContainerRow<'a> {
    event: &'a str,
    service: &'a str,
    #[serde(flatten)]
    container: &'a ContainerInfo,
}
