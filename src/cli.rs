// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stevedore")]
#[command(about = "Bring up a Docker Compose project for tests and tear it down again")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a project, print its containers, and clean up on Ctrl-C
    Up {
        /// Compose file to start
        #[arg(short, long)]
        file: PathBuf,

        /// Project name (lowercased, underscores removed)
        #[arg(short, long, default_value = stevedore::types::DEFAULT_PROJECT_NAME)]
        project: String,

        /// Pull newer images first
        #[arg(long)]
        force_pull: bool,

        /// Kill and remove stale containers first
        #[arg(long)]
        rm_first: bool,

        /// Attempts at bringing the project up
        #[arg(long)]
        retries: Option<u32>,

        /// Leave containers and the rendered file behind
        #[arg(long)]
        keep_around: bool,

        /// Do not stop containers on teardown
        #[arg(long)]
        prevent_stop: bool,

        /// Write the rendered compose file here instead of a temp file
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Tool and retry settings (YAML)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Inspect containers through the Docker API instead of the CLI
        #[arg(long)]
        docker_api: bool,

        /// Print only the essentials
        #[arg(short, long, conflicts_with = "json")]
        quiet: bool,

        /// Print JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration that would be handed to the launcher
    Render {
        /// Compose file to render
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the host published ports are reachable on
    Host,
}
