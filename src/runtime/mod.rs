// ABOUTME: Collaborators that talk to the compose launcher and container runtime.
// ABOUTME: Process execution, launcher arguments, and container inspection backends.

mod bollard;
mod cli_inspect;
mod command;
mod error;
mod inspect;
mod launcher;

pub use self::bollard::BollardInspector;
pub use cli_inspect::{CliInspector, parse_inspect_output};
pub use command::{CommandError, CommandRunner, ProcessRunner, diagnostic_lines};
pub use error::{InspectError, InspectErrorKind};
pub use inspect::{ContainerInfo, ContainerState, Inspector, PortBinding};
pub use launcher::Launcher;
