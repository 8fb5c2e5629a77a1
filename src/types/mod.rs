// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to keep runtime identifiers apart at compile time.

mod id;
mod project_name;

pub use id::{ContainerId, NetworkId};
pub use project_name::{DEFAULT_PROJECT_NAME, ProjectName, ProjectNameError};
