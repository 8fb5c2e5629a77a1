// ABOUTME: Compose project orchestration for integration test fixtures.
// ABOUTME: Start a project, look up its containers, probe readiness, tear it down.

mod cleanup;
mod error;
mod identity;
mod options;
mod orchestrator;

pub use cleanup::CleanupError;
pub use error::{ComposeError, ComposeErrorKind};
pub use identity::IdentityResolver;
pub use options::Options;
pub use orchestrator::Compose;
