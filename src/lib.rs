// ABOUTME: Library root for stevedore - compose project fixtures for integration tests.
// ABOUTME: The stevedore binary is in main.rs.

pub mod compose;
pub mod config;
pub mod error;
pub mod host;
pub mod retry;
pub mod runtime;
pub mod types;

pub use compose::{Compose, ComposeError, Options};
pub use host::{infer_docker_host, must_infer_docker_host};
