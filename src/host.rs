// ABOUTME: Works out which host published container ports are reachable on.
// ABOUTME: Reads DOCKER_HOST, falling back to the loopback address.

use crate::error::{Error, Result};
use regex::Regex;

pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

/// Host used when `DOCKER_HOST` is unset or empty.
pub const LOOPBACK: &str = "127.0.0.1";

/// Extract the host from a `DOCKER_HOST` value such as `tcp://10.0.0.5:2376`.
///
/// The value must contain exactly one `://host:` segment.
pub fn parse_docker_host(value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(LOOPBACK.to_string());
    }

    let pattern = Regex::new("://([^:]+):").expect("docker host pattern is valid");
    let mut captures = pattern.captures_iter(value);
    match (captures.next(), captures.next()) {
        (Some(caps), None) => Ok(caps[1].to_string()),
        _ => Err(Error::DockerHost(value.to_string())),
    }
}

/// The docker host according to the `DOCKER_HOST` environment variable.
pub fn infer_docker_host() -> Result<String> {
    let value = std::env::var(DOCKER_HOST_ENV).unwrap_or_default();
    parse_docker_host(&value)
}

/// Like [`infer_docker_host`], but panics on error.
pub fn must_infer_docker_host() -> String {
    match infer_docker_host() {
        Ok(host) => host,
        Err(e) => panic!("{}", e),
    }
}
