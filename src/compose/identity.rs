// ABOUTME: Recovers container ids from launcher output and maps names to services.
// ABOUTME: Relies on the verbose log format of the docker-compose v1 launcher.

use crate::types::ContainerId;
use regex::Regex;

/// Lines of `--verbose up` that mention a container id in their last quoted argument.
const START_LINE_PATTERN: &str = r"(?m)docker start|inspect_container <-.*\(u?'(.*)'\)";

/// Scrapes container ids and resolves container names to service keys.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    pattern: Regex,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(START_LINE_PATTERN).expect("start line pattern is valid"),
        }
    }

    /// Container ids mentioned in `output`, in order of first appearance.
    ///
    /// Matches with an empty or missing capture are skipped and repeated
    /// ids are reported once.
    pub fn container_ids(&self, output: &str) -> Vec<ContainerId> {
        let mut ids: Vec<ContainerId> = Vec::new();
        for caps in self.pattern.captures_iter(output) {
            let Some(id) = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()) else {
                continue;
            };
            if !ids.iter().any(|known| known.as_str() == id) {
                ids.push(ContainerId::new(id));
            }
        }
        ids
    }

    /// The first service key that occurs as a substring of `container_name`.
    pub fn service_for<'a>(
        &self,
        container_name: &str,
        services: impl IntoIterator<Item = &'a str>,
    ) -> Option<&'a str> {
        services
            .into_iter()
            .find(|service| container_name.contains(service))
    }
}
