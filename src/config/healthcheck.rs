// ABOUTME: Compose healthcheck directive.
// ABOUTME: Durations stay in compose's own string syntax so they round-trip untouched.

use super::deserialize::{string_list, string_or_number};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,

    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,

    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub retries: Option<String>,
}

impl HealthCheck {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
