// ABOUTME: Project-level network declaration.
// ABOUTME: Parsed so caller files load, then stripped before launch.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    /// `true`, or a mapping naming the external network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
