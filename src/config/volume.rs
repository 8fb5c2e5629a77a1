// ABOUTME: Service volume mounts in short ("source:target") or long syntax.
// ABOUTME: Short mounts serialize back to the short string form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Volume {
    /// `"source:target"`
    Short { source: String, target: String },
    Long(VolumeSpec),
}

/// Long volume syntax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volume: BTreeMap<String, Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Volume {
    pub fn parse_short(s: &str) -> Result<Self, String> {
        match s.split(':').collect::<Vec<_>>().as_slice() {
            [source, target] => Ok(Volume::Short {
                source: (*source).to_string(),
                target: (*target).to_string(),
            }),
            _ => Err(format!("invalid volume format: {s}")),
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Volume::Short { source, .. } => Some(source),
            Volume::Long(spec) => spec.source.as_deref(),
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Volume::Short { target, .. } => Some(target),
            Volume::Long(spec) => spec.target.as_deref(),
        }
    }
}

impl Serialize for Volume {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Volume::Short { source, target } => {
                serializer.serialize_str(&format!("{source}:{target}"))
            }
            Volume::Long(spec) => spec.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Volume {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Volume::parse_short(&s).map_err(serde::de::Error::custom),
            mapping @ Value::Mapping(_) => serde_yaml::from_value(mapping)
                .map(Volume::Long)
                .map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "could not unmarshal into volume: {other:?}"
            ))),
        }
    }
}
