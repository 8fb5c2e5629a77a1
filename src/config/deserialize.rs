// ABOUTME: Custom serde deserializers for compose file fields.
// ABOUTME: Accepts YAML scalars of any type where compose expects strings.

use serde::Deserialize;
use serde_yaml::Value;

fn scalar_to_string<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(E::custom(format!("expected a scalar, found {other:?}"))),
    }
}

/// `version: 3` and `version: '3'` both end up as `"3"`.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value)
}

/// A list of scalars, e.g. `ports: [3306, "8222:8222"]`.
///
/// A lone scalar becomes a one-element list and a mapping such as
/// `environment: {KEY: value}` becomes `KEY=value` entries. Mapping entries
/// with structured values, like per-service network settings, keep only the key.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Sequence(values) => values
            .into_iter()
            .filter_map(|v| scalar_to_string(v).transpose())
            .collect(),
        Value::Mapping(entries) => entries
            .into_iter()
            .map(|(key, value)| {
                let key = scalar_to_string::<D::Error>(key)?.unwrap_or_default();
                Ok(match value {
                    Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_) => key,
                    scalar => match scalar_to_string::<D::Error>(scalar)? {
                        Some(value) => format!("{key}={value}"),
                        None => key,
                    },
                })
            })
            .collect(),
        scalar => Ok(scalar_to_string(scalar)?.into_iter().collect()),
    }
}
