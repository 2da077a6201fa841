//! JSON-valued attributes stored as normalized text

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{PrefectError, Result};

/// JSON document kept as compact text with sorted object keys.
///
/// Two documents that differ only in whitespace or key order normalize to
/// the same text, so state comparisons are semantic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedJson(String);

impl NormalizedJson {
    /// Validate and normalize JSON text
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PrefectError::Parse(format!("invalid JSON string value: {}", e)))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        // serde_json's Map is ordered by key, so `to_string` is canonical
        Self(value.to_string())
    }

    /// Normalize an optional API map; a missing map becomes JSON `null`
    pub fn from_map(map: Option<&Map<String, Value>>) -> Self {
        match map {
            Some(map) => Self(Value::Object(map.clone()).to_string()),
            None => Self(Value::Null.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        // Only constructed from valid JSON
        serde_json::from_str(&self.0).unwrap_or(Value::Null)
    }

    /// Decode into an object, `None` for JSON `null`
    pub fn to_map(&self) -> Result<Option<Map<String, Value>>> {
        match self.to_value() {
            Value::Object(map) => Ok(Some(map)),
            Value::Null => Ok(None),
            other => Err(PrefectError::Parse(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for NormalizedJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NormalizedJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NormalizedJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        NormalizedJson::parse(&text).map_err(serde::de::Error::custom)
    }
}
