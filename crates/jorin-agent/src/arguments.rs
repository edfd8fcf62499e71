//! Best-effort decoding of model-supplied tool arguments.

use serde_json::{Map, Value};
use tracing::warn;

use crate::ToolError;

/// Decoded arguments for one tool call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The field as a string, if present and a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ToolError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(ToolError::MissingArgument(key.to_string())),
            Some(Value::String(value)) if value.is_empty() => {
                Err(ToolError::MissingArgument(key.to_string()))
            }
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(_) => Err(ToolError::InvalidArgument {
                name: key.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Like [`ToolArgs::require_str`] but an empty string is a valid value.
    pub fn require_str_allow_empty(&self, key: &str) -> Result<&str, ToolError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(ToolError::MissingArgument(key.to_string())),
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(_) => Err(ToolError::InvalidArgument {
                name: key.to_string(),
                expected: "a string",
            }),
        }
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Decodes `raw` in three steps: a JSON object; a JSON string holding a JSON
/// object; finally, for tools with a single required field, the bare text
/// wrapped into that field. Anything else yields empty arguments so the tool
/// can report what is missing.
pub fn recover_arguments(tool_name: &str, raw: &str, fallback_field: Option<&str>) -> ToolArgs {
    let trimmed = raw.trim();
    let parsed = serde_json::from_str::<Value>(trimmed);

    let bare_text = match parsed {
        Ok(Value::Object(map)) => return ToolArgs(map),
        Ok(Value::String(inner)) => {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(inner.trim()) {
                return ToolArgs(map);
            }
            Some(inner)
        }
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    };

    if let (Some(field), Some(text)) = (fallback_field, bare_text) {
        let text = text.trim();
        if !text.is_empty() && !text.starts_with('{') && !text.starts_with('[') {
            let mut map = Map::new();
            map.insert(field.to_string(), Value::String(text.to_string()));
            warn!(tool = tool_name, field, "wrapped non-JSON tool arguments");
            return ToolArgs(map);
        }
    }

    if !trimmed.is_empty() {
        warn!(tool = tool_name, "could not decode tool arguments; using empty arguments");
    }
    ToolArgs::default()
}
