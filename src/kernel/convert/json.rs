use serde_json::{Map, Value};

use super::{ConversionError, Result};

/// Parses a structured JSON document. Scalars are rejected as document roots.
pub(crate) fn parse_document(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return Err(ConversionError::UnrecognizedFormat);
    }
    serde_json::from_str(trimmed).map_err(|e| ConversionError::parse(format!("invalid JSON: {e}")))
}

/// Rebuilds every object with ascending keys, independent of the map backend.
pub(crate) fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(key, sorted(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

pub(crate) fn to_pretty(value: Value) -> Result<String> {
    serde_json::to_string_pretty(&sorted(value)).map_err(ConversionError::parse)
}

pub fn format_json(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    to_pretty(parse_document(text)?)
}

pub fn minify_json(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    let value = parse_document(text)?;
    serde_json::to_string(&value).map_err(ConversionError::parse)
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/convert/json.rs"]
mod tests;
