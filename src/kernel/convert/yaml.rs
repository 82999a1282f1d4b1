use serde_yaml_ng::Value;

use super::{json, ConversionError, Result};

/// Parses YAML into a generic value. Empty documents are not a format match.
pub(crate) fn parse_document(text: &str) -> Result<Value> {
    let value: Value = serde_yaml_ng::from_str(text.trim())
        .map_err(|e| ConversionError::parse(format!("invalid YAML: {e}")))?;
    if value.is_null() {
        return Err(ConversionError::UnrecognizedFormat);
    }
    Ok(value)
}

/// Parses YAML that must be a mapping or a sequence and lifts it into JSON.
pub(crate) fn parse_structured_as_json(text: &str) -> Result<serde_json::Value> {
    let value = parse_document(text)?;
    if !value.is_mapping() && !value.is_sequence() {
        return Err(ConversionError::UnrecognizedFormat);
    }
    to_json(&value)
}

/// JSON object keys are strings, so non-string YAML keys are written as their scalar text.
/// Sequence and mapping keys become their compact JSON text.
fn to_json(value: &Value) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect::<Result<_>>()?)
        }
        Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                object.insert(key_text(key)?, to_json(item)?);
            }
            serde_json::Value::Object(object)
        }
        Value::Tagged(tagged) => to_json(&tagged.value)?,
    })
}

fn number_to_json(n: &serde_yaml_ng::Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        serde_json::Value::from(i)
    } else if let Some(u) = n.as_u64() {
        serde_json::Value::from(u)
    } else {
        // .nan and .inf have no JSON form.
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

fn key_text(key: &Value) -> Result<String> {
    Ok(match key {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => key_text(&tagged.value)?,
        Value::Sequence(_) | Value::Mapping(_) => {
            serde_json::to_string(&to_json(key)?).map_err(ConversionError::parse)?
        }
    })
}

/// Block style, two space indent. The emitter never wraps long lines.
pub(crate) fn emit(value: &Value) -> Result<String> {
    serde_yaml_ng::to_string(value).map_err(ConversionError::parse)
}

pub(crate) fn emit_json(value: &serde_json::Value) -> Result<String> {
    serde_yaml_ng::to_string(&json::sorted(value.clone())).map_err(ConversionError::parse)
}

pub fn format_yaml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    emit(&parse_document(text)?)
}

/// Same emitter as [`format_yaml`]; the output is already free of forced wrapping.
pub fn minify_yaml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    emit(&parse_document(text)?)
}

pub fn json_to_yaml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    emit_json(&json::parse_document(text)?)
}

pub fn yaml_to_json(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    json::to_pretty(parse_structured_as_json(text)?)
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/convert/yaml.rs"]
mod tests;
