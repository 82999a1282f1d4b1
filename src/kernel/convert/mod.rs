//! Format converter: pretty-print, minify and cross-convert JSON, XML and YAML.
//!
//! Every operation is a pure function of the input text. Whitespace-only input
//! is returned unchanged so callers can treat it as a no-op.

pub mod json;
pub mod xml;
pub mod yaml;

use thiserror::Error;

use crate::kernel::language::DocumentLanguage;
use crate::kernel::services::ports::UiLanguage;

pub use json::{format_json, minify_json};
pub use xml::{format_xml, json_to_xml, minify_xml, xml_to_json, xml_to_yaml, yaml_to_xml};
pub use yaml::{format_yaml, json_to_yaml, minify_yaml, yaml_to_json};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Input does not look like the requested (or any) structured format.
    #[error("target format not recognized")]
    UnrecognizedFormat,
    /// Input belongs to a format family but is malformed.
    #[error("{0}")]
    ParseError(String),
}

impl ConversionError {
    pub(crate) fn parse(detail: impl std::fmt::Display) -> Self {
        Self::ParseError(detail.to_string())
    }

    /// Banner text shown to the user.
    pub fn user_message(&self, ui: UiLanguage) -> String {
        match self {
            Self::UnrecognizedFormat => ui
                .label("Das Zielformat wurde nicht erkannt.", "Target format not recognized.")
                .to_string(),
            Self::ParseError(detail) => match ui {
                UiLanguage::De => format!("Ungültiges Dokument: {detail}"),
                UiLanguage::En => format!("Invalid document: {detail}"),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Converts `text` from `source` into `target`.
///
/// Plain text as a source means "try the target format directly", which is the
/// same as reformatting. Plain text as a target leaves the text untouched.
pub fn convert(text: &str, source: DocumentLanguage, target: DocumentLanguage) -> Result<String> {
    use DocumentLanguage::*;

    match (source, target) {
        (_, Plaintext) => Ok(text.to_string()),
        (Json | Plaintext, Json) => format_json(text),
        (Xml, Json) => xml_to_json(text),
        (Yaml, Json) => yaml_to_json(text),
        (Json, Xml) => json_to_xml(text),
        (Yaml, Xml) => yaml_to_xml(text),
        (Xml | Plaintext, Xml) => format_xml(text),
        (Json, Yaml) => json_to_yaml(text),
        (Xml, Yaml) => xml_to_yaml(text),
        (Yaml | Plaintext, Yaml) => format_yaml(text),
    }
}

/// Minifies by inspecting the leading character only.
///
/// Returns `Ok(None)` for whitespace-only input: nothing to do and the
/// document language stays as it is.
pub fn minify(text: &str) -> Result<Option<(String, DocumentLanguage)>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return minify_json(text).map(|out| Some((out, DocumentLanguage::Json)));
    }
    if trimmed.starts_with('<') {
        return minify_xml(text).map(|out| Some((out, DocumentLanguage::Xml)));
    }

    match yaml::parse_document(trimmed) {
        Ok(value) if value.is_mapping() || value.is_sequence() => {
            yaml::emit(&value).map(|out| Some((out, DocumentLanguage::Yaml)))
        }
        _ => Err(ConversionError::UnrecognizedFormat),
    }
}

/// Recognizes pasted text and returns it pretty-printed with its language.
pub fn try_format_pasted(text: &str) -> Option<(String, DocumentLanguage)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return format_json(trimmed)
            .ok()
            .map(|out| (out, DocumentLanguage::Json));
    }

    if trimmed.starts_with('<') {
        if let Ok(out) = format_xml(trimmed) {
            return Some((out, DocumentLanguage::Xml));
        }
    }

    match yaml::parse_document(trimmed) {
        Ok(value) if value.is_mapping() || value.is_sequence() => yaml::emit(&value)
            .ok()
            .map(|out| (out, DocumentLanguage::Yaml)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/convert/mod.rs"]
mod tests;
