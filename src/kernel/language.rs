use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions accepted by open, save and drop.
pub const ALLOWED_EXTENSIONS: &[&str] = &["json", "xml", "xsl", "yaml", "yml", "txt"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentLanguage {
    #[default]
    Plaintext,
    Json,
    Xml,
    Yaml,
}

impl DocumentLanguage {
    pub const ALL: [DocumentLanguage; 4] = [
        DocumentLanguage::Plaintext,
        DocumentLanguage::Json,
        DocumentLanguage::Xml,
        DocumentLanguage::Yaml,
    ];

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "xml" | "xsl" => Self::Xml,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Plaintext,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|s| s.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Lenient lookup used for persisted records; anything unknown is plain text.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "xml" => Self::Xml,
            "yaml" => Self::Yaml,
            _ => Self::Plaintext,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plaintext => "plaintext",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Plaintext => "txt",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Plaintext => "Plain Text",
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Yaml => "YAML",
        }
    }

    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Plaintext)
    }
}

impl std::fmt::Display for DocumentLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Heuristic classification of raw text. Never parses, never fails.
pub fn detect(text: &str) -> DocumentLanguage {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DocumentLanguage::Plaintext;
    }
    if trimmed.starts_with('<') {
        return DocumentLanguage::Xml;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return DocumentLanguage::Json;
    }
    if trimmed.starts_with("---") {
        return DocumentLanguage::Yaml;
    }

    let yaml_like = trimmed
        .lines()
        .take(5)
        .filter(|line| line.contains(": ") || line.ends_with(':'))
        .count();
    if yaml_like >= 2 {
        return DocumentLanguage::Yaml;
    }

    DocumentLanguage::Plaintext
}

/// Decides whether an inbound edit should change the stored language.
///
/// Only fires when the new shape differs from both the stored tag and the shape
/// of the previous snapshot, so typing inside an already classified document
/// does not flap between languages.
pub fn should_reclassify(
    old_content: &str,
    new_content: &str,
    stored: DocumentLanguage,
) -> Option<DocumentLanguage> {
    let detected = detect(new_content);
    if detected != stored && detected != detect(old_content) {
        Some(detected)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
