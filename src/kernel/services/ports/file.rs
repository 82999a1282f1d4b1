use std::path::PathBuf;

use thiserror::Error;

use super::settings::UiLanguage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    /// The user dismissed a dialog. Never surfaced as an error banner.
    #[error("cancelled")]
    Cancelled,
    #[error("could not read file: {0}")]
    ReadFailed(String),
    #[error("could not write file: {0}")]
    WriteFailed(String),
    #[error("unsupported file type: {0}")]
    UnsupportedExtension(String),
}

impl FileError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Banner text shown to the user.
    pub fn user_message(&self, ui: UiLanguage) -> String {
        match (self, ui) {
            (Self::Cancelled, _) => String::new(),
            (Self::ReadFailed(detail), UiLanguage::De) => {
                format!("Datei konnte nicht gelesen werden: {detail}")
            }
            (Self::ReadFailed(detail), UiLanguage::En) => format!("Could not read file: {detail}"),
            (Self::WriteFailed(detail), UiLanguage::De) => {
                format!("Datei konnte nicht gespeichert werden: {detail}")
            }
            (Self::WriteFailed(detail), UiLanguage::En) => format!("Could not save file: {detail}"),
            (Self::UnsupportedExtension(name), UiLanguage::De) => {
                format!("Nicht unterstützter Dateityp: {name}")
            }
            (Self::UnsupportedExtension(name), UiLanguage::En) => {
                format!("Unsupported file type: {name}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedDocument {
    pub path: PathBuf,
    pub content: String,
}

/// Native open/save panels. `None` means the user cancelled.
pub trait FileDialog: Send {
    fn pick_open(&mut self, allowed_extensions: &[&str]) -> Option<PathBuf>;
    fn pick_save(&mut self, suggested_name: &str) -> Option<PathBuf>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/file.rs"]
mod tests;
