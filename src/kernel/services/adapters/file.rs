//! Document IO on the local filesystem.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::kernel::language::{is_allowed_extension, DocumentLanguage, ALLOWED_EXTENSIONS};
use crate::kernel::services::ports::file::{FileError, OpenedDocument, Result};
use crate::kernel::state::file_title;

pub fn check_extension(path: &Path) -> Result<()> {
    if is_allowed_extension(path) {
        Ok(())
    } else {
        Err(FileError::UnsupportedExtension(file_title(path)))
    }
}

pub async fn read_document(path: PathBuf) -> Result<OpenedDocument> {
    check_extension(&path)?;
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(OpenedDocument { path, content }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "read failed");
            Err(FileError::ReadFailed(e.to_string()))
        }
    }
}

pub async fn write_document(path: PathBuf, content: String) -> Result<()> {
    let target = path.clone();
    let result = tokio::task::spawn_blocking(move || write_text_to_path(&target, &content)).await;
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::warn!(path = %path.display(), error = %e, "write failed");
            Err(FileError::WriteFailed(e.to_string()))
        }
        Err(e) => Err(FileError::WriteFailed(e.to_string())),
    }
}

fn write_text_to_path(path: &Path, content: &str) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()
}

/// Default name offered by the save panel: the tab title with its extension
/// replaced by the one matching `language`.
pub fn suggested_file_name(title: &str, language: DocumentLanguage) -> String {
    let title = title.trim();
    let stem = match title.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && is_known_extension(ext) => stem,
        _ => title,
    };
    let stem = if stem.is_empty() { "Untitled" } else { stem };
    format!("{stem}.{}", language.file_extension())
}

fn is_known_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Appends the language extension when the chosen save path has none.
pub fn with_language_extension(path: PathBuf, language: DocumentLanguage) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(language.file_extension())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/file.rs"]
mod tests;
