use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use super::message::AppMessage;
use crate::kernel::language::{DocumentLanguage, ALLOWED_EXTENSIONS};
use crate::kernel::services::adapters::file::{
    read_document, suggested_file_name, with_language_extension, write_document,
};
use crate::kernel::services::ports::{
    FileDialog, FileError, FileResult, KeyValueStore, OpenedDocument,
};
use crate::kernel::session::PersistedSession;
use crate::kernel::state::TabId;

pub type SharedDialog = Arc<Mutex<Box<dyn FileDialog>>>;
pub type SharedStorage = Arc<Mutex<Box<dyn KeyValueStore>>>;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    persist_generation: Arc<AtomicU64>,
}

impl AsyncRuntime {
    pub fn new(tx: Sender<AppMessage>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            persist_generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn pick_and_open(&self, dialog: SharedDialog) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let picked = tokio::task::spawn_blocking(move || pick_open_path(&dialog))
                .await
                .ok()
                .flatten();

            let message = match picked {
                Some(path) => opened_message(read_document(path).await),
                None => AppMessage::FileOpFailed(FileError::Cancelled),
            };
            let _ = tx.send(message);
        });
    }

    /// Reads each path independently; one failure does not stop the others.
    pub fn read_files(&self, paths: Vec<PathBuf>) {
        for path in paths {
            let tx = self.tx.clone();
            self.runtime.spawn(async move {
                let _ = tx.send(opened_message(read_document(path).await));
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn save_file(
        &self,
        dialog: SharedDialog,
        tab: TabId,
        path: Option<PathBuf>,
        content: String,
        title: String,
        language: DocumentLanguage,
        revision: u64,
    ) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let target = match path {
                Some(path) => Some(path),
                None => {
                    let suggested = suggested_file_name(&title, language);
                    tokio::task::spawn_blocking(move || pick_save_path(&dialog, &suggested))
                        .await
                        .ok()
                        .flatten()
                        .map(|path| with_language_extension(path, language))
                }
            };

            let Some(path) = target else {
                let _ = tx.send(AppMessage::FileOpFailed(FileError::Cancelled));
                return;
            };
            let _ = tx.send(saved_message(
                write_document(path.clone(), content).await,
                tab,
                path,
                revision,
            ));
        });
    }

    pub fn autosave(&self, tab: TabId, path: PathBuf, content: String, revision: u64) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            tracing::debug!(path = %path.display(), revision, "autosave");
            let result = write_document(path.clone(), content).await;
            let _ = tx.send(saved_message(result, tab, path, revision));
        });
    }

    /// Makes every queued snapshot stale, e.g. before a synchronous final write.
    pub fn supersede_persists(&self) {
        self.persist_generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Writes the snapshot unless a newer one was queued in the meantime.
    pub fn persist_session(&self, storage: SharedStorage, session: PersistedSession) {
        let generation = self.persist_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.persist_generation);
        self.runtime.spawn_blocking(move || {
            let Ok(mut storage) = storage.lock() else {
                tracing::error!("session storage lock poisoned");
                return;
            };
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }
            if let Err(e) = session.save(storage.as_mut()) {
                tracing::error!(error = %e, "failed to persist session");
            }
        });
    }
}

fn pick_open_path(dialog: &SharedDialog) -> Option<PathBuf> {
    let Ok(mut dialog) = dialog.lock() else {
        tracing::error!("file dialog lock poisoned");
        return None;
    };
    dialog.pick_open(ALLOWED_EXTENSIONS)
}

fn pick_save_path(dialog: &SharedDialog, suggested: &str) -> Option<PathBuf> {
    let Ok(mut dialog) = dialog.lock() else {
        tracing::error!("file dialog lock poisoned");
        return None;
    };
    dialog.pick_save(suggested)
}

fn opened_message(result: FileResult<OpenedDocument>) -> AppMessage {
    match result {
        Ok(doc) => AppMessage::FileOpened {
            path: doc.path,
            content: doc.content,
        },
        Err(e) => AppMessage::FileOpFailed(e),
    }
}

fn saved_message(result: FileResult<()>, tab: TabId, path: PathBuf, revision: u64) -> AppMessage {
    match result {
        Ok(()) => AppMessage::FileSaved {
            tab,
            path,
            revision,
        },
        Err(e) => AppMessage::FileOpFailed(e),
    }
}
