use std::path::PathBuf;

use crate::kernel::bridge::SurfaceCommand;
use crate::kernel::language::DocumentLanguage;
use crate::kernel::services::ports::Settings;
use crate::kernel::session::PersistedSession;
use crate::kernel::state::TabId;

#[derive(Debug, Clone)]
pub enum Effect {
    Surface(SurfaceCommand),
    PersistSession(PersistedSession),
    /// Show the open panel, then read the chosen file.
    PickAndOpenFile,
    ReadFiles(Vec<PathBuf>),
    /// `path: None` shows the save panel first.
    SaveFile {
        tab: TabId,
        path: Option<PathBuf>,
        content: String,
        title: String,
        language: DocumentLanguage,
        revision: u64,
    },
    AutoSave {
        tab: TabId,
        path: PathBuf,
        content: String,
        revision: u64,
    },
    SaveSettings(Settings),
}
