use std::path::PathBuf;

use crate::kernel::bridge::SurfaceEvent;
use crate::kernel::language::DocumentLanguage;
use crate::kernel::services::ports::{FileError, FormatKind, UiLanguage};
use crate::kernel::state::TabId;

#[derive(Debug, Clone)]
pub enum Action {
    /// Advances debounce timers and expires the transient error.
    Tick,

    AddTab,
    CloseTab(TabId),
    SetActiveTab(TabId),
    RenameTab {
        id: TabId,
        title: String,
    },
    SetActiveContent(String),
    UpdateActiveLanguage(DocumentLanguage),

    Format(FormatKind),
    Minify,
    ClearContent,
    PasteFormatted(String),
    PasteAsNewTab(String),
    ReplaceAll {
        search: String,
        replacement: String,
    },

    Surface(SurfaceEvent),
    Search(String),
    SearchNext,
    SearchPrev,
    RevealLine(u32),

    OpenFile,
    FileOpened {
        path: PathBuf,
        content: String,
    },
    FilesDropped(Vec<PathBuf>),
    SaveActive,
    SaveActiveAs,
    FileSaved {
        tab: TabId,
        path: PathBuf,
        revision: u64,
    },
    FileOpFailed(FileError),

    StartDiff,
    CloseDiff,

    SetFontSize(u16),
    ToggleAutoSave,
    ToggleFavorite(FormatKind),
    SetUiLanguage(UiLanguage),
    DismissError,
}
