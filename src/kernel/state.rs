use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::bridge::{EditorBridge, SurfaceOperation};
use crate::kernel::language::DocumentLanguage;
use crate::kernel::outline::{self, OutlineNode};
use crate::kernel::services::ports::Settings;

pub const PERSIST_DEBOUNCE: Duration = Duration::from_millis(500);
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(2000);
pub const ERROR_TTL: Duration = Duration::from_millis(2500);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(raw: Uuid) -> Self {
        Self(raw)
    }

    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TabId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub content: String,
    pub file_path: Option<PathBuf>,
    pub language: DocumentLanguage,
    pub dirty: bool,
    /// Bumped on every content mutation; save completions compare against it.
    pub revision: u64,
}

impl Tab {
    pub fn untitled(title: impl Into<String>) -> Self {
        Self {
            id: TabId::new(),
            title: title.into(),
            content: String::new(),
            file_path: None,
            language: DocumentLanguage::Plaintext,
            dirty: false,
            revision: 0,
        }
    }

    pub fn from_file(path: PathBuf, content: String) -> Self {
        Self {
            id: TabId::new(),
            title: file_title(&path),
            language: DocumentLanguage::from_path(&path),
            content,
            file_path: Some(path),
            dirty: false,
            revision: 0,
        }
    }

    /// A tab nobody has touched: no content, no file, nothing unsaved.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.file_path.is_none() && !self.dirty
    }

    pub(crate) fn touch(&mut self) {
        self.dirty = true;
        self.revision = self.revision.wrapping_add(1);
    }
}

pub fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub message: String,
    pub expires_at: Instant,
}

/// Snapshot taken when a side-by-side comparison starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffState {
    pub tab: TabId,
    pub original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperation {
    pub tab: TabId,
    pub operation: SurfaceOperation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    pub persist_at: Option<Instant>,
    pub autosave: Vec<(TabId, Instant)>,
}

impl Timers {
    pub fn next_deadline(&self) -> Option<Instant> {
        self.autosave
            .iter()
            .map(|(_, at)| *at)
            .chain(self.persist_at)
            .min()
    }
}

#[derive(Debug)]
pub struct AppState {
    pub tabs: Vec<Tab>,
    pub active: TabId,
    pub settings: Settings,
    pub error: Option<TransientError>,
    pub diff: Option<DiffState>,
    pub pending_operation: Option<PendingOperation>,
    pub timers: Timers,
    pub bridge: EditorBridge,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_tabs(Vec::new(), None, settings)
    }

    /// Builds state from restored tabs. An unknown active id falls back to the first tab.
    pub fn with_tabs(mut tabs: Vec<Tab>, active: Option<TabId>, settings: Settings) -> Self {
        if tabs.is_empty() {
            tabs.push(Tab::untitled(untitled_title(&settings)));
        }
        let active = active
            .filter(|id| tabs.iter().any(|t| t.id == *id))
            .unwrap_or(tabs[0].id);

        Self {
            tabs,
            active,
            settings,
            error: None,
            diff: None,
            pending_operation: None,
            timers: Timers::default(),
            bridge: EditorBridge::new(),
        }
    }

    pub fn tab_index(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn active_index(&self) -> usize {
        self.tab_index(self.active).unwrap_or(0)
    }

    pub fn active_tab(&self) -> &Tab {
        &self.tabs[self.active_index()]
    }

    pub fn active_tab_mut(&mut self) -> &mut Tab {
        let index = self.active_index();
        &mut self.tabs[index]
    }

    pub fn untitled_title(&self) -> &'static str {
        untitled_title(&self.settings)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Outline of the active tab, rebuilt on demand.
    pub fn outline(&self) -> Option<OutlineNode> {
        let tab = self.active_tab();
        outline::build_outline(&tab.content, tab.language)
    }

    /// Path segments of the outline node enclosing `line` in the active tab.
    pub fn breadcrumbs(&self, line: u32) -> Vec<String> {
        self.outline()
            .and_then(|root| outline::node_at_line(&root, line).map(|node| node.path.clone()))
            .unwrap_or_default()
    }

    /// Diff snapshot for the active tab, if one is open.
    pub fn active_diff(&self) -> Option<&DiffState> {
        self.diff.as_ref().filter(|d| d.tab == self.active)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let error_at = self.error.as_ref().map(|e| e.expires_at);
        match (self.timers.next_deadline(), error_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn untitled_title(settings: &Settings) -> &'static str {
    settings.ui_language.label("Unbenannt", "Untitled")
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
