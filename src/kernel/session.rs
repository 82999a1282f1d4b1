//! Tab session persistence over a key/value store.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::kernel::language::DocumentLanguage;
use crate::kernel::services::ports::{KeyValueStore, Settings, StorageResult};
use crate::kernel::state::{AppState, Tab, TabId};

pub const TABS_KEY: &str = "klartext-tabs";
pub const ACTIVE_KEY: &str = "klartext-active-id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTab {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub language: String,
    /// Written for compatibility; ignored on load.
    #[serde(default)]
    pub dirty: bool,
}

impl PersistedTab {
    fn from_tab(tab: &Tab) -> Self {
        Self {
            id: tab.id.to_string(),
            title: tab.title.clone(),
            content: tab.content.clone(),
            file_path: tab
                .file_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            language: tab.language.name().to_string(),
            dirty: tab.dirty,
        }
    }

    fn into_tab(self, fallback_title: &str) -> Option<Tab> {
        let id: TabId = self.id.parse().ok()?;
        let title = if self.title.trim().is_empty() {
            fallback_title.to_string()
        } else {
            self.title
        };
        Some(Tab {
            id,
            title,
            content: self.content,
            file_path: self.file_path.filter(|p| !p.is_empty()).map(PathBuf::from),
            language: DocumentLanguage::from_name(&self.language),
            dirty: false,
            revision: 0,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSession {
    pub tabs: Vec<PersistedTab>,
    pub active_id: Option<String>,
}

impl PersistedSession {
    pub fn capture(state: &AppState) -> Self {
        Self {
            tabs: state.tabs.iter().map(PersistedTab::from_tab).collect(),
            active_id: Some(state.active.to_string()),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> StorageResult<()> {
        let tabs = serde_json::to_string(&self.tabs)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        store.set(TABS_KEY, &tabs)?;
        match &self.active_id {
            Some(id) => store.set(ACTIVE_KEY, id),
            None => store.remove(ACTIVE_KEY),
        }
    }

    /// Reads the stored session. Records that fail to decode are skipped.
    pub fn load(store: &dyn KeyValueStore) -> StorageResult<Option<Self>> {
        let Some(raw) = store.get(TABS_KEY)? else {
            return Ok(None);
        };
        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "persisted tabs are not a list, ignoring");
                return Ok(None);
            }
        };

        let tabs = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(tab) => Some(tab),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping invalid persisted tab");
                    None
                }
            })
            .collect();
        let active_id = store.get(ACTIVE_KEY)?;

        Ok(Some(Self { tabs, active_id }))
    }

    /// Turns records into tabs, forcing every tab clean and dropping duplicate ids.
    pub fn into_tabs(self, fallback_title: &str) -> (Vec<Tab>, Option<TabId>) {
        let mut seen = HashSet::new();
        let tabs = self
            .tabs
            .into_iter()
            .filter_map(|record| {
                let tab = record.into_tab(fallback_title);
                if tab.is_none() {
                    tracing::warn!("skipping persisted tab with malformed id");
                }
                tab
            })
            .filter(|tab| seen.insert(tab.id))
            .collect();
        let active = self.active_id.and_then(|id| id.parse().ok());
        (tabs, active)
    }
}

/// Cold start: rebuild state from storage, or start fresh when nothing usable is stored.
pub fn restore(store: &dyn KeyValueStore, settings: Settings) -> AppState {
    let fallback_title = settings.ui_language.label("Unbenannt", "Untitled");
    let (tabs, active) = match PersistedSession::load(store) {
        Ok(Some(session)) => session.into_tabs(fallback_title),
        Ok(None) => (Vec::new(), None),
        Err(e) => {
            tracing::error!(error = %e, "failed to load persisted session");
            (Vec::new(), None)
        }
    };
    tracing::info!(tabs = tabs.len(), "session restored");
    AppState::with_tabs(tabs, active, settings)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
